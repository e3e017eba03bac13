//! Content kinds and their upstream path templates.

use std::fmt;

/// A content category served by FDAPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Album,
    Document,
    Article,
    Live,
}

impl ContentKind {
    pub const ALL: [Self; 4] = [Self::Album, Self::Document, Self::Article, Self::Live];

    /// Singular, lowercase name (`album`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Document => "document",
            Self::Article => "article",
            Self::Live => "live",
        }
    }

    /// Collection path segment (`albums`). `live` has no plural form upstream.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Album => "albums",
            Self::Document => "documents",
            Self::Article => "articles",
            Self::Live => "live",
        }
    }

    /// `/v1/content/{language}/{plural}`
    #[must_use]
    pub fn collection_path(self, language: &str) -> String {
        format!(
            "/v1/content/{}/{}",
            encode_path_segment(language),
            self.plural()
        )
    }

    /// `/v1/content/{language}/{plural}/{slug}`
    #[must_use]
    pub fn item_path(self, language: &str, slug: &str) -> String {
        format!(
            "{}/{}",
            self.collection_path(language),
            encode_path_segment(slug)
        )
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, so a value cannot
/// introduce extra path segments, a query or a fragment.
fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0F)]));
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~')
}
