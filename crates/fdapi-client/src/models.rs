//! Strict entity schemas for FDAPI content items.
//!
//! Every entity is a closed record: an unknown field, a missing required field or a field of
//! the wrong type is a [`FdapiError::Validation`], never silently dropped. Optional fields that
//! are absent serialize back as `null`. Timestamps keep the text the upstream sent.

use crate::error::{FdapiError, Result};
use crate::kind::ContentKind;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A content item that can be strictly decoded from one upstream JSON response.
pub trait Entity: DeserializeOwned + Serialize {
    const KIND: ContentKind;

    /// Decode and validate an upstream payload.
    ///
    /// # Errors
    ///
    /// Returns [`FdapiError::Validation`] if the payload does not match the schema.
    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| FdapiError::Validation(format!("invalid {} payload: {e}", Self::KIND)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Album {
    #[serde(deserialize_with = "trimmed")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    pub slug: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub language: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Entity for Album {
    const KIND: ContentKind = ContentKind::Album;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(deserialize_with = "trimmed")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    pub slug: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub language: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Entity for Document {
    const KIND: ContentKind = ContentKind::Document;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Article {
    #[serde(deserialize_with = "trimmed")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    pub slug: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub author: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub language: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Entity for Article {
    const KIND: ContentKind = ContentKind::Article;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Live {
    #[serde(deserialize_with = "trimmed")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    pub slug: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub status: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub language: String,
    #[serde(default)]
    pub start_time: Option<Timestamp>,
    #[serde(default)]
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Entity for Live {
    const KIND: ContentKind = ContentKind::Live;
}

/// A date-time as sent by FDAPI: RFC 3339 with an offset, or a naive local date-time.
///
/// Serializes back to the exact text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    value: TimestampValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampValue {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Timestamp {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn value(&self) -> TimestampValue {
        self.value
    }
}

impl FromStr for Timestamp {
    type Err = FdapiError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let value = DateTime::parse_from_rfc3339(raw)
            .map(TimestampValue::Offset)
            .ok()
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(TimestampValue::Naive)
            })
            .ok_or_else(|| FdapiError::Validation(format!("invalid timestamp '{raw}'")))?;
        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

fn trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()))
}
