//! Session manager for the streamable HTTP transport.
//!
//! Sessions are handled by rmcp's `LocalSessionManager`; this wrapper tracks how many are open
//! and logs their lifecycle.

use futures::Stream;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::transport::common::server_side_http::ServerSseMessage;
use rmcp::transport::streamable_http_server::session::SessionId;
use rmcp::transport::streamable_http_server::session::SessionManager;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

type LocalError = <LocalSessionManager as SessionManager>::Error;
type LocalTransport = <LocalSessionManager as SessionManager>::Transport;

#[derive(Default)]
pub struct ContentSessionManager {
    inner: LocalSessionManager,
    open: AtomicUsize,
}

impl ContentSessionManager {
    /// Number of sessions created and not yet closed.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::Relaxed)
    }

    async fn create_session_impl(&self) -> Result<(SessionId, LocalTransport), LocalError> {
        let created = self.inner.create_session().await?;
        let open = self.open.fetch_add(1, Ordering::Relaxed) + 1;
        info!(session_id = %created.0, open, "MCP session opened");
        Ok(created)
    }

    async fn close_session_impl(&self, id: &SessionId) -> Result<(), LocalError> {
        let had_session = self.inner.has_session(id).await.unwrap_or(false);
        let result = self.inner.close_session(id).await;

        if had_session {
            let open = self
                .open
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .map_or(0, |prev| prev - 1);
            info!(session_id = %id, open, "MCP session closed");
        } else {
            debug!(session_id = %id, "close requested for unknown MCP session");
        }

        result
    }
}

impl SessionManager for ContentSessionManager {
    type Error = LocalError;
    type Transport = LocalTransport;

    fn create_session(
        &self,
    ) -> impl Future<Output = Result<(SessionId, Self::Transport), Self::Error>> + Send {
        self.create_session_impl()
    }

    fn initialize_session(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> impl Future<Output = Result<ServerJsonRpcMessage, Self::Error>> + Send {
        self.inner.initialize_session(id, message)
    }

    fn has_session(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        self.inner.has_session(id)
    }

    fn close_session(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.close_session_impl(id)
    }

    fn create_stream(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> impl Future<
        Output = Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error>,
    > + Send {
        self.inner.create_stream(id, message)
    }

    fn accept_message(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.inner.accept_message(id, message)
    }

    fn create_standalone_stream(
        &self,
        id: &SessionId,
    ) -> impl Future<
        Output = Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error>,
    > + Send {
        self.inner.create_standalone_stream(id)
    }

    fn resume(
        &self,
        id: &SessionId,
        last_event_id: String,
    ) -> impl Future<
        Output = Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error>,
    > + Send {
        self.inner.resume(id, last_event_id)
    }
}

