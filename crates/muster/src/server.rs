//! `MusterServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → lobby, plus the
//! HTTP companion surface. All lobby state lives behind a single
//! `Mutex<Lobby>` — one critical section per inbound envelope, which is
//! what serializes every registry and directory mutation.

use std::net::SocketAddr;
use std::sync::Arc;

use muster_lobby::Lobby;
use muster_protocol::JsonCodec;
use muster_transport::{Transport, WebSocketTransport};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::http;
use crate::{MusterError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) lobby: Mutex<Lobby>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Muster server.
pub struct MusterServerBuilder {
    config: ServerConfig,
}

impl MusterServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the WebSocket bind address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    /// Sets the HTTP companion bind address.
    pub fn http_bind(mut self, addr: &str) -> Self {
        self.config.http_addr = addr.to_string();
        self
    }

    /// Sets the admin secret.
    pub fn admin_key(mut self, key: &str) -> Self {
        self.config.admin_key = key.to_string();
        self
    }

    /// Binds both listeners and returns the runnable server.
    pub async fn build(self) -> Result<MusterServer, MusterError> {
        if self.config.uses_default_admin_key() {
            tracing::warn!(
                "admin key left at the built-in default; set MUSTER_ADMIN_KEY"
            );
        }

        let transport =
            WebSocketTransport::bind(&self.config.ws_addr).await?;
        let http_listener =
            TcpListener::bind(self.config.http_addr.as_str()).await?;
        tracing::info!(
            addr = %self.config.http_addr,
            "HTTP companion surface listening"
        );

        let state = Arc::new(ServerState {
            lobby: Mutex::new(Lobby::new()),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(MusterServer {
            transport,
            http_listener,
            state,
        })
    }
}

impl Default for MusterServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Muster lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MusterServer {
    transport: WebSocketTransport,
    http_listener: TcpListener,
    state: Arc<ServerState>,
}

impl MusterServer {
    /// Creates a new builder.
    pub fn builder() -> MusterServerBuilder {
        MusterServerBuilder::new()
    }

    /// Returns the local address of the WebSocket listener.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the local address of the HTTP listener.
    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http_listener.local_addr()
    }

    /// Runs the accept loop (and the HTTP surface) until the process is
    /// terminated.
    ///
    /// Each accepted connection gets its own handler task; a failure in
    /// one connection never affects the others.
    pub async fn run(mut self) -> Result<(), MusterError> {
        let app = http::router(Arc::clone(&self.state));
        let http_listener = self.http_listener;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(http_listener, app).await {
                tracing::error!(error = %e, "http server exited");
            }
        });

        tracing::info!("Muster server running");
        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
