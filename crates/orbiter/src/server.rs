//! `OrbiterServer` builder and accept loop.
//!
//! This is the entry point for running the lobby server. It ties the
//! layers together: transport → protocol → room registry.

use std::sync::Arc;

use orbiter_protocol::{Catalog, JsonCodec};
use orbiter_room::{RoomRegistry, RoundConfig};
use orbiter_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::OrbiterError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// lock is held only to resolve/route an operation — the per-room work
/// happens inside each room's own actor task.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting an Orbiter server.
///
/// # Example
///
/// ```rust,ignore
/// let server = OrbiterServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct OrbiterServerBuilder {
    bind_addr: String,
    round_config: RoundConfig,
    catalog: Catalog,
}

impl OrbiterServerBuilder {
    /// Creates a new builder with the reference catalog and default rules.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            round_config: RoundConfig::default(),
            catalog: Catalog::reference(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the round duration and mass threshold.
    pub fn round_config(mut self, config: RoundConfig) -> Self {
        self.round_config = config;
        self
    }

    /// Replaces the part/material catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Builds the server, binding the WebSocket listener.
    pub async fn build(self) -> Result<OrbiterServer, OrbiterError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry =
            RoomRegistry::new(self.round_config, Arc::new(self.catalog));
        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            codec: JsonCodec,
        });

        Ok(OrbiterServer { transport, state })
    }
}

impl Default for OrbiterServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Orbiter lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct OrbiterServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl OrbiterServer {
    /// Creates a new builder.
    pub fn builder() -> OrbiterServerBuilder {
        OrbiterServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), OrbiterError> {
        tracing::info!("Orbiter server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await
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
