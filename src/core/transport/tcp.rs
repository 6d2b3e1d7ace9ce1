//! TCP transport implementation.
//!
//! Each accepted connection gets its own MCP session over line-delimited
//! JSON-RPC. Sessions share the compiled toolset read-only.

use rmcp::ServiceExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
    sessions: Arc<AtomicUsize>,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Number of sessions currently being served.
    pub fn active_sessions(&self) -> usize {
        self.sessions.load(Ordering::Relaxed)
    }

    /// Accept connections until the process is stopped.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (JSON-RPC over TCP)", addr);

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
                    }

                    let server = server.clone();
                    let sessions = self.sessions.clone();
                    tokio::spawn(async move {
                        let active = sessions.fetch_add(1, Ordering::Relaxed) + 1;
                        info!("Accepted connection from {} ({} active)", peer_addr, active);
                        Self::handle_connection(server, stream, peer_addr).await;
                        sessions.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    // Back off so a persistent accept error does not spin.
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    async fn handle_connection(server: McpServer, stream: TcpStream, peer_addr: SocketAddr) {
        let service = match server.serve(stream).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to initialize session for {}: {}", peer_addr, e);
                return;
            }
        };

        match service.waiting().await {
            Ok(reason) => info!("Client {} disconnected: {:?}", peer_addr, reason),
            Err(e) => warn!("Error while serving client {}: {}", peer_addr, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_and_initial_sessions() {
        let transport = TcpTransport::new(TcpConfig {
            port: 4321,
            host: "0.0.0.0".to_string(),
        });
        assert_eq!(transport.address(), "0.0.0.0:4321");
        assert_eq!(transport.active_sessions(), 0);
    }
}
