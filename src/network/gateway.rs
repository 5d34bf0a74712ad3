//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds a socket and spawns a Connection task per client.
//! A broadcast shutdown signal reaches both the accept loop and every
//! live connection.

use crate::network::Connection;
use crate::state::Hub;
use crate::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, hub: Arc<Hub>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        info!(addr = %listener.local_addr()?, "Listener bound");
        Ok(Self {
            listener,
            hub,
            shutdown_tx,
        })
    }

    /// The actually bound address (resolves port 0 for tests).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for signaling server shutdown.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run the gateway until a shutdown signal arrives.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let conn_id = Uuid::new_v4().to_string();
                        info!(conn = %conn_id, %addr, "Connection accepted");

                        let hub = Arc::clone(&self.hub);
                        let shutdown = self.shutdown_tx.subscribe();
                        let span = telemetry::connection_span(&conn_id, &addr.ip().to_string());

                        tokio::spawn(
                            async move {
                                let connection =
                                    Connection::new(conn_id.clone(), stream, addr, hub, shutdown);
                                match connection.run().await {
                                    Ok(()) => info!(conn = %conn_id, "Connection closed"),
                                    Err(e) if e.is_refusal() => {
                                        info!(conn = %conn_id, code = e.error_code(), "Connection refused")
                                    }
                                    Err(e) => {
                                        info!(conn = %conn_id, code = e.error_code(), error = %e, "Connection closed with error")
                                    }
                                }
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },

                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received - gateway stopping");
                    return Ok(());
                }
            }
        }
    }
}
