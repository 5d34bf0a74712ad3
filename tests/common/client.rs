//! Test client for integration tests.
//!
//! Speaks the newline-delimited JSON event protocol over a raw TCP
//! stream, with timeout-guarded receive helpers.

use futures_util::{SinkExt, StreamExt};
use notewire::{ClientCodec, ClientEvent, Peer, ServerEvent};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

/// Default receive timeout. Generous so slow CI does not flake.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before declaring that nothing was sent.
pub const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// A test client connection.
pub struct TestClient {
    framed: Framed<TcpStream, ClientCodec>,
}

impl TestClient {
    /// Connect to the server.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            framed: Framed::new(stream, ClientCodec::new()),
        })
    }

    /// Send the identity claim that opens a session.
    pub async fn hello(&mut self, id: &str) -> anyhow::Result<()> {
        self.send(ClientEvent::Hello {
            id: id.into(),
            username: Some(id.into()),
        })
        .await
    }

    /// Send any client event.
    pub async fn send(&mut self, event: ClientEvent) -> anyhow::Result<()> {
        self.framed.send(event).await?;
        Ok(())
    }

    /// Receive the next event, failing on timeout or closed stream.
    pub async fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        match self.recv_opt(RECV_TIMEOUT).await? {
            Some(event) => Ok(event),
            None => anyhow::bail!("server closed the connection"),
        }
    }

    /// Receive the next event within `wait`. `Ok(None)` means the server
    /// closed the stream; a timeout is an error.
    pub async fn recv_opt(&mut self, wait: Duration) -> anyhow::Result<Option<ServerEvent>> {
        match timeout(wait, self.framed.next()).await {
            Ok(Some(Ok(event))) => Ok(Some(event)),
            Ok(Some(Err(e))) => Err(e.into()),
            Ok(None) => Ok(None),
            Err(_) => anyhow::bail!("timed out waiting for an event"),
        }
    }

    /// Skip events until one matches the predicate, or fail on timeout.
    pub async fn recv_until<F>(&mut self, mut matches: F) -> anyhow::Result<ServerEvent>
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        loop {
            let event = self.recv().await?;
            if matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Assert the initial roster snapshot arrives with the given user ids,
    /// in order.
    pub async fn expect_init(&mut self, expected_ids: &[&str]) -> anyhow::Result<Vec<Peer>> {
        match self.recv().await? {
            ServerEvent::Init { users } => {
                let ids: Vec<&str> = users.iter().map(|p| p.id.as_str()).collect();
                anyhow::ensure!(
                    ids == expected_ids,
                    "init roster mismatch: got {ids:?}, expected {expected_ids:?}"
                );
                Ok(users)
            }
            other => anyhow::bail!("expected init, got {other:?}"),
        }
    }

    /// Assert that no event arrives within the silence window.
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        match self.recv_opt(SILENCE_WINDOW).await {
            Ok(Some(event)) => anyhow::bail!("expected silence, got {event:?}"),
            Ok(None) => anyhow::bail!("expected silence, but the server closed the stream"),
            Err(_) => Ok(()),
        }
    }

    /// Assert the server closes the stream without sending anything.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        match self.recv_opt(RECV_TIMEOUT).await? {
            None => Ok(()),
            Some(event) => anyhow::bail!("expected close, got {event:?}"),
        }
    }
}
