//! Test server management.
//!
//! Runs the gateway in-process on an ephemeral port, backed by an
//! in-memory store the test can seed and inspect directly.

use notesyncd::config::{Config, DatabaseConfig, LimitsConfig, ListenConfig, ServerConfig};
use notesyncd::network::Gateway;
use notesyncd::state::Hub;
use notesyncd::store::{MemoryStore, Note, NoteStore, User, Visibility};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// An in-process server instance.
pub struct TestServer {
    /// Seedable backing store.
    pub store: Arc<MemoryStore>,
    /// Shared state, for direct presence assertions.
    pub hub: Arc<Hub>,
    addr: SocketAddr,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server on an ephemeral port.
    pub async fn spawn() -> anyhow::Result<Self> {
        let config = Config {
            server: ServerConfig {
                name: "notes.test".into(),
            },
            listen: ListenConfig {
                address: "127.0.0.1:0".parse()?,
            },
            database: DatabaseConfig {
                path: ":memory:".into(),
            },
            limits: LimitsConfig::default(),
        };

        let store = Arc::new(MemoryStore::new());
        let hub = Arc::new(Hub::new(&config, store.clone()));

        let gateway = Gateway::bind(config.listen.address, Arc::clone(&hub)).await?;
        let addr = gateway.local_addr()?;
        let shutdown = gateway.shutdown_handle();

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            store,
            hub,
            addr,
            shutdown,
            task,
        })
    }

    /// Address clients should connect to.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Seed a user record (id doubles as username).
    pub async fn seed_user(&self, id: &str) {
        self.store
            .create_user(&User {
                id: id.into(),
                username: id.into(),
            })
            .await
            .expect("seed user");
    }

    /// Seed a note.
    pub async fn seed_note(&self, id: &str, owner: &str, visibility: Visibility, content: &str) {
        self.store
            .create_note(&Note {
                id: id.into(),
                owner: owner.into(),
                content: content.into(),
                visibility,
                updated_at: 0,
            })
            .await
            .expect("seed note");
    }

    /// Grant a user access to a private note, as the external share
    /// operation would.
    pub async fn share(&self, note_id: &str, user_id: &str) {
        self.store
            .add_permission(note_id, user_id)
            .await
            .expect("share note");
    }

    /// Current content of a note, for no-persistence assertions.
    pub async fn note_content(&self, note_id: &str) -> String {
        self.store
            .get_note_by_id(note_id)
            .await
            .expect("get note")
            .expect("note exists")
            .content
    }

    /// Signal server shutdown to the gateway and all connections.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
