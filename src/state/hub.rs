//! The Hub - central shared state for the synchronization engine.
//!
//! The Hub owns the presence registry, the per-connection outbound senders,
//! and the injected note store. It is shared as an `Arc` across all
//! connection tasks.

use super::{ConnId, PresenceRegistry};
use crate::config::{Config, LimitsConfig};
use crate::store::NoteStore;
use dashmap::DashMap;
use notewire::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Central shared state container.
pub struct Hub {
    /// Room membership and rosters.
    pub presence: PresenceRegistry,

    /// Outbound event sender per live connection, for fan-out routing.
    pub senders: DashMap<ConnId, mpsc::Sender<ServerEvent>>,

    /// Injected storage collaborator.
    pub store: Arc<dyn NoteStore>,

    /// Per-connection resource limits.
    pub limits: LimitsConfig,
}

impl Hub {
    /// Create a new Hub around an injected store.
    pub fn new(config: &Config, store: Arc<dyn NoteStore>) -> Self {
        Self {
            presence: PresenceRegistry::new(),
            senders: DashMap::new(),
            store,
            limits: config.limits.clone(),
        }
    }

    /// Register a connection's outbound sender for routing.
    pub fn register_sender(&self, conn_id: &str, sender: mpsc::Sender<ServerEvent>) {
        self.senders.insert(conn_id.to_string(), sender);
    }

    /// Unregister a connection's outbound sender.
    pub fn unregister_sender(&self, conn_id: &str) {
        self.senders.remove(conn_id);
    }

    /// Broadcast an event to every connection in a note's room, optionally
    /// excluding one (usually the sender, which already holds the value).
    ///
    /// The roster snapshot is taken before any send so the presence lock is
    /// never held across an await.
    pub async fn broadcast_to_room(
        &self,
        note_id: &str,
        event: ServerEvent,
        exclude: Option<&str>,
    ) {
        let conns = self.presence.connections_in(note_id);
        for conn in conns {
            if exclude.is_some_and(|e| e == conn) {
                continue;
            }
            if let Some(sender) = self.senders.get(&conn).map(|s| s.clone()) {
                let _ = sender.send(event.clone()).await;
            }
        }
    }

    /// Tear down a connection: drain presence, broadcast updated rosters to
    /// every room it had joined, and drop its sender.
    ///
    /// Infallible by construction - an already-cleaned connection is a
    /// no-op. Returns the affected note ids.
    pub async fn disconnect(&self, conn_id: &str) -> Vec<String> {
        let changed = self.presence.leave(conn_id);
        self.unregister_sender(conn_id);

        let mut affected = Vec::with_capacity(changed.len());
        for (note_id, roster) in changed {
            self.broadcast_to_room(&note_id, ServerEvent::UserLeft(roster), None)
                .await;
            affected.push(note_id);
        }

        if !affected.is_empty() {
            debug!(conn = %conn_id, rooms = affected.len(), "Presence drained");
        }
        affected
    }
}
