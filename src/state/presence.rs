//! Presence registry - the single source of truth for room membership.
//!
//! Two maps are kept in lockstep behind one lock: note -> member entries
//! (insertion-ordered, one per connection) and connection -> joined notes
//! (inverse index for O(room-count) disconnect cleanup). Only the room
//! membership manager and the connection lifecycle mutate this state;
//! everything else reads rosters.
//!
//! The lock is never held across an await point. Callers take a snapshot
//! (roster or connection list) and release before any I/O.

use super::{ConnId, NoteId};
use notewire::Peer;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct Entry {
    conn: ConnId,
    peer: Peer,
}

#[derive(Default)]
struct Inner {
    /// Room members per note, in join order. Rooms are drained, never
    /// removed, so an empty vec means "no one is here right now".
    rooms: HashMap<NoteId, Vec<Entry>>,
    /// Inverse index: connection -> notes it has joined.
    memberships: HashMap<ConnId, HashSet<NoteId>>,
}

/// In-memory membership and roster state.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: RwLock<Inner>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a connection to a note's room. Re-joining an already-joined
    /// pair is a no-op.
    pub fn join(&self, note_id: &str, conn_id: &str, user_id: &str, username: &str) {
        let mut inner = self.inner.write();

        let joined = inner.memberships.entry(conn_id.to_string()).or_default();
        if !joined.insert(note_id.to_string()) {
            return;
        }

        inner
            .rooms
            .entry(note_id.to_string())
            .or_default()
            .push(Entry {
                conn: conn_id.to_string(),
                peer: Peer {
                    id: user_id.to_string(),
                    username: username.to_string(),
                },
            });
    }

    /// Remove a connection from every room it joined.
    ///
    /// Returns the updated roster of each room that changed, so the caller
    /// can broadcast per-room `user-left` events. Unknown connections are a
    /// no-op: disconnect cleanup must never fail.
    pub fn leave(&self, conn_id: &str) -> Vec<(NoteId, Vec<Peer>)> {
        let mut inner = self.inner.write();

        let Some(joined) = inner.memberships.remove(conn_id) else {
            return Vec::new();
        };

        let mut changed = Vec::with_capacity(joined.len());
        for note_id in joined {
            if let Some(entries) = inner.rooms.get_mut(&note_id) {
                entries.retain(|e| e.conn != conn_id);
                let roster = entries.iter().map(|e| e.peer.clone()).collect();
                changed.push((note_id, roster));
            }
        }
        changed
    }

    /// Current roster of a room, in join order. One entry per connection,
    /// so a user with two connections appears twice.
    pub fn roster_of(&self, note_id: &str) -> Vec<Peer> {
        self.inner
            .read()
            .rooms
            .get(note_id)
            .map(|entries| entries.iter().map(|e| e.peer.clone()).collect())
            .unwrap_or_default()
    }

    /// Notes a connection is currently joined to.
    pub fn rooms_of(&self, conn_id: &str) -> Vec<NoteId> {
        self.inner
            .read()
            .memberships
            .get(conn_id)
            .map(|notes| notes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The identity a connection holds in a specific room, if joined.
    pub fn member(&self, note_id: &str, conn_id: &str) -> Option<Peer> {
        self.inner
            .read()
            .rooms
            .get(note_id)?
            .iter()
            .find(|e| e.conn == conn_id)
            .map(|e| e.peer.clone())
    }

    /// Connection ids currently in a room, for fan-out.
    pub fn connections_in(&self, note_id: &str) -> Vec<ConnId> {
        self.inner
            .read()
            .rooms
            .get(note_id)
            .map(|entries| entries.iter().map(|e| e.conn.clone()).collect())
            .unwrap_or_default()
    }
}
