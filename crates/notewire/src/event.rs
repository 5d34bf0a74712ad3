//! Event types for the bidirectional real-time surface.
//!
//! Event names and payload keys are part of the external contract and must
//! not change: clients match on the literal `event` string and camelCase
//! payload fields.

use serde::{Deserialize, Serialize};

/// A user visible in a room roster.
///
/// Rosters carry one entry per connection, so the same user id may appear
/// twice when a user holds two connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// User id.
    pub id: String,
    /// Display name.
    pub username: String,
}

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Handshake identity claim. Must be the first frame on a connection.
    ///
    /// The claim is trusted after an existence check against the user store;
    /// token verification belongs to an external auth collaborator.
    Hello {
        /// Claimed user id.
        id: String,
        /// Optional display name override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// Authoritative edit intent for one note.
    #[serde(rename_all = "camelCase")]
    EditNote {
        /// Target note id.
        note_id: String,
        /// Full replacement content.
        content: String,
    },

    /// Ephemeral typing signal, fanned out to every room the sender is in.
    #[serde(rename_all = "camelCase")]
    Editing {
        /// Whether the sender is currently editing.
        is_editing: bool,
        /// In-progress content preview, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once after a successful bind: roster of the primary room.
    Init {
        /// Connections present in the primary room, insertion-ordered.
        users: Vec<Peer>,
    },

    /// Full updated roster after a connection joined a room.
    UserJoined(Vec<Peer>),

    /// Full updated roster after a connection left a room.
    UserLeft(Vec<Peer>),

    /// Authoritative content broadcast; never echoed to the editor.
    #[serde(rename_all = "camelCase")]
    NoteUpdated {
        /// Edited note id.
        note_id: String,
        /// Persisted content.
        content: String,
    },

    /// Fan-out of a peer's typing signal.
    EditingIndicator {
        /// User id of the signaling peer.
        id: String,
        /// Display name of the signaling peer.
        username: String,
        /// Whether the peer is editing.
        editing: bool,
    },

    /// Unpersisted live preview of a peer's in-progress content.
    #[serde(rename_all = "camelCase")]
    ContentUpdate {
        /// Note id the preview applies to.
        note_id: String,
        /// In-progress content.
        content: String,
    },
}
