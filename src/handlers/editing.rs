//! Live editing-indicator broadcaster.
//!
//! Ephemeral "I am typing" signals fan out to the peers of every room the
//! connection belongs to - the signal carries no note id, only implicit
//! room membership. Nothing is persisted and no policy check runs beyond
//! the membership established at join time. The latest signal instance is
//! the only state of interest to receivers.

use crate::state::Hub;
use notewire::ServerEvent;

/// Fan out an editing signal (and optional in-progress content preview)
/// from `conn_id` to its room peers.
pub async fn signal(hub: &Hub, conn_id: &str, is_editing: bool, content: Option<String>) {
    for note_id in hub.presence.rooms_of(conn_id) {
        let Some(peer) = hub.presence.member(&note_id, conn_id) else {
            // Raced with disconnect cleanup; nothing to announce here.
            continue;
        };

        hub.broadcast_to_room(
            &note_id,
            ServerEvent::EditingIndicator {
                id: peer.id,
                username: peer.username,
                editing: is_editing,
            },
            Some(conn_id),
        )
        .await;

        if let Some(content) = &content {
            hub.broadcast_to_room(
                &note_id,
                ServerEvent::ContentUpdate {
                    note_id: note_id.clone(),
                    content: content.clone(),
                },
                Some(conn_id),
            )
            .await;
        }
    }
}
