//! Edit propagation pipeline.
//!
//! An edit intent is authorized, persisted, then broadcast to the other
//! members of the note's room. Every failure short of delivery is a silent
//! drop on the wire: the real-time channel never returns error frames, so
//! unauthorized probes learn nothing. Outcomes are logged server-side.

use crate::policy;
use crate::state::Hub;
use notewire::ServerEvent;
use std::collections::HashSet;
use tracing::warn;

/// What happened to an edit intent. Only `Applied` is observable by peers;
/// the rest are silent drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Persisted and broadcast to the room (sender excluded).
    Applied,
    /// The note does not exist - treated as a stale reference, not a fault.
    NoteMissing,
    /// The acting user may not edit this note.
    Denied,
    /// The storage collaborator failed; nothing was broadcast.
    PersistenceFailed,
}

impl EditOutcome {
    /// Static label for structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::NoteMissing => "note_missing",
            Self::Denied => "denied",
            Self::PersistenceFailed => "persistence_failed",
        }
    }
}

/// Apply an authoritative edit from `conn_id` acting as `user_id`.
///
/// Visibility is preserved - an edit only ever replaces content. The
/// persisted value under concurrent writers is whichever persistence call
/// completes last; no cross-writer ordering is imposed.
pub async fn apply_edit(
    hub: &Hub,
    conn_id: &str,
    user_id: &str,
    note_id: &str,
    content: String,
) -> EditOutcome {
    let note = match hub.store.get_note_by_id(note_id).await {
        Ok(Some(note)) => note,
        Ok(None) => return EditOutcome::NoteMissing,
        Err(e) => {
            warn!(note = %note_id, error = %e, "Note lookup failed during edit");
            return EditOutcome::PersistenceFailed;
        }
    };

    let permitted: HashSet<String> = match hub.store.get_permitted_users(note_id).await {
        Ok(users) => users.into_iter().collect(),
        Err(e) => {
            warn!(note = %note_id, error = %e, "Permission lookup failed during edit");
            return EditOutcome::PersistenceFailed;
        }
    };

    if !policy::can_edit(&note, user_id, &permitted) {
        return EditOutcome::Denied;
    }

    if let Err(e) = hub.store.update_note_content(note_id, &content).await {
        // Known gap, preserved: the sender is not told. Logged only.
        warn!(note = %note_id, user = %user_id, error = %e, "Edit persistence failed");
        return EditOutcome::PersistenceFailed;
    }

    hub.broadcast_to_room(
        note_id,
        ServerEvent::NoteUpdated {
            note_id: note_id.to_string(),
            content,
        },
        Some(conn_id),
    )
    .await;

    EditOutcome::Applied
}
