//! Room membership management.
//!
//! Computes which notes a user may access and binds a connection to exactly
//! those rooms. Binding happens once, at connection establishment; grants
//! that arrive mid-session are only picked up by a fresh connection.

use crate::state::{Hub, NoteId};
use crate::store::{StoreError, User};
use tracing::debug;

/// Compute accessible note ids and join the connection to each room.
///
/// Returns the joined ids in store order; the first one is the primary room
/// for the initial roster snapshot. Joining updates only the presence
/// registry - emitting `init`/`user-joined` is the lifecycle controller's
/// job, so this stays broadcast-free and easy to test.
pub async fn bind_connection(
    hub: &Hub,
    conn_id: &str,
    user: &User,
) -> Result<Vec<NoteId>, StoreError> {
    let notes = hub.store.list_accessible_notes(&user.id).await?;

    let mut joined = Vec::with_capacity(notes.len());
    for note in notes {
        hub.presence.join(&note.id, conn_id, &user.id, &user.username);
        joined.push(note.id);
    }

    debug!(conn = %conn_id, user = %user.id, rooms = joined.len(), "Connection bound");
    Ok(joined)
}
