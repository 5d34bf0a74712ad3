//! Event handlers for the active connection state.

pub mod edit;
pub mod editing;

pub use edit::{apply_edit, EditOutcome};
pub use editing::signal;

use crate::state::Hub;
use notewire::ClientEvent;
use tracing::debug;

/// A bound session: the connection's identity for the rest of its lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    pub conn_id: String,
    pub user_id: String,
    pub username: String,
}

/// Route one inbound frame from an active connection.
pub async fn dispatch(hub: &Hub, session: &Session, event: ClientEvent) {
    match event {
        ClientEvent::EditNote { note_id, content } => {
            let outcome = apply_edit(hub, &session.conn_id, &session.user_id, &note_id, content)
                .await;
            debug!(
                conn = %session.conn_id,
                user = %session.user_id,
                note = %note_id,
                outcome = outcome.as_str(),
                "Edit processed"
            );
        }
        ClientEvent::Editing {
            is_editing,
            content,
        } => {
            signal(hub, &session.conn_id, is_editing, content).await;
        }
        ClientEvent::Hello { .. } => {
            // Identity was already claimed at handshake; a repeat is noise.
            debug!(conn = %session.conn_id, "Ignoring repeated hello");
        }
    }
}
