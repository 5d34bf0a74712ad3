//! Shared server state: presence registry and the hub that owns it.

pub mod hub;
pub mod presence;

pub use hub::Hub;
pub use presence::PresenceRegistry;

/// Ephemeral connection identifier, unique per transport session.
pub type ConnId = String;

/// Note identifier; one room exists per note.
pub type NoteId = String;
