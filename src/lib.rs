//! notesyncd - real-time collaborative note synchronization daemon.
//!
//! The core is a presence and synchronization engine: connections bind to
//! per-note rooms, authoritative edits persist through the note store and
//! fan out to room peers, and ephemeral editing indicators are relayed
//! without touching persisted state.
//!
//! Built as a library so integration tests can run the server in-process;
//! `src/main.rs` is a thin binary wrapper.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod policy;
pub mod rooms;
pub mod state;
pub mod store;
pub mod telemetry;
