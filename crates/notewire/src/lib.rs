//! # notewire
//!
//! Wire protocol for the notesyncd real-time collaboration server.
//!
//! Frames are JSON objects, one per line, adjacently tagged with an `event`
//! name and a `data` payload:
//!
//! ```text
//! {"event":"edit-note","data":{"noteId":"n2","content":"hi"}}
//! ```
//!
//! The crate provides the event enums for both directions
//! ([`ClientEvent`], [`ServerEvent`]), a direction-generic tokio codec
//! ([`EventCodec`]), and the protocol error type.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod event;

pub use codec::{ClientCodec, EventCodec, ServerCodec};
pub use error::ProtocolError;
pub use event::{ClientEvent, Peer, ServerEvent};
