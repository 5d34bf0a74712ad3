//! Unified error handling for notesyncd.
//!
//! The real-time channel is fire-and-forget: authorization failures and
//! stale note references are dropped without a client-visible error frame.
//! The types here exist for server-side logging and for refusing a
//! connection at the trust boundary, not for wire replies.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that terminate or refuse a connection.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The first frame was not an identity claim, or never arrived.
    #[error("no identity claim in handshake")]
    IdentityMissing,

    /// The claimed user id does not resolve to a known user record.
    #[error("unknown user: {0}")]
    IdentityUnknown(String),

    /// Framing or parse failure on the transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] notewire::ProtocolError),

    /// Store failure while establishing the session.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Static code for structured log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityMissing => "identity_missing",
            Self::IdentityUnknown(_) => "identity_unknown",
            Self::Protocol(_) => "protocol_error",
            Self::Store(_) => "store_error",
        }
    }

    /// Whether this is a fail-closed handshake refusal (no events emitted,
    /// no state to clean up).
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::IdentityMissing | Self::IdentityUnknown(_))
    }
}

/// Result type for connection handling.
pub type SessionResult = Result<(), SessionError>;
