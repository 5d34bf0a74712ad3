//! Tracing span constructors for connection observability.

use tracing::{info_span, Span};

/// Span covering a transport session from accept to teardown.
pub fn connection_span(conn: &str, ip: &str) -> Span {
    info_span!("connection", conn = %conn, ip = %ip)
}

/// Span covering a bound session (identity resolved, rooms joined).
pub fn session_span(conn: &str, user: &str) -> Span {
    info_span!("session", conn = %conn, user = %user)
}
