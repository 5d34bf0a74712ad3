//! Per-connection lifecycle controller.
//!
//! State machine per connection: Connecting -> Bound -> Active ->
//! Disconnected. The Connecting->Bound transition fails closed: a missing
//! or unresolvable identity claim terminates the connection with no events
//! emitted and no partial state. Disconnect - client close, I/O failure,
//! or server shutdown - is the only path to the terminal state and always
//! drains presence.

use crate::error::{SessionError, SessionResult};
use crate::handlers::{self, Session};
use crate::rooms;
use crate::state::{ConnId, Hub};
use crate::store::User;
use crate::telemetry;
use futures_util::{SinkExt, StreamExt};
use notewire::{ClientEvent, ServerCodec, ServerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn, Instrument};

/// Lifecycle states of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Transport open, identity not yet validated.
    Connecting,
    /// Identity resolved, rooms joined, initial roster emitted.
    Bound,
    /// Handling edit and editing-signal frames.
    Active,
    /// Terminal. All registry entries referencing the connection are gone.
    Disconnected,
}

impl SessionState {
    fn advance(&mut self, next: SessionState, conn: &str) {
        debug!(conn = %conn, from = ?self, to = ?next, "Lifecycle transition");
        *self = next;
    }
}

/// A single live transport session.
pub struct Connection {
    conn_id: ConnId,
    stream: TcpStream,
    addr: SocketAddr,
    hub: Arc<Hub>,
    shutdown: broadcast::Receiver<()>,
}

impl Connection {
    pub fn new(
        conn_id: ConnId,
        stream: TcpStream,
        addr: SocketAddr,
        hub: Arc<Hub>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            conn_id,
            stream,
            addr,
            hub,
            shutdown,
        }
    }

    /// Drive the connection to completion.
    ///
    /// Handshake refusals return an error without ever emitting an event;
    /// once bound, teardown always runs, whatever ends the session.
    pub async fn run(self) -> SessionResult {
        let Self {
            conn_id,
            stream,
            addr,
            hub,
            mut shutdown,
        } = self;

        let mut state = SessionState::Connecting;
        let mut framed = Framed::new(
            stream,
            ServerCodec::with_max_frame(hub.limits.max_frame_bytes),
        );

        // Connecting: the first frame must be an identity claim that
        // resolves to a known user. This is the single place a token-based
        // check would slot in later.
        let user = handshake(&hub, &mut framed).await?;
        debug!(conn = %conn_id, user = %user.id, addr = %addr, "Identity resolved");

        // Register the outbound queue before joining rooms so no broadcast
        // can race into the gap between bind and routability.
        let (tx, mut rx) = mpsc::channel::<ServerEvent>(hub.limits.send_queue);
        hub.register_sender(&conn_id, tx);

        let joined = match rooms::bind_connection(&hub, &conn_id, &user).await {
            Ok(joined) => joined,
            Err(e) => {
                hub.unregister_sender(&conn_id);
                return Err(e.into());
            }
        };
        state.advance(SessionState::Bound, &conn_id);

        // Initial snapshot: roster of the primary (first accessible) room
        // to the new connection, updated roster to the room's peers. A user
        // with no accessible notes binds to nothing and gets no init.
        if let Some(primary) = joined.first() {
            let roster = hub.presence.roster_of(primary);
            if let Err(e) = framed
                .send(ServerEvent::Init {
                    users: roster.clone(),
                })
                .await
            {
                warn!(conn = %conn_id, error = %e, "Init write failed");
                hub.disconnect(&conn_id).await;
                return Err(e.into());
            }
            hub.broadcast_to_room(primary, ServerEvent::UserJoined(roster), Some(&conn_id))
                .await;
        }

        let session = Session {
            conn_id: conn_id.clone(),
            user_id: user.id.clone(),
            username: user.username.clone(),
        };
        state.advance(SessionState::Active, &conn_id);
        info!(conn = %conn_id, user = %user.id, rooms = joined.len(), "Session active");

        let result = active_loop(&hub, &session, &mut framed, &mut rx, &mut shutdown)
            .instrument(telemetry::session_span(&conn_id, &user.id))
            .await;

        // Disconnect drains presence and announces the updated rosters to
        // every room this connection had joined.
        state.advance(SessionState::Disconnected, &conn_id);
        let affected = hub.disconnect(&conn_id).await;
        info!(
            conn = %conn_id,
            user = %user.id,
            rooms = affected.len(),
            state = ?state,
            "Session closed"
        );

        result
    }
}

/// Resolve the handshake identity claim. Fail-closed: anything other than
/// a `hello` frame naming a known user refuses the connection.
async fn handshake(
    hub: &Hub,
    framed: &mut Framed<TcpStream, ServerCodec>,
) -> Result<User, SessionError> {
    let claim = match framed.next().await {
        Some(Ok(ClientEvent::Hello { id, username: _ })) => id,
        Some(Ok(_)) => return Err(SessionError::IdentityMissing),
        Some(Err(e)) => return Err(e.into()),
        None => return Err(SessionError::IdentityMissing),
    };

    if claim.is_empty() {
        return Err(SessionError::IdentityMissing);
    }

    // Existence check only; the claimed username is ignored in favor of
    // the stored record. Token verification is the auth collaborator's
    // job, not this layer's.
    match hub.store.get_user_by_id(&claim).await? {
        Some(user) => Ok(user),
        None => Err(SessionError::IdentityUnknown(claim)),
    }
}

/// Active state: multiplex inbound frames, outbound broadcasts, and the
/// server shutdown signal until one of them ends the session.
async fn active_loop(
    hub: &Hub,
    session: &Session,
    framed: &mut Framed<TcpStream, ServerCodec>,
    rx: &mut mpsc::Receiver<ServerEvent>,
    shutdown: &mut broadcast::Receiver<()>,
) -> SessionResult {
    loop {
        tokio::select! {
            frame = framed.next() => match frame {
                Some(Ok(event)) => handlers::dispatch(hub, session, event).await,
                Some(Err(e)) => {
                    warn!(conn = %session.conn_id, error = %e, "Read error");
                    return Err(e.into());
                }
                None => {
                    debug!(conn = %session.conn_id, "Client closed connection");
                    return Ok(());
                }
            },

            Some(event) = rx.recv() => {
                if let Err(e) = framed.send(event).await {
                    warn!(conn = %session.conn_id, error = %e, "Write error");
                    return Err(e.into());
                }
            }

            _ = shutdown.recv() => {
                info!(conn = %session.conn_id, "Server shutting down - closing session");
                return Ok(());
            }
        }
    }
}
