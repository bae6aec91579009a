//! Per-connection handler: decode inbound events, route them to the room
//! layer, pump outbound events back to the socket.
//!
//! Each accepted connection gets its own task running [`handle_connection`],
//! plus a small pump task that drains the connection's outbound channel.
//! The handler keeps one piece of local state — which room this connection
//! is bound to and in which role — mirroring what the room layer knows, so
//! a dropped socket can be routed as the right kind of disconnect.

use std::sync::Arc;

use tokio::sync::mpsc;

use quizcast_protocol::{
    ClientEvent, Codec, ConnectionId, ErrorCode, Identity, RoomCode,
    RoomSummary, ServerEvent,
};
use quizcast_room::EventSender;

use crate::server::ServerState;
use crate::transport::WebSocketConnection;

/// Which role this connection holds in its room.
enum Role {
    Host,
    Player(Identity),
}

/// The connection's current room binding.
struct ConnBinding {
    room: RoomCode,
    role: Role,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) {
    let conn = Arc::new(conn);
    let conn_id = conn.id();

    // Outbound pump: everything the room layer (or this handler) wants to
    // tell this client flows through one channel, preserving emission order.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let pump_conn = Arc::clone(&conn);
    let codec = state.codec;
    let pump = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if pump_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    let mut binding: Option<ConnBinding> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable event");
                send_error(&event_tx, ErrorCode::BadRequest, "malformed event");
                continue;
            }
        };

        dispatch(&state, &event_tx, conn_id, &mut binding, event).await;
    }

    // Transport-level disconnect notification: route to the room layer so
    // the host-exit policy or offline-marking applies.
    if let Some(b) = binding {
        let mut registry = state.registry.lock().await;
        let identity = match b.role {
            Role::Host => None,
            Role::Player(identity) => Some(identity),
        };
        registry.connection_lost(&b.room, conn_id, identity).await;
    }

    pump.abort();
}

/// Routes one decoded event.
async fn dispatch(
    state: &Arc<ServerState>,
    event_tx: &EventSender,
    conn_id: ConnectionId,
    binding: &mut Option<ConnBinding>,
    event: ClientEvent,
) {
    match event {
        // -- Host actions -------------------------------------------------

        ClientEvent::CreateRoom { game_type, display_name } => {
            if binding.is_some() {
                send_error(
                    event_tx,
                    ErrorCode::BadRequest,
                    "connection is already bound to a room",
                );
                return;
            }
            let mut registry = state.registry.lock().await;
            match registry.create_room(&game_type, conn_id, event_tx.clone()) {
                Ok(code) => {
                    tracing::info!(
                        room = %code,
                        host = %display_name,
                        game_type = %game_type,
                        "host opened a room"
                    );
                    *binding = Some(ConnBinding {
                        room: code.clone(),
                        role: Role::Host,
                    });
                    let _ = event_tx.send(ServerEvent::RoomCreated {
                        room: RoomSummary { code },
                    });
                }
                Err(e) => send_error(event_tx, e.code(), &e.to_string()),
            }
        }

        ClientEvent::StartGame { room } => {
            host_transition(state, event_tx, conn_id, &room, Transition::Start)
                .await;
        }

        ClientEvent::RevealAnswer { room } => {
            host_transition(state, event_tx, conn_id, &room, Transition::Reveal)
                .await;
        }

        ClientEvent::NextQuestion { room } => {
            host_transition(state, event_tx, conn_id, &room, Transition::Next)
                .await;
        }

        ClientEvent::CloseRoom { room } => {
            let Some(code) = parse_code(event_tx, &room) else {
                return;
            };
            let mut registry = state.registry.lock().await;
            match registry.close_room_by(conn_id, &code, "closed by host").await
            {
                Ok(()) => {
                    if binding.as_ref().is_some_and(|b| b.room == code) {
                        *binding = None;
                    }
                }
                Err(e) => send_error(event_tx, e.code(), &e.to_string()),
            }
        }

        // -- Player actions -----------------------------------------------

        ClientEvent::Join { room, display_name, avatar, identity, force } => {
            let Some(code) = parse_code(event_tx, &room) else {
                return;
            };
            let mut registry = state.registry.lock().await;
            let result = registry
                .join(
                    &code,
                    identity.clone(),
                    display_name,
                    avatar,
                    conn_id,
                    event_tx.clone(),
                    force,
                )
                .await;
            match result {
                Ok(()) => {
                    *binding = Some(ConnBinding {
                        room: code,
                        role: Role::Player(identity),
                    });
                }
                Err(e) => send_error(event_tx, e.code(), &e.to_string()),
            }
        }

        ClientEvent::Rejoin { room, identity } => {
            let Some(code) = parse_code(event_tx, &room) else {
                return;
            };
            let mut registry = state.registry.lock().await;
            let result = registry
                .rejoin(&code, identity.clone(), conn_id, event_tx.clone())
                .await;
            match result {
                Ok(()) => {
                    *binding = Some(ConnBinding {
                        room: code,
                        role: Role::Player(identity),
                    });
                }
                Err(e) => send_error(event_tx, e.code(), &e.to_string()),
            }
        }

        ClientEvent::SubmitAnswer { room, payload } => {
            let Some((code, identity)) =
                player_binding(event_tx, binding, &room)
            else {
                return;
            };
            let handle = state.registry.lock().await.lookup(&code);
            match handle {
                Some(handle) => {
                    if let Err(e) = handle.submit(identity, payload).await {
                        send_error(event_tx, e.code(), &e.to_string());
                    }
                }
                None => send_error(
                    event_tx,
                    ErrorCode::RoomNotFound,
                    "room is gone",
                ),
            }
        }

        ClientEvent::Heartbeat { room } => {
            let Some((code, identity)) =
                player_binding(event_tx, binding, &room)
            else {
                return;
            };
            if let Some(handle) = state.registry.lock().await.lookup(&code) {
                let _ = handle.heartbeat(identity).await;
            }
        }
    }
}

/// The three host-driven phase transitions.
enum Transition {
    Start,
    Reveal,
    Next,
}

/// Looks up the room and fires a host-driven transition request.
///
/// The room actor itself decides authority and phase; lookup failures are
/// the only errors surfaced here.
async fn host_transition(
    state: &Arc<ServerState>,
    event_tx: &EventSender,
    conn_id: ConnectionId,
    room: &str,
    which: Transition,
) {
    let Some(code) = parse_code(event_tx, room) else {
        return;
    };
    let handle = state.registry.lock().await.lookup(&code);
    match handle {
        Some(handle) => {
            let result = match which {
                Transition::Start => handle.start_game(conn_id).await,
                Transition::Reveal => handle.reveal_answer(conn_id).await,
                Transition::Next => handle.next_question(conn_id).await,
            };
            if let Err(e) = result {
                send_error(event_tx, e.code(), &e.to_string());
            }
        }
        None => {
            send_error(event_tx, ErrorCode::RoomNotFound, "no such room")
        }
    }
}

/// Normalizes a caller-supplied room code, reporting malformed input.
fn parse_code(event_tx: &EventSender, raw: &str) -> Option<RoomCode> {
    match RoomCode::parse(raw) {
        Some(code) => Some(code),
        None => {
            send_error(event_tx, ErrorCode::BadRequest, "malformed room code");
            None
        }
    }
}

/// Requires this connection to be bound as a player of the named room.
fn player_binding(
    event_tx: &EventSender,
    binding: &Option<ConnBinding>,
    raw_room: &str,
) -> Option<(RoomCode, Identity)> {
    let code = parse_code(event_tx, raw_room)?;
    match binding {
        Some(ConnBinding { room, role: Role::Player(identity) })
            if *room == code =>
        {
            Some((code, identity.clone()))
        }
        _ => {
            send_error(
                event_tx,
                ErrorCode::BadRequest,
                "connection is not a player of this room",
            );
            None
        }
    }
}

fn send_error(event_tx: &EventSender, code: ErrorCode, message: &str) {
    let _ = event_tx.send(ServerEvent::Error {
        code,
        message: message.to_string(),
    });
}
