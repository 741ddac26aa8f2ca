//! Per-connection handler: request decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a relay pushing rooms-list changes to the socket
//!   2. Loop: receive requests → dispatch to the registry → reply
//!   3. On join, spawn a relay draining the player's room broadcasts
//!   4. On socket close, the player leaves their room (disconnect == leave)

use std::sync::Arc;

use orbiter_protocol::{
    ClientRequest, Codec, JsonCodec, PlayerId, ServerEvent,
};
use orbiter_room::RoomError;
use orbiter_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::OrbiterError;
use crate::server::ServerState;

/// The room a connection's player currently occupies, plus the relay task
/// forwarding that room's broadcasts to the socket.
struct Membership {
    room: String,
    player_id: PlayerId,
    relay: JoinHandle<()>,
}

impl Membership {
    fn stop(self) {
        self.relay.abort();
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), OrbiterError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let rooms_relay = spawn_rooms_relay(&conn, &state).await;
    let mut membership: Option<Membership> = None;

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

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "failed to decode request"
                );
                send_event(
                    &conn,
                    &state.codec,
                    &ServerEvent::Error {
                        code: 400,
                        message: format!("malformed request: {e}"),
                    },
                )
                .await?;
                continue;
            }
        };

        handle_request(&conn, &state, &mut membership, request).await?;
    }

    rooms_relay.abort();

    // Disconnecting counts as leaving the room.
    if let Some(membership) = membership.take() {
        let mut registry = state.registry.lock().await;
        if let Err(e) = registry
            .leave(&membership.room, membership.player_id.clone())
            .await
        {
            tracing::debug!(
                room = %membership.room,
                error = %e,
                "leave on disconnect failed"
            );
        }
        drop(registry);
        membership.stop();
    }

    Ok(())
}

/// Dispatches one decoded request.
async fn handle_request(
    conn: &Arc<WebSocketConnection>,
    state: &Arc<ServerState>,
    membership: &mut Option<Membership>,
    request: ClientRequest,
) -> Result<(), OrbiterError> {
    match request {
        ClientRequest::CreateOrJoin {
            room,
            player_id,
            team_name,
        } => {
            // One room per connection: switching rooms implies leaving the
            // old one; re-joining the same room just replaces the channel.
            if let Some(current) = membership.take() {
                if current.room != room {
                    let mut registry = state.registry.lock().await;
                    if let Err(e) = registry
                        .leave(&current.room, current.player_id.clone())
                        .await
                    {
                        tracing::debug!(
                            room = %current.room,
                            error = %e,
                            "leave before switching rooms failed"
                        );
                    }
                }
                current.stop();
            }

            let (tx, rx) = mpsc::unbounded_channel();
            let join_result = {
                let mut registry = state.registry.lock().await;
                registry.join(&room, player_id.clone(), team_name, tx).await
            };

            match join_result {
                Ok(snapshot) => {
                    let relay = spawn_event_relay(conn, state.codec, rx);
                    *membership = Some(Membership {
                        room: room.clone(),
                        player_id,
                        relay,
                    });
                    send_event(
                        conn,
                        &state.codec,
                        &ServerEvent::RoomJoined {
                            room,
                            players: snapshot.players,
                            host: snapshot.host,
                        },
                    )
                    .await?;
                }
                Err(e) => send_room_error(conn, &state.codec, &e).await?,
            }
        }

        ClientRequest::Leave { room, player_id } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.leave(&room, player_id).await
            };
            if membership.as_ref().is_some_and(|m| m.room == room) {
                if let Some(current) = membership.take() {
                    current.stop();
                }
            }
            if let Err(e) = result {
                send_room_error(conn, &state.codec, &e).await?;
            }
        }

        ClientRequest::ToggleReady { room, player_id } => {
            let result = {
                let registry = state.registry.lock().await;
                registry.toggle_ready(&room, player_id).await
            };
            if let Err(e) = result {
                send_room_error(conn, &state.codec, &e).await?;
            }
        }

        ClientRequest::UpdateSelection {
            room,
            player_id,
            selections,
            total_mass,
            total_cost,
        } => {
            let result = {
                let registry = state.registry.lock().await;
                registry
                    .update_selection(
                        &room, player_id, selections, total_mass, total_cost,
                    )
                    .await
            };
            if let Err(e) = result {
                send_room_error(conn, &state.codec, &e).await?;
            }
        }

        ClientRequest::StartRound { room, player_id } => {
            let result = {
                let registry = state.registry.lock().await;
                registry.start_round(&room, player_id).await
            };
            // On success everyone — the caller included — learns the
            // schedule from the RoundStarted broadcast.
            if let Err(e) = result {
                send_room_error(conn, &state.codec, &e).await?;
            }
        }

        ClientRequest::ListRooms => {
            let names = state.registry.lock().await.room_names();
            send_event(
                conn,
                &state.codec,
                &ServerEvent::RoomsList { names },
            )
            .await?;
        }

        ClientRequest::GetSummary { room } => {
            let result = {
                let registry = state.registry.lock().await;
                registry.summary(&room).await
            };
            match result {
                Ok(summary) => {
                    send_event(
                        conn,
                        &state.codec,
                        &ServerEvent::Summary { room, summary },
                    )
                    .await?;
                }
                Err(e) => send_room_error(conn, &state.codec, &e).await?,
            }
        }
    }

    Ok(())
}

/// Forwards room broadcasts from the player's channel to the socket.
///
/// Ends when the room drops the sender (player left / room removed) or
/// the socket goes away.
fn spawn_event_relay(
    conn: &Arc<WebSocketConnection>,
    codec: JsonCodec,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) -> JoinHandle<()> {
    let conn = Arc::clone(conn);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(bytes) = codec.encode(&event) else {
                break;
            };
            if conn.send(&bytes).await.is_err() {
                break;
            }
        }
    })
}

/// Pushes a `RoomsList` event whenever the set of rooms changes.
async fn spawn_rooms_relay(
    conn: &Arc<WebSocketConnection>,
    state: &Arc<ServerState>,
) -> JoinHandle<()> {
    let mut watcher = state.registry.lock().await.watch_rooms();
    let conn = Arc::clone(conn);
    let codec = state.codec;
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let names = watcher.borrow_and_update().clone();
            let Ok(bytes) =
                codec.encode(&ServerEvent::RoomsList { names })
            else {
                break;
            };
            if conn.send(&bytes).await.is_err() {
                break;
            }
        }
    })
}

/// Sends a single event to this connection.
async fn send_event(
    conn: &Arc<WebSocketConnection>,
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), OrbiterError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await.map_err(OrbiterError::Transport)
}

/// Reports a room error back to the requesting client.
async fn send_room_error(
    conn: &Arc<WebSocketConnection>,
    codec: &JsonCodec,
    error: &RoomError,
) -> Result<(), OrbiterError> {
    send_event(
        conn,
        codec,
        &ServerEvent::Error {
            code: error_code(error),
            message: error.to_string(),
        },
    )
    .await
}

/// HTTP-style code for each room error.
fn error_code(error: &RoomError) -> u16 {
    match error {
        RoomError::InvalidName => 400,
        RoomError::NotHost(_) => 403,
        RoomError::UnknownRoom(_) | RoomError::UnknownPlayer(_) => 404,
        RoomError::AlreadyRunning => 409,
        RoomError::Unavailable(_) => 503,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_follow_http_conventions() {
        assert_eq!(error_code(&RoomError::InvalidName), 400);
        assert_eq!(
            error_code(&RoomError::NotHost(PlayerId::new("p-1"))),
            403
        );
        assert_eq!(
            error_code(&RoomError::UnknownRoom("Ghost".into())),
            404
        );
        assert_eq!(
            error_code(&RoomError::UnknownPlayer(PlayerId::new("p-1"))),
            404
        );
        assert_eq!(error_code(&RoomError::AlreadyRunning), 409);
        assert_eq!(
            error_code(&RoomError::Unavailable("Alpha".into())),
            503
        );
    }
}
