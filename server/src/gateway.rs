//! The websocket connection gateway: JSON text frames in, JSON text frames
//! out. Generalizes the base's `relay-server::main` websocket route and
//! `message_relay::handle_server_logic` — a pair of tasks (reader/writer)
//! raced with `tokio::select!`, the loser aborted on exit — but frames carry
//! `ClientMessage`/`ServerMessage` JSON records instead of length-prefixed
//! binary ones, and routing is per-session (`Binding`) instead of a single
//! fixed host/client pair.

use crate::room::{outbound_buffer, RoomCommand};
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientMessage, ErrorCode, ServerMessage, SessionId};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Which Room (if any) a connection currently routes game/room messages to.
/// Set directly by this connection's own handlers (`room:create`,
/// `room:join`, `session:restore`) and, for a waiter matched by *another*
/// socket's `matchmaking:join` call, set externally by the
/// `MatchmakingQueue` — the only way a connection's routing can change
/// without that connection's own reader loop driving it.
#[derive(Clone)]
pub struct Binding {
    pub session_id: SessionId,
    pub cmd_tx: mpsc::Sender<RoomCommand>,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(socket: WebSocket, app: AppState) {
    let (mut ws_tx, ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(outbound_buffer());
    let binding: Arc<Mutex<Option<Binding>>> = Arc::new(Mutex::new(None));

    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(t) => t,
                Err(err) => {
                    tracing::error!(?err, "Failed to serialize an outbound ServerMessage.");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        "writer finished"
    });

    let reader = tokio::spawn(read_loop(ws_rx, app, out_tx, binding));

    tokio::select! {
        result = writer => {
            tracing::debug!(?result, "Gateway writer task ended.");
        }
        result = reader => {
            tracing::debug!(?result, "Gateway reader task ended.");
        }
    }
}

async fn read_loop(
    mut ws_rx: futures_util::stream::SplitStream<WebSocket>,
    app: AppState,
    out_tx: mpsc::Sender<ServerMessage>,
    binding: Arc<Mutex<Option<Binding>>>,
) -> &'static str {
    while let Some(frame) = ws_rx.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(?err, "Websocket read error; closing connection.");
                break;
            }
        };

        let client_message: ClientMessage = match serde_json::from_str(&message) {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!(?err, "Rejected malformed client message.");
                let _ = out_tx.try_send(ServerMessage::error(ErrorCode::BadMessage, "malformed message"));
                continue;
            }
        };

        dispatch(client_message, &app, &out_tx, &binding).await;
    }

    detach(&binding).await;
    "reader loop exited"
}

async fn dispatch(
    message: ClientMessage,
    app: &AppState,
    out_tx: &mpsc::Sender<ServerMessage>,
    binding: &Arc<Mutex<Option<Binding>>>,
) {
    match message {
        ClientMessage::Ping => {
            let _ = out_tx.try_send(ServerMessage::Pong);
        }
        ClientMessage::SessionRestore { session_id, room_code } => {
            match app.registry.restore_session(session_id, &room_code, out_tx.clone()).await {
                Ok((seat_info, cmd_tx)) => {
                    *binding.lock().unwrap() = Some(Binding { session_id: seat_info.session_id, cmd_tx });
                    let _ = out_tx.try_send(ServerMessage::RoomJoined {
                        session_id: seat_info.session_id,
                        player_id: seat_info.player_id,
                        room: seat_info.room,
                    });
                }
                Err(err) => {
                    let _ = out_tx.try_send(ServerMessage::error(err.code(), err.to_string()));
                }
            }
        }
        ClientMessage::RoomCreate { player_name, ai_seats } => {
            match app.registry.create_room(player_name, ai_seats, out_tx.clone()).await {
                Ok((_room_code, seat_info, cmd_tx)) => {
                    *binding.lock().unwrap() = Some(Binding { session_id: seat_info.session_id, cmd_tx });
                    let _ = out_tx.try_send(ServerMessage::RoomCreated {
                        session_id: seat_info.session_id,
                        player_id: seat_info.player_id,
                        room: seat_info.room,
                    });
                }
                Err(err) => {
                    let _ = out_tx.try_send(ServerMessage::error(err.code(), err.to_string()));
                }
            }
        }
        ClientMessage::RoomJoin { room_code, player_name } => {
            match app.registry.join_room(&room_code, player_name, out_tx.clone()).await {
                Ok((seat_info, cmd_tx)) => {
                    *binding.lock().unwrap() = Some(Binding { session_id: seat_info.session_id, cmd_tx });
                    let _ = out_tx.try_send(ServerMessage::RoomJoined {
                        session_id: seat_info.session_id,
                        player_id: seat_info.player_id,
                        room: seat_info.room,
                    });
                }
                Err(err) => {
                    let _ = out_tx.try_send(ServerMessage::error(err.code(), err.to_string()));
                }
            }
        }
        ClientMessage::MatchmakingJoin { player_name, max_players } => {
            app.matchmaking.join(max_players, player_name, out_tx.clone(), binding.clone()).await;
        }
        ClientMessage::MatchmakingCancel => {
            app.matchmaking.cancel(binding);
        }
        other => forward_to_room(other, out_tx, binding).await,
    }
}

/// Everything that requires an existing seat: `room:leave` and every
/// `game:*` message. Routed straight to the bound Room's command channel;
/// an unbound connection gets `NotInRoom` back immediately.
async fn forward_to_room(message: ClientMessage, out_tx: &mpsc::Sender<ServerMessage>, binding: &Arc<Mutex<Option<Binding>>>) {
    let bound = binding.lock().unwrap().clone();
    let Some(Binding { session_id, cmd_tx }) = bound else {
        let _ = out_tx.try_send(ServerMessage::error(ErrorCode::NotInRoom, "no room is bound to this connection"));
        return;
    };
    if cmd_tx.send(RoomCommand::Client { session_id, message }).await.is_err() {
        let _ = out_tx.try_send(ServerMessage::error(ErrorCode::RoomClosed, "the room has closed"));
    }
}

async fn detach(binding: &Arc<Mutex<Option<Binding>>>) {
    let bound = binding.lock().unwrap().clone();
    if let Some(Binding { session_id, cmd_tx }) = bound {
        let _ = cmd_tx.send(RoomCommand::Detach { session_id }).await;
    }
}
