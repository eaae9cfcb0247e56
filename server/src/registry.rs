//! Process-wide room directory. Maps a human-typed room code to its
//! `RoomHandle`, and a reconnecting session id back to the code it belongs
//! to. A periodic sweep drops closed rooms the same way the base server's
//! `cleanup_dead_rooms` watchdog drops dead relay channels: by polling
//! `cmd_tx.is_closed()` rather than requiring an explicit close signal.

use crate::config::ServerConfig;
use crate::error::RoomError;
use crate::recorder::MatchRecorder;
use crate::room::{Room, RoomCommand, RoomHandle, SeatInfo};
use protocol::{AiSeatRequest, RoomCode, SessionId};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ROOM_CODE_LEN: usize = 6;
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomCode, RoomHandle>>,
    sessions: Mutex<HashMap<SessionId, RoomCode>>,
    config: Arc<ServerConfig>,
    recorder: Arc<dyn MatchRecorder>,
}

impl RoomRegistry {
    pub fn new(config: Arc<ServerConfig>, recorder: Arc<dyn MatchRecorder>) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry {
            rooms: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            config,
            recorder,
        });
        registry.clone().spawn_watchdog();
        registry
    }

    /// Creates a brand-new room with `host_name` seated as its host, then
    /// seats any requested bots (spec scenario S1: a human host plus one or
    /// more AI seats) before returning. A failure to seat a bot doesn't
    /// fail room creation — it's logged and the room is returned as-is,
    /// since the host is already seated and usable.
    pub async fn create_room(
        &self,
        host_name: String,
        ai_seats: Vec<AiSeatRequest>,
        out_tx: mpsc::Sender<protocol::ServerMessage>,
    ) -> Result<(RoomCode, SeatInfo, mpsc::Sender<RoomCommand>), RoomError> {
        let room_code = self.fresh_room_code();
        let cmd_tx = Room::spawn(room_code.clone(), self.config.clone(), self.recorder.clone()).cmd_tx;
        self.rooms.lock().unwrap().insert(room_code.clone(), RoomHandle { cmd_tx: cmd_tx.clone() });

        let seat_info = seat(&cmd_tx, host_name, true, out_tx).await?;
        self.sessions.lock().unwrap().insert(seat_info.session_id, room_code.clone());

        for ai_seat in ai_seats {
            if let Err(err) = seat_ai(&cmd_tx, ai_seat.name, ai_seat.difficulty).await {
                tracing::error!(?err, room = %room_code, "Failed to seat a requested AI player.");
            }
        }

        Ok((room_code, seat_info, cmd_tx))
    }

    /// Joins an existing room by its code.
    pub async fn join_room(
        &self,
        room_code: &RoomCode,
        player_name: String,
        out_tx: mpsc::Sender<protocol::ServerMessage>,
    ) -> Result<(SeatInfo, mpsc::Sender<RoomCommand>), RoomError> {
        let cmd_tx = self.lookup(room_code)?;
        let seat_info = seat(&cmd_tx, player_name, false, out_tx).await?;
        self.sessions.lock().unwrap().insert(seat_info.session_id, room_code.clone());
        Ok((seat_info, cmd_tx))
    }

    /// Rebinds a reconnecting socket to its existing seat, using the session
    /// id alone to find both the room and the seat within it.
    pub async fn restore_session(
        &self,
        session_id: SessionId,
        room_code: &RoomCode,
        out_tx: mpsc::Sender<protocol::ServerMessage>,
    ) -> Result<(SeatInfo, mpsc::Sender<RoomCommand>), RoomError> {
        let cmd_tx = self.lookup(room_code)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(RoomCommand::Rebind { session_id, out_tx, reply: reply_tx })
            .await
            .map_err(|_| RoomError::RoomClosed)?;
        let seat_info = reply_rx.await.map_err(|_| RoomError::RoomClosed)??;
        Ok((seat_info, cmd_tx))
    }

    pub fn handle_for_session(&self, session_id: SessionId) -> Option<(RoomCode, mpsc::Sender<RoomCommand>)> {
        let room_code = self.sessions.lock().unwrap().get(&session_id).cloned()?;
        let cmd_tx = self.lookup(&room_code).ok()?;
        Some((room_code, cmd_tx))
    }

    fn lookup(&self, room_code: &RoomCode) -> Result<mpsc::Sender<RoomCommand>, RoomError> {
        self.rooms
            .lock()
            .unwrap()
            .get(room_code)
            .filter(|h| !h.is_closed())
            .map(|h| h.cmd_tx.clone())
            .ok_or(RoomError::RoomNotFound)
    }

    fn fresh_room_code(&self) -> RoomCode {
        let rooms = self.rooms.lock().unwrap();
        let mut rng = rand::thread_rng();
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode(code);
            if !rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn spawn_watchdog(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(SWEEP_INTERVAL).await;
                let mut rooms = self.rooms.lock().unwrap();
                let before = rooms.len();
                rooms.retain(|_, handle| !handle.is_closed());
                let removed = before - rooms.len();
                if removed > 0 {
                    tracing::debug!(removed, "Swept closed rooms from the registry.");
                }
            }
        });
    }
}

async fn seat(
    cmd_tx: &mpsc::Sender<RoomCommand>,
    name: String,
    is_host: bool,
    out_tx: mpsc::Sender<protocol::ServerMessage>,
) -> Result<SeatInfo, RoomError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    cmd_tx
        .send(RoomCommand::Seat { name, is_host, out_tx, reply: reply_tx })
        .await
        .map_err(|_| RoomError::RoomClosed)?;
    reply_rx.await.map_err(|_| RoomError::RoomClosed)?
}

async fn seat_ai(
    cmd_tx: &mpsc::Sender<RoomCommand>,
    name: String,
    ai_difficulty: engine::AiDifficulty,
) -> Result<SeatInfo, RoomError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    cmd_tx
        .send(RoomCommand::SeatAi { name, ai_difficulty, reply: reply_tx })
        .await
        .map_err(|_| RoomError::RoomClosed)?;
    reply_rx.await.map_err(|_| RoomError::RoomClosed)?
}
