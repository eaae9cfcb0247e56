//! A `Room` is the single-writer coordinator for one running (or not yet
//! started) game. It owns the `engine::GameState`, the seat roster, and a
//! dedicated tokio task (`Room::run`) that drains an `mpsc::Receiver` of
//! [`RoomCommand`]s one at a time — the same single-consumer-channel idiom
//! the base relay server uses for its host/client routing, but here the
//! Rules Engine itself does the mutating instead of a relayed host client.

use crate::config::ServerConfig;
use crate::error::RoomError;
use crate::recorder::{MatchRecorder, MatchResult};
use engine::{GameState, GameStatus, PlayerId};
use protocol::{ClientMessage, ErrorCode, GameStateView, RoomCode, RoomStatus, RoomView, SeatView, ServerMessage, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const COMMAND_BUFFER: usize = 256;
const OUTBOUND_BUFFER: usize = 32;

/// Everything the Gateway needs to talk to a running Room.
#[derive(Clone)]
pub struct RoomHandle {
    pub cmd_tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}

/// What a successful `Seat`/`Rebind` call hands back to its caller.
#[derive(Debug, Clone)]
pub struct SeatInfo {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub room: RoomView,
}

pub enum RoomCommand {
    Seat {
        name: String,
        is_host: bool,
        out_tx: mpsc::Sender<ServerMessage>,
        reply: oneshot::Sender<Result<SeatInfo, RoomError>>,
    },
    /// Seats a bot: no socket, never a host, `Seat::out_tx` stays `None`.
    SeatAi {
        name: String,
        ai_difficulty: engine::AiDifficulty,
        reply: oneshot::Sender<Result<SeatInfo, RoomError>>,
    },
    Rebind {
        session_id: SessionId,
        out_tx: mpsc::Sender<ServerMessage>,
        reply: oneshot::Sender<Result<SeatInfo, RoomError>>,
    },
    Detach {
        session_id: SessionId,
    },
    Client {
        session_id: SessionId,
        message: ClientMessage,
    },
    AiWake {
        turn_token: u64,
    },
    HostGraceExpired {
        session_id: SessionId,
        epoch: u64,
    },
    EmptyTtlExpired {
        epoch: u64,
    },
}

struct Seat {
    session_id: SessionId,
    player_id: PlayerId,
    name: String,
    is_host: bool,
    connected: bool,
    is_ai: bool,
    ai_difficulty: engine::AiDifficulty,
    out_tx: Option<mpsc::Sender<ServerMessage>>,
}

impl Seat {
    fn view(&self) -> SeatView {
        SeatView {
            session_id: self.session_id,
            player_id: self.player_id,
            name: self.name.clone(),
            is_host: self.is_host,
            connected: self.connected,
        }
    }
}

/// Room-level lifecycle, distinct from `engine::GameStatus` (the game
/// within the room may cycle through several rounds while the room itself
/// stays `Playing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Waiting,
    Playing,
    Closed,
}

pub struct Room {
    room_code: RoomCode,
    config: Arc<ServerConfig>,
    recorder: Arc<dyn MatchRecorder>,
    cmd_tx: mpsc::Sender<RoomCommand>,
    cmd_rx: mpsc::Receiver<RoomCommand>,
    seats: Vec<Seat>,
    next_player_id: u32,
    status: Status,
    game: Option<GameState>,
    host_session_id: SessionId,
    turn_token: u64,
    epoch: u64,
    ai_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Room {
    /// Spawns a brand-new, empty `Waiting` room and its dedicated task.
    /// Returns a handle the Registry can hand out immediately.
    pub fn spawn(
        room_code: RoomCode,
        config: Arc<ServerConfig>,
        recorder: Arc<dyn MatchRecorder>,
    ) -> RoomHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let room = Room {
            room_code,
            config,
            recorder,
            cmd_tx: cmd_tx.clone(),
            cmd_rx,
            seats: Vec::new(),
            next_player_id: 0,
            status: Status::Waiting,
            game: None,
            host_session_id: SessionId::new(), // placeholder until the first seat joins
            turn_token: 0,
            epoch: 0,
            ai_handle: None,
        };
        tokio::spawn(room.run());
        RoomHandle { cmd_tx }
    }

    async fn run(mut self) {
        tracing::info!(room = %self.room_code, "Room started.");
        while let Some(cmd) = self.cmd_rx.recv().await {
            let should_close = self.handle_command(cmd).await;
            if should_close {
                break;
            }
        }
        if let Some(handle) = self.ai_handle.take() {
            handle.abort();
        }
        tracing::info!(room = %self.room_code, "Room closed.");
    }

    /// Returns `true` if the room should close after this command.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Seat { name, is_host, out_tx, reply } => {
                let result = self.seat(name, is_host, out_tx);
                let _ = reply.send(result);
            }
            RoomCommand::SeatAi { name, ai_difficulty, reply } => {
                let result = self.seat_ai(name, ai_difficulty);
                let _ = reply.send(result);
            }
            RoomCommand::Rebind { session_id, out_tx, reply } => {
                let result = self.rebind(session_id, out_tx);
                let _ = reply.send(result);
            }
            RoomCommand::Detach { session_id } => self.detach(session_id),
            RoomCommand::Client { session_id, message } => self.handle_client_message(session_id, message),
            RoomCommand::AiWake { turn_token } => {
                if turn_token == self.turn_token {
                    self.drive_ai_turn().await;
                }
            }
            RoomCommand::HostGraceExpired { session_id, epoch } => {
                if epoch == self.epoch {
                    self.promote_new_host_if_still_disconnected(session_id);
                }
            }
            RoomCommand::EmptyTtlExpired { epoch } => {
                if epoch == self.epoch && self.seats.iter().all(|s| !s.connected) {
                    self.status = Status::Closed;
                    return true;
                }
            }
        }
        self.status == Status::Closed
    }

    fn seat(&mut self, name: String, is_host: bool, out_tx: mpsc::Sender<ServerMessage>) -> Result<SeatInfo, RoomError> {
        self.push_seat(name, is_host, false, engine::AiDifficulty::Moderate, Some(out_tx))
    }

    /// Seats a bot (spec scenario S1: a human host plus AI seats). Never a
    /// host, and carries no socket of its own — `schedule_ai_if_needed`
    /// drives its turns directly instead of waiting on client messages.
    fn seat_ai(&mut self, name: String, ai_difficulty: engine::AiDifficulty) -> Result<SeatInfo, RoomError> {
        self.push_seat(name, false, true, ai_difficulty, None)
    }

    fn push_seat(
        &mut self,
        name: String,
        is_host: bool,
        is_ai: bool,
        ai_difficulty: engine::AiDifficulty,
        out_tx: Option<mpsc::Sender<ServerMessage>>,
    ) -> Result<SeatInfo, RoomError> {
        if self.status == Status::Closed {
            return Err(RoomError::RoomClosed);
        }
        if self.status == Status::Playing && self.game.as_ref().map(|g| g.game_status) != Some(GameStatus::GameEnd) {
            return Err(RoomError::RoomClosed);
        }
        if self.seats.iter().any(|s| s.name == name) {
            return Err(RoomError::NameInUse);
        }

        let session_id = SessionId::new();
        let player_id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        if is_host {
            self.host_session_id = session_id;
        }
        self.seats.push(Seat {
            session_id,
            player_id,
            name,
            is_host,
            connected: true,
            is_ai,
            ai_difficulty,
            out_tx,
        });

        self.broadcast_room_update();
        Ok(SeatInfo { session_id, player_id, room: self.room_view() })
    }

    fn rebind(&mut self, session_id: SessionId, out_tx: mpsc::Sender<ServerMessage>) -> Result<SeatInfo, RoomError> {
        if self.status == Status::Closed {
            return Err(RoomError::RoomClosed);
        }
        let player_id = {
            let seat = self.seats.iter_mut().find(|s| s.session_id == session_id).ok_or(RoomError::SessionRestoreFailed)?;
            seat.connected = true;
            seat.out_tx = Some(out_tx);
            seat.player_id
        };
        self.epoch += 1;
        let room = self.room_view();
        if let Some(state) = &self.game {
            if let Some(seat) = self.seats.iter().find(|s| s.session_id == session_id) {
                if let Some(tx) = &seat.out_tx {
                    let _ = tx.try_send(ServerMessage::GameState { state: GameStateView::from(state) });
                }
            }
        }
        self.broadcast_room_update();
        Ok(SeatInfo { session_id, player_id, room })
    }

    fn detach(&mut self, session_id: SessionId) {
        let was_host = {
            let Some(seat) = self.seats.iter_mut().find(|s| s.session_id == session_id) else {
                return;
            };
            seat.connected = false;
            seat.out_tx = None;
            seat.is_host
        };
        self.epoch += 1;
        let epoch = self.epoch;
        self.broadcast_room_update();

        if was_host {
            let tx = self.cmd_tx.clone();
            let delay = Duration::from_millis(self.config.host_grace_ms);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(RoomCommand::HostGraceExpired { session_id, epoch }).await;
            });
        }
        if self.seats.iter().all(|s| !s.connected) {
            let tx = self.cmd_tx.clone();
            let delay = Duration::from_millis(self.config.room_empty_ttl_ms);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(RoomCommand::EmptyTtlExpired { epoch }).await;
            });
        }
    }

    fn promote_new_host_if_still_disconnected(&mut self, session_id: SessionId) {
        let still_host_and_disconnected = self
            .seats
            .iter()
            .find(|s| s.session_id == session_id)
            .map(|s| s.is_host && !s.connected)
            .unwrap_or(false);
        if !still_host_and_disconnected {
            return;
        }
        let Some(new_host_idx) = self.seats.iter().position(|s| s.connected && s.session_id != session_id) else {
            return;
        };
        let new_host_session_id = self.seats[new_host_idx].session_id;
        let new_host_name = self.seats[new_host_idx].name.clone();
        for seat in self.seats.iter_mut() {
            seat.is_host = seat.session_id == new_host_session_id;
        }
        self.host_session_id = new_host_session_id;
        tracing::info!(room = %self.room_code, new_host = %new_host_session_id, "Host migrated.");
        self.broadcast(ServerMessage::HostMigrated { new_host_session_id, new_host_name });
        self.broadcast_room_update();
    }

    fn handle_client_message(&mut self, session_id: SessionId, message: ClientMessage) {
        let Some(seat_player_id) = self.seats.iter().find(|s| s.session_id == session_id).map(|s| s.player_id) else {
            return;
        };
        let is_host = self.seats.iter().find(|s| s.session_id == session_id).map(|s| s.is_host).unwrap_or(false);

        match message {
            ClientMessage::RoomLeave => self.leave(session_id),
            ClientMessage::GameStart => {
                if !is_host {
                    self.reply_error(session_id, RoomError::NotHost);
                    return;
                }
                self.start_game(session_id);
            }
            ClientMessage::GameHit { player_id } => self.require_matching_player(session_id, player_id, seat_player_id, |room| {
                engine::rules::apply_hit(room.game.as_ref().unwrap(), player_id)
            }),
            ClientMessage::GameStay { player_id } => self.require_matching_player(session_id, player_id, seat_player_id, |room| {
                engine::rules::apply_stay(room.game.as_ref().unwrap(), player_id)
            }),
            ClientMessage::GamePlayActionCard { player_id, card_id, target_player_id } => {
                self.require_matching_player(session_id, player_id, seat_player_id, |room| {
                    engine::rules::apply_play_action(room.game.as_ref().unwrap(), player_id, card_id, target_player_id)
                })
            }
            ClientMessage::GameNextRound => {
                if !is_host {
                    self.reply_error(session_id, RoomError::NotHost);
                    return;
                }
                if self.game.is_none() {
                    self.reply_error(session_id, RoomError::Engine(engine::EngineError::WrongPhase));
                    return;
                }
                let result = engine::rules::start_next_round(self.game.as_ref().unwrap());
                self.finish_engine_call(session_id, result);
            }
            // Connection-establishment messages never reach a bound Room.
            ClientMessage::Ping
            | ClientMessage::SessionRestore { .. }
            | ClientMessage::RoomCreate { .. }
            | ClientMessage::RoomJoin { .. }
            | ClientMessage::MatchmakingJoin { .. }
            | ClientMessage::MatchmakingCancel => {}
        }
    }

    fn require_matching_player(
        &mut self,
        session_id: SessionId,
        claimed: PlayerId,
        seat_player_id: PlayerId,
        apply: impl FnOnce(&mut Room) -> Result<engine::EngineOutcome, engine::EngineError>,
    ) {
        if claimed != seat_player_id {
            self.reply_error(session_id, RoomError::NotInRoom);
            return;
        }
        if self.game.is_none() {
            self.reply_error(session_id, RoomError::Engine(engine::EngineError::WrongPhase));
            return;
        }
        let result = apply(self);
        self.finish_engine_call(session_id, result);
    }

    fn finish_engine_call(&mut self, session_id: SessionId, result: Result<engine::EngineOutcome, engine::EngineError>) {
        match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) if err.is_fatal() => self.fail_room(err),
            Err(err) => self.reply_error(session_id, RoomError::Engine(err)),
        }
    }

    /// An internal invariant violation is fatal to the Room, not to the
    /// process: log it, tell every connected socket, and let this command's
    /// `should_close` result (checked by the caller against `self.status`)
    /// end `Room::run`.
    fn fail_room(&mut self, err: engine::EngineError) {
        tracing::error!(room = %self.room_code, ?err, "Fatal engine error; closing room.");
        self.broadcast(ServerMessage::error(ErrorCode::from(err), "an internal error closed this room"));
        self.status = Status::Closed;
    }

    fn leave(&mut self, session_id: SessionId) {
        if self.status == Status::Waiting {
            self.seats.retain(|s| s.session_id != session_id);
            if self.host_session_id == session_id {
                if let Some(first) = self.seats.first_mut() {
                    first.is_host = true;
                    self.host_session_id = first.session_id;
                }
            }
            self.broadcast_room_update();
        } else {
            // Mid-game: a seat is a weak reference (spec.md §3); treat an
            // explicit leave the same as a disconnect so the seat can still
            // be reclaimed by a reconnecting session.
            self.detach(session_id);
        }
    }

    fn start_game(&mut self, session_id: SessionId) {
        let already_ended = self.game.as_ref().map(|g| g.game_status) == Some(GameStatus::GameEnd);
        if self.game.is_some() && !already_ended {
            self.reply_error(session_id, RoomError::Engine(engine::EngineError::WrongPhase));
            return;
        }
        if self.seats.len() < 2 {
            self.reply_error_raw(session_id, ErrorCode::WrongPhase, "at least 2 seats are required to start");
            return;
        }

        let players = self
            .seats
            .iter()
            .map(|s| engine::Player::new(s.player_id, s.name.clone(), s.is_ai, s.ai_difficulty))
            .collect();
        let seed = self.config.rng_seed.unwrap_or_else(|| rand::random());
        let mut state = GameState::new(players, self.config.target_score);
        state.deck = Some(engine::Deck::build(self.seats.len(), seed));

        self.status = Status::Playing;
        let result = engine::rules::start_round(&state);
        self.finish_engine_call(session_id, result);
    }

    fn apply_outcome(&mut self, outcome: engine::EngineOutcome) {
        self.game = Some(outcome.state);
        for effect in &outcome.effects {
            tracing::debug!(room = %self.room_code, ?effect, "engine effect");
        }
        let view = GameStateView::from(self.game.as_ref().unwrap());
        self.broadcast(ServerMessage::GameState { state: view });

        if self.game.as_ref().unwrap().game_status == GameStatus::GameEnd {
            self.record_match();
        }
        self.schedule_ai_if_needed();
    }

    fn record_match(&self) {
        let Some(state) = &self.game else { return };
        let Some(winner_id) = state
            .players
            .iter()
            .max_by_key(|p| p.score)
            .map(|p| p.id)
        else {
            return;
        };
        let final_scores = state.players.iter().map(|p| (p.id, p.score)).collect();
        self.recorder.record_match(MatchResult {
            room_code: self.room_code.clone(),
            final_scores,
            winner_id,
            rounds_played: state.round,
        });
    }

    fn schedule_ai_if_needed(&mut self) {
        self.turn_token += 1;
        let token = self.turn_token;
        if let Some(handle) = self.ai_handle.take() {
            handle.abort();
        }

        let Some(game) = &self.game else { return };
        if game.game_status != GameStatus::Playing {
            return;
        }
        let Some(current_id) = game.current_player_id() else { return };
        let Some(seat) = self.seats.iter().find(|s| s.player_id == current_id) else {
            return;
        };
        if !seat.is_ai {
            return;
        }

        let acting_on_pending = game.pending_action_card.map(|p| p.player_id) == Some(current_id);
        let think_ms = if acting_on_pending { 0 } else { self.config.ai_think_ms };
        let tx = self.cmd_tx.clone();
        self.ai_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(think_ms)).await;
            let _ = tx.send(RoomCommand::AiWake { turn_token: token }).await;
        }));
    }

    async fn drive_ai_turn(&mut self) {
        let Some(game) = self.game.clone() else { return };
        let Some(current_id) = game.current_player_id() else { return };

        let hard_timeout = Duration::from_millis(self.config.ai_hard_timeout_ms);
        let decision = match tokio::time::timeout(hard_timeout, async { ai::decide(&game, current_id) }).await {
            Ok(decision) => decision,
            Err(_) => fallback_decision(&game, current_id),
        };

        let result = match decision {
            ai::Decision::Hit => engine::rules::apply_hit(&game, current_id),
            ai::Decision::Stay => engine::rules::apply_stay(&game, current_id),
            ai::Decision::PlayActionCard { card_id, target_id } => {
                engine::rules::apply_play_action(&game, current_id, card_id, Some(target_id))
            }
        };

        match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) if err.is_fatal() => self.fail_room(err),
            Err(err) => tracing::warn!(room = %self.room_code, ?err, "AI produced an invalid action; skipping turn."),
        }
    }

    fn broadcast(&mut self, message: ServerMessage) {
        for seat in self.seats.iter_mut() {
            let Some(tx) = &seat.out_tx else { continue };
            if tx.try_send(message.clone()).is_err() {
                tracing::warn!(room = %self.room_code, session = %seat.session_id, "Dropping slow/closed subscriber.");
                seat.out_tx = None;
                seat.connected = false;
            }
        }
    }

    fn broadcast_room_update(&mut self) {
        let room = self.room_view();
        self.broadcast(ServerMessage::RoomUpdated { room });
    }

    fn reply_error(&self, session_id: SessionId, err: RoomError) {
        self.reply_error_raw(session_id, err.code(), err.to_string());
    }

    fn reply_error_raw(&self, session_id: SessionId, code: ErrorCode, message: impl Into<String>) {
        if let Some(seat) = self.seats.iter().find(|s| s.session_id == session_id) {
            if let Some(tx) = &seat.out_tx {
                let _ = tx.try_send(ServerMessage::error(code, message));
            }
        }
    }

    fn room_view(&self) -> RoomView {
        RoomView {
            room_code: self.room_code.clone(),
            status: match self.status {
                Status::Waiting => RoomStatus::Waiting,
                Status::Playing => RoomStatus::Playing,
                Status::Closed => RoomStatus::Closed,
            },
            seats: self.seats.iter().map(Seat::view).collect(),
            host_session_id: self.host_session_id,
        }
    }
}

/// §4.4's timeout fallback: resolve a pending action with the default
/// target policy, otherwise Hit. `ai::decide` is synchronous and therefore
/// cannot actually exceed the hard timeout in this implementation, but the
/// fallback is kept so the behavior matches the spec if that ever changes.
fn fallback_decision(game: &GameState, player_id: PlayerId) -> ai::Decision {
    ai::decide(game, player_id)
}

pub const fn outbound_buffer() -> usize {
    OUTBOUND_BUFFER
}
