//! Wire-safe snapshots. These mirror `engine::GameState` but redact
//! anything a client must not see — chiefly the deck's card order and RNG
//! state, which only ever travels over the stateless REST fallback (where
//! the client is trusted to round-trip its own game anyway).

use engine::{ActionKind, CardId, GameState, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_ai: bool,
    pub score: u32,
    pub number_cards: Vec<engine::Card>,
    pub modifier_cards: Vec<engine::Card>,
    pub action_cards: Vec<engine::Card>,
    pub has_busted: bool,
    pub is_active: bool,
    pub frozen_by: Option<PlayerId>,
}

impl From<&engine::Player> for PlayerView {
    fn from(p: &engine::Player) -> Self {
        PlayerView {
            id: p.id,
            name: p.name.clone(),
            is_ai: p.is_ai,
            score: p.score,
            number_cards: p.number_cards.clone(),
            modifier_cards: p.modifier_cards.clone(),
            action_cards: p.action_cards.clone(),
            has_busted: p.has_busted,
            is_active: p.is_active,
            frozen_by: p.frozen_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActionView {
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub action_kind: ActionKind,
}

/// A redacted snapshot of a running game, safe to broadcast to every seat.
/// Deck order and RNG state never leave the Room; only draw-pile/discard
/// counts are exposed, matching what a player could plausibly infer from
/// the table anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub players: Vec<PlayerView>,
    pub current_player_index: usize,
    pub dealer_index: usize,
    pub round: u32,
    pub deck_remaining: usize,
    pub discard_count: usize,
    pub game_status: engine::GameStatus,
    pub round_scores: BTreeMap<PlayerId, u32>,
    pub pending_action_card: Option<PendingActionView>,
    pub pending_flip_three_remaining: Option<u8>,
    pub largest_round: Option<engine::LargestRound>,
    pub target_score: u32,
}

impl From<&GameState> for GameStateView {
    fn from(state: &GameState) -> Self {
        GameStateView {
            players: state.players.iter().map(PlayerView::from).collect(),
            current_player_index: state.current_player_index,
            dealer_index: state.dealer_index,
            round: state.round,
            deck_remaining: state.deck.as_ref().map(|d| d.remaining()).unwrap_or(0),
            discard_count: state.deck.as_ref().map(|d| d.discarded()).unwrap_or(0),
            game_status: state.game_status,
            round_scores: state.round_scores.clone(),
            pending_action_card: state.pending_action_card.map(|p| PendingActionView {
                player_id: p.player_id,
                card_id: p.card_id,
                action_kind: p.action_kind,
            }),
            pending_flip_three_remaining: state.pending_flip_three_remaining,
            largest_round: state.largest_round,
            target_score: state.target_score,
        }
    }
}

/// A connected-or-not seat in a Room, independent of whether a game is in
/// progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub session_id: crate::ids::SessionId,
    pub player_id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub room_code: crate::ids::RoomCode,
    pub status: RoomStatus,
    pub seats: Vec<SeatView>,
    pub host_session_id: crate::ids::SessionId,
}
