//! The single authoritative [`GameState`] snapshot and the small value types
//! hanging off it.

use crate::card::{ActionKind, CardId};
use crate::deck::Deck;
use crate::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Room-visible phase of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Waiting,
    Playing,
    RoundEnd,
    GameEnd,
}

/// An Action card (`Freeze` or `FlipThree`) drawn but not yet resolved with a
/// target. Only these two action kinds ever leave a pending entry;
/// `SecondChance` resolves immediately when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingActionCard {
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub action_kind: ActionKind,
}

/// One row of the per-round ledger, appended at every `Playing -> RoundEnd`
/// transition and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundHistoryEntry {
    pub round: u32,
    pub scores: BTreeMap<PlayerId, u32>,
    pub busted: BTreeMap<PlayerId, bool>,
}

/// The best single-round performance observed so far, tracked purely for
/// display (not used by any rule).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LargestRound {
    pub player_id: PlayerId,
    pub score: u32,
}

/// One level of an in-progress `FlipThree`: the player still owed draws and
/// how many remain. A `FlipThree` drawn while another `FlipThree` is already
/// resolving pushes a new frame rather than replacing the outer one, so a
/// nested cascade resumes the outer draws once the inner one is spent. This
/// stack is implementation bookkeeping with no counterpart in the wire
/// model; `GameState::pending_flip_three_remaining` always mirrors the top
/// frame so observers still see a single integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlipThreeFrame {
    pub target: PlayerId,
    pub remaining: u8,
}

/// The single authoritative snapshot for one running game. A `Room` owns
/// exactly one `GameState`; nothing but the rules engine mutates it.
#[derive(Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub dealer_index: usize,
    pub round: u32,
    pub deck: Option<Deck>,
    pub game_status: GameStatus,
    pub round_scores: BTreeMap<PlayerId, u32>,
    pub pending_action_card: Option<PendingActionCard>,
    pub pending_flip_three_remaining: Option<u8>,
    pub round_history: Vec<RoundHistoryEntry>,
    pub largest_round: Option<LargestRound>,
    pub target_score: u32,
    /// Internal stack backing `pending_flip_three_remaining`; see
    /// [`FlipThreeFrame`].
    pub flip_three_stack: Vec<FlipThreeFrame>,
}

impl GameState {
    /// Seats `players` into a fresh `Waiting` game. The deck is not built
    /// until `startGame`/`startRound` (see `rules::start_round`), since the
    /// deck composition depends on the final seat count.
    pub fn new(players: Vec<Player>, target_score: u32) -> Self {
        GameState {
            players,
            current_player_index: 0,
            dealer_index: 0,
            round: 0,
            deck: None,
            game_status: GameStatus::Waiting,
            round_scores: BTreeMap::new(),
            pending_action_card: None,
            pending_flip_three_remaining: None,
            round_history: Vec::new(),
            largest_round: None,
            target_score,
            flip_three_stack: Vec::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.current_player().map(|p| p.id)
    }

    pub fn active_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    /// Total number of distinct cards held across every hand, used by the
    /// card-conservation checks (P1) together with `Deck::total_undrawn`.
    pub fn cards_in_hands(&self) -> usize {
        self.players
            .iter()
            .map(|p| p.number_cards.len() + p.modifier_cards.len() + p.action_cards.len())
            .sum()
    }
}
