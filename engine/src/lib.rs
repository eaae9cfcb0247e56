//! Pure deck, card and rules engine for Flip Seven.
//!
//! Nothing in this crate touches the network, the clock, or any other kind
//! of ambient I/O. Every public function here is a plain, deterministic
//! transformation of a [`state::GameState`]; the `server` crate is the only
//! place that owns a mutable slot for one and drives it forward.

pub mod card;
pub mod deck;
pub mod effect;
pub mod error;
pub mod player;
pub mod rules;
pub mod state;

pub use card::{ActionKind, AddValue, Card, CardId, CardKind, ModifierKind};
pub use deck::Deck;
pub use effect::Effect;
pub use error::EngineError;
pub use player::{AiDifficulty, Player, PlayerId};
pub use rules::EngineOutcome;
pub use state::{GameState, GameStatus, LargestRound, PendingActionCard, RoundHistoryEntry};
