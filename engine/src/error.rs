//! The stable error taxonomy returned by the rules engine. Engine errors
//! never mutate state: every `apply*` function either returns `Ok` with the
//! next state, or `Err` with the state untouched.

use thiserror::Error;

/// Errors the rules engine can return. Variant names double as the wire
/// error code (see `code()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("player is not active this round")]
    PlayerInactive,
    #[error("a pending action card must be resolved first")]
    PendingActionCardBlocks,
    #[error("a pending flip-three draw must be resolved first")]
    PendingFlipThreeBlocks,
    #[error("unknown card id")]
    UnknownCard,
    #[error("invalid target player")]
    InvalidTarget,
    #[error("action not valid in the current game phase")]
    WrongPhase,
    #[error("the game has already ended")]
    GameAlreadyEnded,
    #[error("deck and discard pile are both empty")]
    DeckExhausted,
    #[error("an internal invariant was violated")]
    InvariantViolated,
}

impl EngineError {
    /// The stable wire code string for this error, stable across releases.
    pub fn code(self) -> &'static str {
        match self {
            EngineError::NotYourTurn => "NotYourTurn",
            EngineError::PlayerInactive => "PlayerInactive",
            EngineError::PendingActionCardBlocks => "PendingActionCardBlocks",
            EngineError::PendingFlipThreeBlocks => "PendingFlipThreeBlocks",
            EngineError::UnknownCard => "UnknownCard",
            EngineError::InvalidTarget => "InvalidTarget",
            EngineError::WrongPhase => "WrongPhase",
            EngineError::GameAlreadyEnded => "GameAlreadyEnded",
            EngineError::DeckExhausted => "DeckExhausted",
            EngineError::InvariantViolated => "InvariantViolated",
        }
    }

    /// Internal errors are fatal to the room that hit them; everything else
    /// is a benign, per-socket notice that does not end the game.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            EngineError::DeckExhausted | EngineError::InvariantViolated
        )
    }
}
