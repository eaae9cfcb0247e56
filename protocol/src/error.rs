//! Stable wire error codes. These are strings on the wire, not types the
//! client can exhaustively match against in every language, so the enum
//! simply serializes to its own variant name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Protocol
    BadMessage,
    UnknownType,
    Unauthorized,

    // Session / Room
    RoomNotFound,
    RoomFull,
    RoomClosed,
    NotInRoom,
    NotHost,
    SessionRestoreFailed,
    NameInUse,

    // Game (mirrors engine::EngineError::code())
    WrongPhase,
    NotYourTurn,
    PlayerInactive,
    PendingActionCardBlocks,
    PendingFlipThreeBlocks,
    UnknownCard,
    InvalidTarget,
    GameAlreadyEnded,

    // Internal — fatal to the room, not to the process.
    DeckExhausted,
    InvariantViolated,
}

impl ErrorCode {
    /// True for the two codes that indicate a server bug rather than a
    /// benign client-facing rejection; the Room closes on these.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorCode::DeckExhausted | ErrorCode::InvariantViolated)
    }
}

impl From<engine::EngineError> for ErrorCode {
    fn from(err: engine::EngineError) -> Self {
        match err {
            engine::EngineError::NotYourTurn => ErrorCode::NotYourTurn,
            engine::EngineError::PlayerInactive => ErrorCode::PlayerInactive,
            engine::EngineError::PendingActionCardBlocks => ErrorCode::PendingActionCardBlocks,
            engine::EngineError::PendingFlipThreeBlocks => ErrorCode::PendingFlipThreeBlocks,
            engine::EngineError::UnknownCard => ErrorCode::UnknownCard,
            engine::EngineError::InvalidTarget => ErrorCode::InvalidTarget,
            engine::EngineError::WrongPhase => ErrorCode::WrongPhase,
            engine::EngineError::GameAlreadyEnded => ErrorCode::GameAlreadyEnded,
            engine::EngineError::DeckExhausted => ErrorCode::DeckExhausted,
            engine::EngineError::InvariantViolated => ErrorCode::InvariantViolated,
        }
    }
}
