//! Server-level errors: everything a `Room`, the `RoomRegistry`, or the
//! `MatchmakingQueue` can reject a request with. Each carries the stable
//! wire `ErrorCode` the Gateway forwards to the offending socket.

use protocol::ErrorCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("no room exists with that code")]
    RoomNotFound,
    #[error("the room has already closed")]
    RoomClosed,
    #[error("this session is not seated in that room")]
    NotInRoom,
    #[error("only the host may do that")]
    NotHost,
    #[error("could not restore the session")]
    SessionRestoreFailed,
    #[error("that name is already taken in this room")]
    NameInUse,
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
}

impl RoomError {
    pub fn code(self) -> ErrorCode {
        match self {
            RoomError::RoomNotFound => ErrorCode::RoomNotFound,
            RoomError::RoomClosed => ErrorCode::RoomClosed,
            RoomError::NotInRoom => ErrorCode::NotInRoom,
            RoomError::NotHost => ErrorCode::NotHost,
            RoomError::SessionRestoreFailed => ErrorCode::SessionRestoreFailed,
            RoomError::NameInUse => ErrorCode::NameInUse,
            RoomError::Engine(e) => ErrorCode::from(e),
        }
    }

    pub fn is_fatal(self) -> bool {
        self.code().is_fatal()
    }
}
