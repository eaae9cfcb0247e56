//! Wire types shared between the `server` crate and any client: message
//! envelopes, redacted state snapshots, and stable error codes. Nothing
//! here touches sockets, tokio, or the rules engine's internals directly —
//! it only depends on `engine`'s public value types.

pub mod error;
pub mod ids;
pub mod messages;
pub mod view;

pub use error::ErrorCode;
pub use ids::{RoomCode, SessionId};
pub use messages::{AiSeatRequest, ClientMessage, ServerMessage};
pub use view::{GameStateView, PendingActionView, PlayerView, RoomStatus, RoomView, SeatView};
