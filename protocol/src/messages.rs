//! The JSON wire protocol: one tagged record per logical message, `type`
//! selecting the variant and `data` carrying its payload.

use crate::error::ErrorCode;
use crate::ids::{RoomCode, SessionId};
use crate::view::{GameStateView, RoomView};
use engine::{AiDifficulty, CardId, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Ping,
    #[serde(rename = "session:restore")]
    SessionRestore { session_id: SessionId, room_code: RoomCode },
    #[serde(rename = "room:create")]
    RoomCreate {
        player_name: String,
        /// Bot seats to fill the room with at creation time (spec scenario
        /// S1: a human host plus one or more AI seats). Empty for an
        /// all-human room.
        #[serde(default)]
        ai_seats: Vec<AiSeatRequest>,
    },
    #[serde(rename = "room:join")]
    RoomJoin { room_code: RoomCode, player_name: String },
    #[serde(rename = "room:leave")]
    RoomLeave,
    #[serde(rename = "matchmaking:join")]
    MatchmakingJoin { player_name: String, max_players: u8 },
    #[serde(rename = "matchmaking:cancel")]
    MatchmakingCancel,
    #[serde(rename = "game:start")]
    GameStart,
    #[serde(rename = "game:hit")]
    GameHit { player_id: PlayerId },
    #[serde(rename = "game:stay")]
    GameStay { player_id: PlayerId },
    #[serde(rename = "game:playActionCard")]
    GamePlayActionCard {
        player_id: PlayerId,
        card_id: CardId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_player_id: Option<PlayerId>,
    },
    #[serde(rename = "game:nextRound")]
    GameNextRound,
}

/// One bot seat requested alongside `room:create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSeatRequest {
    pub name: String,
    #[serde(default)]
    pub difficulty: AiDifficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Pong,
    #[serde(rename = "room:created")]
    RoomCreated { session_id: SessionId, player_id: PlayerId, room: RoomView },
    #[serde(rename = "room:joined")]
    RoomJoined { session_id: SessionId, player_id: PlayerId, room: RoomView },
    #[serde(rename = "room:updated")]
    RoomUpdated { room: RoomView },
    #[serde(rename = "matchmaking:queued")]
    MatchmakingQueued,
    #[serde(rename = "matchmaking:matched")]
    MatchmakingMatched { room: RoomView },
    #[serde(rename = "game:state")]
    GameState { state: GameStateView },
    #[serde(rename = "host:migrated")]
    HostMigrated { new_host_session_id: SessionId, new_host_name: String },
    #[serde(rename = "player:disconnected")]
    PlayerDisconnected { session_id: SessionId, player_id: PlayerId },
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error { code, message: message.into() }
    }
}
