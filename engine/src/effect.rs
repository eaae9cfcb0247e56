//! Effects produced by the rules engine. Effects carry no state the engine
//! itself needs on a later call — they exist purely so a caller (the Room,
//! or the REST fallback) can drive broadcasts and logs.

use crate::card::Card;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    CardDrawn { player_id: PlayerId, card: Card },
    PlayerBusted { player_id: PlayerId },
    SecondChanceConsumed { player_id: PlayerId, saved_value: u8 },
    SecondChanceTransferred { from: PlayerId, to: PlayerId },
    SecondChanceDiscarded { player_id: PlayerId },
    PlayerFrozen { by: PlayerId, target: PlayerId },
    FlipThreeBegan { target: PlayerId },
    Flip7Achieved { player_id: PlayerId },
    RoundEnded,
    GameEnded { winner_id: PlayerId },
}
