//! Match recording is out of scope for the core (spec.md §6): the engine
//! and Room never depend on persistence being available. `MatchRecorder`
//! is the one small seam a real deployment can fill in without the Room
//! knowing or caring how results are stored.

use engine::PlayerId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub room_code: protocol::RoomCode,
    pub final_scores: BTreeMap<PlayerId, u32>,
    pub winner_id: PlayerId,
    pub rounds_played: u32,
}

/// Implemented by whatever external store a deployment wants; the core
/// ships only `NullRecorder`, which discards everything.
pub trait MatchRecorder: Send + Sync {
    fn record_match(&self, result: MatchResult);
}

pub struct NullRecorder;

impl MatchRecorder for NullRecorder {
    fn record_match(&self, result: MatchResult) {
        tracing::debug!(room = %result.room_code, winner = %result.winner_id, "Discarding match result (NullRecorder).");
    }
}
