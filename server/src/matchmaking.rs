//! Quick-match queue: `{sessionId, name, socket}` waiters bucketed by
//! requested seat count. Draining a full bucket hands straight off to the
//! `RoomRegistry`, exactly as spec.md §4.6 describes — "pop the first
//! `maxPlayers`, create a fresh Room with those seats, broadcast Matched to
//! all, and flush."

use crate::gateway::Binding;
use crate::registry::RoomRegistry;
use protocol::ServerMessage;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const MIN_BUCKET: u8 = 2;
const MAX_BUCKET: u8 = 6;

struct QueuedPlayer {
    name: String,
    out_tx: mpsc::Sender<ServerMessage>,
    binding: Arc<Mutex<Option<Binding>>>,
}

pub struct MatchmakingQueue {
    buckets: Mutex<HashMap<u8, VecDeque<QueuedPlayer>>>,
    registry: Arc<RoomRegistry>,
}

impl MatchmakingQueue {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        MatchmakingQueue { buckets: Mutex::new(HashMap::new()), registry }
    }

    /// Enqueues one waiter and, if this completes a bucket, seats everyone
    /// in it into a freshly created room. `binding` is the caller's own
    /// connection-wide routing cell; every matched participant (including,
    /// potentially, the caller itself) gets its cell set and a
    /// `matchmaking:matched` message pushed through its `out_tx`.
    pub async fn join(&self, max_players: u8, name: String, out_tx: mpsc::Sender<ServerMessage>, binding: Arc<Mutex<Option<Binding>>>) {
        let max_players = max_players.clamp(MIN_BUCKET, MAX_BUCKET);
        let _ = out_tx.try_send(ServerMessage::MatchmakingQueued);

        let drained = {
            let mut buckets = self.buckets.lock().unwrap();
            let bucket = buckets.entry(max_players).or_default();
            bucket.push_back(QueuedPlayer { name, out_tx, binding });
            if bucket.len() >= max_players as usize {
                bucket.drain(..max_players as usize).collect::<Vec<_>>()
            } else {
                Vec::new()
            }
        };

        if !drained.is_empty() {
            self.seat_match(drained).await;
        }
    }

    /// Removes a still-queued waiter identified by its binding cell (the
    /// same `Arc` used to enqueue it). No-op if it already matched.
    pub fn cancel(&self, binding: &Arc<Mutex<Option<Binding>>>) {
        let mut buckets = self.buckets.lock().unwrap();
        for bucket in buckets.values_mut() {
            bucket.retain(|q| !Arc::ptr_eq(&q.binding, binding));
        }
    }

    async fn seat_match(&self, drained: Vec<QueuedPlayer>) {
        let mut entrants = drained.into_iter();
        let Some(host) = entrants.next() else { return };

        let (room_code, host_seat, cmd_tx) = match self.registry.create_room(host.name, Vec::new(), host.out_tx.clone()).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(?err, "Failed to create room for a completed match.");
                return;
            }
        };
        *host.binding.lock().unwrap() = Some(Binding { session_id: host_seat.session_id, cmd_tx: cmd_tx.clone() });
        let _ = host.out_tx.try_send(ServerMessage::MatchmakingMatched { room: host_seat.room });

        for entrant in entrants {
            match self.registry.join_room(&room_code, entrant.name, entrant.out_tx.clone()).await {
                Ok((seat_info, cmd_tx)) => {
                    *entrant.binding.lock().unwrap() = Some(Binding { session_id: seat_info.session_id, cmd_tx });
                    let _ = entrant.out_tx.try_send(ServerMessage::MatchmakingMatched { room: seat_info.room });
                }
                Err(err) => {
                    tracing::error!(?err, room = %room_code, "Failed to seat a matched player.");
                    let _ = entrant.out_tx.try_send(ServerMessage::error(err.code(), err.to_string()));
                }
            }
        }
    }
}
