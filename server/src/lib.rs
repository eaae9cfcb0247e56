//! Library surface for the Flip Seven server binary. Split out from
//! `main.rs` so integration tests under `tests/` can drive a `Room`
//! directly, the same way `engine`/`ai` keep their logic reachable without
//! going through a running process.

pub mod config;
pub mod error;
pub mod gateway;
pub mod matchmaking;
pub mod recorder;
pub mod registry;
pub mod rest;
pub mod room;

use crate::matchmaking::MatchmakingQueue;
use crate::registry::RoomRegistry;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Shared, cheaply-clonable handles every axum route gets via `State`.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub matchmaking: Arc<MatchmakingQueue>,
}

/// Builds the full router: the websocket Gateway at `/ws`, the stateless
/// REST fallback nested under `/api`.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(gateway::ws_handler))
        .nest("/api", rest::router())
        .with_state(app_state)
}
