//! Stateless REST fallback (spec.md §6): a thin `axum::Json` wrapper around
//! the same `engine`/`ai` functions the websocket Gateway uses. The server
//! keeps no session for this path at all — every call takes a complete
//! `engine::GameState` and hands back the updated one, exactly as spec.md
//! describes ("its only state is the optional game id for tracing").

use axum::extract::Json;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use engine::{CardId, Deck, GameState, Player, PlayerId};
use protocol::ErrorCode;
use serde::{Deserialize, Serialize};

pub fn router() -> Router<crate::AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/round/start", post(round_start))
        .route("/hit", post(hit))
        .route("/stay", post(stay))
        .route("/action", post(action))
        .route("/round-next", post(round_next))
        .route("/ai/decision", post(ai_decision))
}

#[derive(Debug, Serialize)]
struct EngineResponse {
    state: GameState,
    effects: Vec<engine::Effect>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn engine_err(err: engine::EngineError) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody { code: ErrorCode::from(err), message: err.to_string() }))
}

fn outcome(result: Result<engine::EngineOutcome, engine::EngineError>) -> ApiResult<EngineResponse> {
    result
        .map(|o| Json(EngineResponse { state: o.state, effects: o.effects }))
        .map_err(engine_err)
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    player_names: Vec<String>,
    #[serde(default)]
    ai_player_names: Vec<String>,
    target_score: Option<u32>,
    rng_seed: Option<u64>,
}

/// Builds a fresh `GameState` with a new deck and deals the first round in
/// one call — the common case for a standalone REST client that has no
/// Waiting-phase state of its own to construct by hand.
async fn start(Json(req): Json<StartRequest>) -> ApiResult<EngineResponse> {
    let mut next_id = 0u32;
    let mut players: Vec<Player> = req
        .player_names
        .into_iter()
        .map(|name| {
            let p = Player::new(PlayerId(next_id), name, false, Default::default());
            next_id += 1;
            p
        })
        .collect();
    players.extend(req.ai_player_names.into_iter().map(|name| {
        let p = Player::new(PlayerId(next_id), name, true, Default::default());
        next_id += 1;
        p
    }));

    let seed = req.rng_seed.unwrap_or_else(|| rand::random());
    let mut state = GameState::new(players, req.target_score.unwrap_or(200));
    state.deck = Some(Deck::build(state.players.len(), seed));

    outcome(engine::rules::start_round(&state))
}

#[derive(Debug, Deserialize)]
struct StateOnlyRequest {
    state: GameState,
}

async fn round_start(Json(req): Json<StateOnlyRequest>) -> ApiResult<EngineResponse> {
    outcome(engine::rules::start_round(&req.state))
}

async fn round_next(Json(req): Json<StateOnlyRequest>) -> ApiResult<EngineResponse> {
    outcome(engine::rules::start_next_round(&req.state))
}

#[derive(Debug, Deserialize)]
struct PlayerActionRequest {
    state: GameState,
    player_id: PlayerId,
}

async fn hit(Json(req): Json<PlayerActionRequest>) -> ApiResult<EngineResponse> {
    outcome(engine::rules::apply_hit(&req.state, req.player_id))
}

async fn stay(Json(req): Json<PlayerActionRequest>) -> ApiResult<EngineResponse> {
    outcome(engine::rules::apply_stay(&req.state, req.player_id))
}

#[derive(Debug, Deserialize)]
struct PlayActionRequest {
    state: GameState,
    player_id: PlayerId,
    card_id: CardId,
    target_id: Option<PlayerId>,
}

async fn action(Json(req): Json<PlayActionRequest>) -> ApiResult<EngineResponse> {
    outcome(engine::rules::apply_play_action(&req.state, req.player_id, req.card_id, req.target_id))
}

#[derive(Debug, Serialize)]
struct DecisionResponse {
    decision: ai::Decision,
}

async fn ai_decision(Json(req): Json<PlayerActionRequest>) -> Json<DecisionResponse> {
    Json(DecisionResponse { decision: ai::decide(&req.state, req.player_id) })
}
