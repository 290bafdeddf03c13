use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::game_state::{DisplayEnvelope, EnvelopeActionRequest, GameStateDto, TimeUpRequest},
    error::{ApiJson, AppError, ErrorBody},
    services::game_service,
    state::SharedState,
};

/// Game session endpoints driven by the player screen.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/game-state", get(get_game_state))
        .route("/api/game-state/board", get(get_board))
        .route("/api/game-state/start", post(start_game))
        .route("/api/game-state/reset", post(reset_game))
        .route("/api/game-state/select-envelope", post(select_envelope))
        .route("/api/game-state/cash-out", post(cash_out))
        .route("/api/game-state/time-up", post(time_up))
}

#[utoipa::path(
    get,
    path = "/api/game-state",
    tag = "game",
    responses(
        (status = 200, description = "Current game state, created on first access", body = GameStateDto),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn get_game_state(
    State(state): State<SharedState>,
) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(game_service::get_game_state(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/game-state/board",
    tag = "game",
    responses((status = 200, description = "Envelopes in display order", body = [DisplayEnvelope]))
)]
/// Envelopes in the order the player sees them, with revealed prizes.
pub async fn get_board(
    State(state): State<SharedState>,
) -> Result<Json<Vec<DisplayEnvelope>>, AppError> {
    Ok(Json(game_service::board(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/game-state/start",
    tag = "game",
    responses((status = 200, description = "Started game", body = GameStateDto))
)]
/// Shuffle the envelopes and start a new game.
pub async fn start_game(State(state): State<SharedState>) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(game_service::start_game(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/game-state/reset",
    tag = "game",
    responses((status = 200, description = "Not-started game", body = GameStateDto))
)]
pub async fn reset_game(State(state): State<SharedState>) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(game_service::reset_game(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/game-state/select-envelope",
    tag = "game",
    request_body = EnvelopeActionRequest,
    responses(
        (status = 200, description = "Updated game state", body = GameStateDto),
        (status = 400, description = "Missing id, no tries left, already selected or game not running", body = ErrorBody),
        (status = 404, description = "Unknown envelope", body = ErrorBody),
        (status = 409, description = "Concurrent update", body = ErrorBody)
    )
)]
/// Open one envelope.
pub async fn select_envelope(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<EnvelopeActionRequest>,
) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(
        game_service::select_envelope(&state, payload.envelope_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/game-state/cash-out",
    tag = "game",
    request_body = EnvelopeActionRequest,
    responses(
        (status = 200, description = "Completed game", body = GameStateDto),
        (status = 400, description = "Missing id or no game state", body = ErrorBody),
        (status = 404, description = "Unknown envelope", body = ErrorBody)
    )
)]
/// Stop playing and keep the prize of the given envelope.
pub async fn cash_out(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<EnvelopeActionRequest>,
) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(
        game_service::cash_out(&state, payload.envelope_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/game-state/time-up",
    tag = "game",
    request_body = TimeUpRequest,
    responses(
        (status = 200, description = "Completed game", body = GameStateDto),
        (status = 400, description = "No game state", body = ErrorBody)
    )
)]
/// Complete the game after the countdown ran out.
pub async fn time_up(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<TimeUpRequest>,
) -> Result<Json<GameStateDto>, AppError> {
    Ok(Json(
        game_service::time_up(&state, payload.final_prize).await?,
    ))
}
