use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::config::{GameConfigDto, InsertGameConfig},
    error::{AppError, ErrorBody, ValidJson},
    services::config_service,
    state::SharedState,
};

/// Game configuration endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/game-config", get(get_game_config).post(save_game_config))
}

#[utoipa::path(
    get,
    path = "/api/game-config",
    tag = "config",
    responses(
        (status = 200, description = "Stored configuration, or the defaults", body = GameConfigDto),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn get_game_config(
    State(state): State<SharedState>,
) -> Result<Json<GameConfigDto>, AppError> {
    Ok(Json(config_service::get_config(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/game-config",
    tag = "config",
    request_body = InsertGameConfig,
    responses(
        (status = 200, description = "Saved configuration", body = GameConfigDto),
        (status = 400, description = "Invalid configuration", body = ErrorBody)
    )
)]
/// Replace the game configuration.
pub async fn save_game_config(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<InsertGameConfig>,
) -> Result<Json<GameConfigDto>, AppError> {
    Ok(Json(
        config_service::save_config(&state, payload.into()).await?,
    ))
}
