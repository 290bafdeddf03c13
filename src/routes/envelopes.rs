use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::envelope::{EnvelopeDto, InsertEnvelope, InsertEnvelopes},
    error::{AppError, ErrorBody, ValidJson},
    services::envelope_service,
    state::SharedState,
};

/// Envelope catalogue endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/envelopes", get(list_envelopes).post(create_envelope))
        .route("/api/envelopes/bulk", post(replace_envelopes))
}

#[utoipa::path(
    get,
    path = "/api/envelopes",
    tag = "envelopes",
    responses((status = 200, description = "Envelopes ordered by position", body = [EnvelopeDto]))
)]
pub async fn list_envelopes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<EnvelopeDto>>, AppError> {
    Ok(Json(envelope_service::list_envelopes(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/envelopes",
    tag = "envelopes",
    request_body = InsertEnvelope,
    responses(
        (status = 200, description = "Created envelope", body = EnvelopeDto),
        (status = 400, description = "Invalid envelope, position already taken or game in progress", body = ErrorBody)
    )
)]
/// Add a single envelope.
pub async fn create_envelope(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<InsertEnvelope>,
) -> Result<Json<EnvelopeDto>, AppError> {
    Ok(Json(
        envelope_service::create_envelope(&state, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/envelopes/bulk",
    tag = "envelopes",
    request_body = [InsertEnvelope],
    responses(
        (status = 200, description = "Replacement envelopes ordered by position", body = [EnvelopeDto]),
        (status = 400, description = "Invalid envelope, duplicate position or game in progress", body = ErrorBody)
    )
)]
/// Delete every envelope and store the given ones instead.
pub async fn replace_envelopes(
    State(state): State<SharedState>,
    ValidJson(InsertEnvelopes(payload)): ValidJson<InsertEnvelopes>,
) -> Result<Json<Vec<EnvelopeDto>>, AppError> {
    Ok(Json(
        envelope_service::replace_envelopes(&state, payload).await?,
    ))
}
