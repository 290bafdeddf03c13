use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use validator::Validate;

use crate::{
    dto::prizes::{PrizeSuggestion, PrizeSuggestionQuery},
    error::{AppError, ErrorBody},
    services::prize_service,
    state::SharedState,
};

/// Prize idea endpoints used to prefill the admin form.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/prize-suggestions", get(prize_suggestions))
}

#[utoipa::path(
    get,
    path = "/api/prize-suggestions",
    tag = "prizes",
    params(PrizeSuggestionQuery),
    responses(
        (status = 200, description = "Distinct prize ideas with palette colours", body = [PrizeSuggestion]),
        (status = 400, description = "Count out of range", body = ErrorBody)
    )
)]
/// Draw random prize ideas from the configured catalogue.
pub async fn prize_suggestions(
    State(state): State<SharedState>,
    query: Result<Query<PrizeSuggestionQuery>, QueryRejection>,
) -> Result<Json<Vec<PrizeSuggestion>>, AppError> {
    let Query(query) = query?;
    query.validate()?;
    Ok(Json(prize_service::suggest_prizes(&state, query.count())))
}
