use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Lucky Envelopes Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::events_stream,
        crate::routes::config::get_game_config,
        crate::routes::config::save_game_config,
        crate::routes::envelopes::list_envelopes,
        crate::routes::envelopes::create_envelope,
        crate::routes::envelopes::replace_envelopes,
        crate::routes::game_state::get_game_state,
        crate::routes::game_state::get_board,
        crate::routes::game_state::start_game,
        crate::routes::game_state::reset_game,
        crate::routes::game_state::select_envelope,
        crate::routes::game_state::cash_out,
        crate::routes::game_state::time_up,
        crate::routes::prizes::prize_suggestions,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::config::GameConfigDto,
            crate::dto::config::InsertGameConfig,
            crate::dto::envelope::EnvelopeDto,
            crate::dto::envelope::InsertEnvelope,
            crate::dto::game_state::GameStateDto,
            crate::dto::game_state::EnvelopeActionRequest,
            crate::dto::game_state::TimeUpRequest,
            crate::dto::game_state::DisplayEnvelope,
            crate::dto::prizes::PrizeSuggestion,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Server-sent events stream"),
        (name = "config", description = "Game settings"),
        (name = "envelopes", description = "Envelope catalogue"),
        (name = "game", description = "Game session transitions"),
        (name = "prizes", description = "Prize ideas for the admin form"),
    )
)]
pub struct ApiDoc;
