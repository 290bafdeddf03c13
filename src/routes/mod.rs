use axum::Router;

use crate::state::SharedState;

pub mod config;
pub mod docs;
pub mod envelopes;
pub mod game_state;
pub mod health;
pub mod prizes;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(config::router())
        .merge(envelopes::router())
        .merge(game_state::router())
        .merge(prizes::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
