use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        config::GameConfigDto,
        envelope::EnvelopeDto,
        game_state::GameStateDto,
        sse::{ServerEvent, SystemStatus},
    },
    state::AppState,
};

const EVENT_GAME_STATE: &str = "game_state";
const EVENT_GAME_CONFIG: &str = "game_config";
const EVENT_ENVELOPES: &str = "envelopes";
const EVENT_SYSTEM_STATUS: &str = "system_status";

/// Broadcast the game state after a successful transition.
pub fn broadcast_game_state(state: &AppState, game_state: &GameStateDto) {
    send_event(state, EVENT_GAME_STATE, game_state);
}

/// Broadcast the newly saved game configuration.
pub fn broadcast_game_config(state: &AppState, config: &GameConfigDto) {
    send_event(state, EVENT_GAME_CONFIG, config);
}

/// Broadcast the full envelope catalogue after it changed.
pub fn broadcast_envelopes(state: &AppState, envelopes: &[EnvelopeDto]) {
    send_event(state, EVENT_ENVELOPES, &envelopes);
}

/// Broadcast entering or leaving degraded mode.
pub fn broadcast_system_status(state: &AppState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_event<T: Serialize>(state: &AppState, event: &'static str, payload: &T) {
    match ServerEvent::json(event, payload) {
        Ok(message) => state.events().broadcast(message),
        Err(err) => warn!(event, error = %err, "failed to serialise SSE payload"),
    }
}
