use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::format_system_time, state::game::GameSession};

/// Snapshot of the single game session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameStateDto {
    /// Envelope ids in the order they were opened.
    pub selected_envelopes: Vec<String>,
    pub remaining_tries: u32,
    pub is_game_complete: bool,
    pub game_started: bool,
    pub cashed_out: bool,
    /// Revealed once the game is complete.
    pub final_prize: Option<String>,
    /// Display order of the envelopes for the running game.
    pub shuffled_order: Vec<String>,
    /// Write counter of the stored record.
    pub revision: u64,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}

impl From<GameSession> for GameStateDto {
    fn from(value: GameSession) -> Self {
        Self {
            selected_envelopes: value.selected_envelopes,
            remaining_tries: value.remaining_tries,
            is_game_complete: value.is_game_complete,
            game_started: value.game_started,
            cashed_out: value.cashed_out,
            final_prize: value.final_prize,
            shuffled_order: value.shuffled_order,
            revision: value.revision,
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Body of the select-envelope and cash-out requests.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeActionRequest {
    #[serde(default)]
    pub envelope_id: Option<String>,
}

/// Body of the time-up request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeUpRequest {
    /// Prize chosen by the client; the server picks one when omitted.
    #[serde(default)]
    pub final_prize: Option<String>,
}

/// Envelope as laid out on the player's board.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEnvelope {
    pub id: String,
    /// 1-based slot on the board.
    pub display_position: u32,
    /// Backing storage position.
    pub position: u32,
    pub color: String,
    pub opened: bool,
    /// Only present for opened envelopes, or for all of them once the game is complete.
    pub prize_text: Option<String>,
}
