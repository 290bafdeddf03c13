use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::game::GameConfig;

const DEFAULT_TIMER_SECONDS: u32 = 60;

/// Game settings as exposed to the admin and player screens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigDto {
    pub envelope_count: u32,
    pub max_tries: u32,
    pub timer_seconds: u32,
}

/// Payload replacing the stored game configuration.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsertGameConfig {
    #[validate(range(min = 1, max = 12, message = "Envelope count must be between 1 and 12"))]
    #[schema(minimum = 1, maximum = 12)]
    pub envelope_count: u32,
    #[validate(range(min = 1, max = 10, message = "Max tries must be between 1 and 10"))]
    #[schema(minimum = 1, maximum = 10)]
    pub max_tries: u32,
    /// Defaults to 60 seconds when omitted.
    #[serde(default = "default_timer_seconds")]
    #[validate(range(min = 30, max = 300, message = "Timer must be between 30 and 300 seconds"))]
    #[schema(minimum = 30, maximum = 300, default = 60)]
    pub timer_seconds: u32,
}

fn default_timer_seconds() -> u32 {
    DEFAULT_TIMER_SECONDS
}

impl From<GameConfig> for GameConfigDto {
    fn from(value: GameConfig) -> Self {
        Self {
            envelope_count: value.envelope_count,
            max_tries: value.max_tries,
            timer_seconds: value.timer_seconds,
        }
    }
}

impl From<InsertGameConfig> for GameConfig {
    fn from(value: InsertGameConfig) -> Self {
        Self {
            envelope_count: value.envelope_count,
            max_tries: value.max_tries,
            timer_seconds: value.timer_seconds,
        }
    }
}
