use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_SUGGESTION_COUNT: u32 = 6;

/// Query string of `GET /api/prize-suggestions`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PrizeSuggestionQuery {
    /// Number of ideas to draw (1 to 32, default 6).
    #[validate(range(min = 1, max = 32, message = "Count must be between 1 and 32"))]
    pub count: Option<u32>,
}

impl PrizeSuggestionQuery {
    pub fn count(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_SUGGESTION_COUNT)
    }
}

/// Prize idea paired with an envelope colour, ready to prefill the admin form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeSuggestion {
    pub prize_text: String,
    pub color: String,
}

impl From<(String, String)> for PrizeSuggestion {
    fn from((prize_text, color): (String, String)) -> Self {
        Self { prize_text, color }
    }
}
