use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{dto::validation::validate_color_name, state::game::Envelope};

const MAX_PRIZE_TEXT_LENGTH: usize = 200;

/// Envelope as stored, ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDto {
    pub id: String,
    pub position: u32,
    pub prize_text: String,
    pub color: String,
}

impl From<Envelope> for EnvelopeDto {
    fn from(value: Envelope) -> Self {
        Self {
            id: value.id,
            position: value.position,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

/// Envelope definition supplied by the admin.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertEnvelope {
    /// 1-based backing position.
    #[schema(minimum = 1)]
    pub position: u32,
    /// Blank text becomes `Prize {position}`.
    #[serde(default)]
    #[schema(max_length = 200)]
    pub prize_text: String,
    /// Missing or blank colours are taken from the palette.
    #[serde(default)]
    #[schema(max_length = 32)]
    pub color: Option<String>,
}

impl Validate for InsertEnvelope {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.position < 1 {
            let mut err = ValidationError::new("position_range");
            err.message = Some("Position must be at least 1".into());
            errors.add("position", err);
        }

        if self.prize_text.chars().count() > MAX_PRIZE_TEXT_LENGTH {
            let mut err = ValidationError::new("prize_text_length");
            err.message = Some(
                format!("Prize text must be at most {MAX_PRIZE_TEXT_LENGTH} characters").into(),
            );
            errors.add("prize_text", err);
        }

        let color = self.color.as_deref().map(str::trim).unwrap_or_default();
        if !color.is_empty() {
            if let Err(err) = validate_color_name(color) {
                errors.add("color", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Full replacement set for the envelope catalogue.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct InsertEnvelopes(pub Vec<InsertEnvelope>);

impl Validate for InsertEnvelopes {
    fn validate(&self) -> Result<(), ValidationErrors> {
        for envelope in &self.0 {
            envelope.validate()?;
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self
            .0
            .iter()
            .map(|envelope| envelope.position)
            .find(|position| !seen.insert(*position))
        {
            let mut errors = ValidationErrors::new();
            let mut err = ValidationError::new("duplicate_position");
            err.message = Some(format!("Position {duplicate} is used more than once").into());
            errors.add("position", err);
            return Err(errors);
        }

        Ok(())
    }
}
