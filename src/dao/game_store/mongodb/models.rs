use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{EnvelopeEntity, GameConfigEntity, GameStateEntity};

/// `_id` shared by the singleton config and game state documents.
pub const SINGLETON_ID: &str = "current";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfigDocument {
    #[serde(rename = "_id")]
    id: String,
    envelope_count: i32,
    max_tries: i32,
    #[serde(default = "default_timer_seconds")]
    timer_seconds: i32,
}

fn default_timer_seconds() -> i32 {
    GameConfigEntity::default().timer_seconds as i32
}

impl From<GameConfigEntity> for MongoConfigDocument {
    fn from(value: GameConfigEntity) -> Self {
        Self {
            id: SINGLETON_ID.to_owned(),
            envelope_count: value.envelope_count as i32,
            max_tries: value.max_tries as i32,
            timer_seconds: value.timer_seconds as i32,
        }
    }
}

impl From<MongoConfigDocument> for GameConfigEntity {
    fn from(value: MongoConfigDocument) -> Self {
        Self {
            envelope_count: value.envelope_count.max(0) as u32,
            max_tries: value.max_tries.max(0) as u32,
            timer_seconds: value.timer_seconds.max(0) as u32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEnvelopeDocument {
    #[serde(rename = "_id")]
    id: String,
    position: i32,
    prize_text: String,
    color: String,
}

impl From<EnvelopeEntity> for MongoEnvelopeDocument {
    fn from(value: EnvelopeEntity) -> Self {
        Self {
            id: value.id,
            position: value.position as i32,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

impl From<MongoEnvelopeDocument> for EnvelopeEntity {
    fn from(value: MongoEnvelopeDocument) -> Self {
        Self {
            id: value.id,
            position: value.position.max(0) as u32,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameStateDocument {
    #[serde(rename = "_id")]
    id: String,
    selected_envelopes: Vec<String>,
    remaining_tries: i32,
    is_game_complete: bool,
    #[serde(default)]
    game_started: bool,
    #[serde(default)]
    cashed_out: bool,
    final_prize: Option<String>,
    #[serde(default)]
    shuffled_order: Vec<String>,
    revision: i64,
    updated_at: DateTime,
}

impl From<GameStateEntity> for MongoGameStateDocument {
    fn from(value: GameStateEntity) -> Self {
        Self {
            id: SINGLETON_ID.to_owned(),
            selected_envelopes: value.selected_envelopes,
            remaining_tries: value.remaining_tries as i32,
            is_game_complete: value.is_game_complete,
            game_started: value.game_started,
            cashed_out: value.cashed_out,
            final_prize: value.final_prize,
            shuffled_order: value.shuffled_order,
            revision: value.revision as i64,
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameStateDocument> for GameStateEntity {
    fn from(value: MongoGameStateDocument) -> Self {
        Self {
            selected_envelopes: value.selected_envelopes,
            remaining_tries: value.remaining_tries.max(0) as u32,
            is_game_complete: value.is_game_complete,
            game_started: value.game_started,
            cashed_out: value.cashed_out,
            final_prize: value.final_prize,
            shuffled_order: value.shuffled_order,
            revision: value.revision.max(0) as u64,
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

pub fn singleton_filter() -> Document {
    doc! {"_id": SINGLETON_ID}
}
