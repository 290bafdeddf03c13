use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{EnvelopeEntity, GameConfigEntity, GameStateEntity};

pub const CONFIG_DOC_ID: &str = "config::current";
pub const STATE_DOC_ID: &str = "state::current";
pub const ENVELOPE_PREFIX: &str = "envelope::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// One entry of a `_bulk_docs` response.
#[derive(Debug, Deserialize)]
pub struct BulkDocResult {
    pub id: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Minimal body used to delete a document through `_bulk_docs`.
#[derive(Debug, Serialize)]
pub struct CouchDeletion {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_deleted")]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchConfigDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub config: GameConfigEntity,
}

impl From<(GameConfigEntity, Option<String>)> for CouchConfigDocument {
    fn from((config, rev): (GameConfigEntity, Option<String>)) -> Self {
        Self {
            id: CONFIG_DOC_ID.to_owned(),
            rev,
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchEnvelopeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub position: u32,
    pub prize_text: String,
    pub color: String,
}

impl From<EnvelopeEntity> for CouchEnvelopeDocument {
    fn from(value: EnvelopeEntity) -> Self {
        Self {
            id: envelope_doc_id(&value.id),
            rev: None,
            position: value.position,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

impl CouchEnvelopeDocument {
    pub fn into_entity(self) -> EnvelopeEntity {
        let id = self
            .id
            .strip_prefix(ENVELOPE_PREFIX)
            .unwrap_or(&self.id)
            .to_owned();
        EnvelopeEntity {
            id,
            position: self.position,
            prize_text: self.prize_text,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameStateDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub state: GameStateEntity,
}

impl From<(GameStateEntity, Option<String>)> for CouchGameStateDocument {
    fn from((state, rev): (GameStateEntity, Option<String>)) -> Self {
        Self {
            id: STATE_DOC_ID.to_owned(),
            rev,
            state,
        }
    }
}

pub fn envelope_doc_id(id: &str) -> String {
    format!("{ENVELOPE_PREFIX}{id}")
}
