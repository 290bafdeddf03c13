use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Singleton game configuration persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfigEntity {
    /// Number of envelopes the admin intends to lay out.
    pub envelope_count: u32,
    /// Number of selections a player may make in one session.
    pub max_tries: u32,
    /// Countdown shown to the player, in seconds.
    pub timer_seconds: u32,
}

impl Default for GameConfigEntity {
    fn default() -> Self {
        Self {
            envelope_count: 6,
            max_tries: 3,
            timer_seconds: 60,
        }
    }
}

/// Prize envelope stored at a fixed backing position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvelopeEntity {
    /// Stable identifier (UUID v4 string).
    pub id: String,
    /// 1-based storage position.
    pub position: u32,
    /// Text revealed when the envelope is opened.
    pub prize_text: String,
    /// Palette name used by the front-end.
    pub color: String,
}

/// Singleton game state record. Every write replaces the whole record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateEntity {
    /// Envelope ids in selection order.
    pub selected_envelopes: Vec<String>,
    pub remaining_tries: u32,
    pub is_game_complete: bool,
    pub game_started: bool,
    pub cashed_out: bool,
    pub final_prize: Option<String>,
    /// Permutation of envelope ids fixed when the game starts.
    pub shuffled_order: Vec<String>,
    /// Write counter used for compare-and-swap on save.
    pub revision: u64,
    /// Last time the record was written.
    pub updated_at: SystemTime,
}
