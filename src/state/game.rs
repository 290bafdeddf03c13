use std::{collections::HashSet, time::SystemTime};

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use crate::{
    dao::models::{EnvelopeEntity, GameConfigEntity, GameStateEntity},
    state::state_machine::{InvalidTransition, SessionEvent, SessionPhase},
};

/// Admin-defined game settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of envelopes the admin intends to lay out.
    pub envelope_count: u32,
    /// Number of envelopes a player may open.
    pub max_tries: u32,
    /// Countdown shown to the player.
    pub timer_seconds: u32,
}

/// Prize envelope at a fixed backing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// UUID assigned on creation.
    pub id: String,
    /// 1-based storage position.
    pub position: u32,
    /// Prize revealed when the envelope is opened.
    pub prize_text: String,
    /// Palette colour name.
    pub color: String,
}

/// Reasons a session operation is rejected. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No envelope id, or a blank one.
    #[error("Envelope ID is required")]
    InvalidRequest,
    /// Every try of the current game was used.
    #[error("No tries remaining")]
    NoTriesRemaining,
    /// The envelope was opened earlier in this game.
    #[error("Envelope already selected")]
    AlreadySelected,
    /// No game state record exists.
    #[error("No active game state")]
    NoActiveSession,
    /// Selection before `start`.
    #[error("Game has not been started")]
    GameNotStarted,
    /// Selection after the game ended.
    #[error("Game is already complete")]
    GameAlreadyComplete,
    /// Catalogue write while the player is opening envelopes.
    #[error("Envelopes cannot change while a game is in progress")]
    GameInProgress,
    /// Unknown id, or one outside the current shuffled order.
    #[error("Envelope `{0}` not found")]
    EnvelopeNotFound(String),
}

impl From<InvalidTransition> for SessionError {
    fn from(err: InvalidTransition) -> Self {
        match (err.from, err.event) {
            (SessionPhase::Complete, _) => SessionError::GameAlreadyComplete,
            (SessionPhase::NotStarted, SessionEvent::Select { .. }) => SessionError::GameNotStarted,
            (SessionPhase::InProgress, SessionEvent::EditCatalogue) => SessionError::GameInProgress,
            _ => SessionError::NoActiveSession,
        }
    }
}

/// State of the single game session.
///
/// Every operation validates its preconditions before touching any field, so a
/// rejected call leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    /// Envelope ids in selection order.
    pub selected_envelopes: Vec<String>,
    /// Selections left before the game completes on its own.
    pub remaining_tries: u32,
    /// Set by the last try, a cash-out or the countdown.
    pub is_game_complete: bool,
    /// Set by `start`, cleared by `reset`.
    pub game_started: bool,
    /// The player banked a prize before running out of tries.
    pub cashed_out: bool,
    /// Prize the player walks away with once the game is complete.
    pub final_prize: Option<String>,
    /// Display permutation of every envelope id, fixed at start.
    pub shuffled_order: Vec<String>,
    /// Write counter of the persisted record this session was loaded from.
    pub revision: u64,
    /// Time of the last write.
    pub updated_at: SystemTime,
}

impl GameSession {
    /// Fresh, not-started session granting `max_tries` once started.
    pub fn reset(max_tries: u32) -> Self {
        Self {
            selected_envelopes: Vec::new(),
            remaining_tries: max_tries,
            is_game_complete: false,
            game_started: false,
            cashed_out: false,
            final_prize: None,
            shuffled_order: Vec::new(),
            revision: 0,
            updated_at: SystemTime::now(),
        }
    }

    /// Start a game, shuffling `envelope_ids` uniformly (Fisher-Yates).
    pub fn start<R>(max_tries: u32, mut envelope_ids: Vec<String>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        envelope_ids.shuffle(rng);
        Self {
            game_started: true,
            shuffled_order: envelope_ids,
            ..Self::reset(max_tries)
        }
    }

    /// Phase derived from the started and complete flags.
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_flags(self.game_started, self.is_game_complete)
    }

    /// Open an envelope, consuming one try. The last try completes the game and
    /// reveals the first unopened envelope of the shuffled order.
    pub fn select(
        &mut self,
        envelope_id: Option<&str>,
        envelopes: &[Envelope],
    ) -> Result<(), SessionError> {
        let envelope_id = envelope_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SessionError::InvalidRequest)?;

        if self.remaining_tries == 0 {
            return Err(SessionError::NoTriesRemaining);
        }

        if self.selected_envelopes.iter().any(|id| id == envelope_id) {
            return Err(SessionError::AlreadySelected);
        }

        let exhausts_tries = self.remaining_tries == 1;
        self.phase()
            .next(SessionEvent::Select { exhausts_tries })?;

        let in_order = self.shuffled_order.iter().any(|id| id == envelope_id);
        if !in_order || find_envelope(envelopes, envelope_id).is_none() {
            return Err(SessionError::EnvelopeNotFound(envelope_id.to_owned()));
        }

        self.selected_envelopes.push(envelope_id.to_owned());
        self.remaining_tries -= 1;

        if exhausts_tries {
            self.is_game_complete = true;
            self.final_prize = self.last_unopened_prize(envelopes);
        }

        Ok(())
    }

    /// End the game, banking the prize of `envelope_id`. Accepted in every phase.
    pub fn cash_out(
        &mut self,
        envelope_id: Option<&str>,
        envelopes: &[Envelope],
    ) -> Result<(), SessionError> {
        let envelope_id = envelope_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SessionError::InvalidRequest)?;

        self.phase().next(SessionEvent::CashOut)?;

        let envelope = find_envelope(envelopes, envelope_id)
            .ok_or_else(|| SessionError::EnvelopeNotFound(envelope_id.to_owned()))?;

        self.is_game_complete = true;
        self.cashed_out = true;
        self.final_prize = Some(envelope.prize_text.clone());
        Ok(())
    }

    /// Complete the game because the countdown ran out.
    ///
    /// A caller-supplied prize wins; otherwise the last opened envelope is
    /// revealed, or the first unopened one when nothing was opened yet. A
    /// session that never started falls back to the first stored envelope.
    pub fn time_up(
        &mut self,
        final_prize: Option<String>,
        envelopes: &[Envelope],
    ) -> Result<(), SessionError> {
        self.phase().next(SessionEvent::TimeUp)?;

        let final_prize = final_prize
            .filter(|prize| !prize.trim().is_empty())
            .or_else(|| self.last_selected_prize(envelopes))
            .or_else(|| self.last_unopened_prize(envelopes))
            .or_else(|| envelopes.first().map(|envelope| envelope.prize_text.clone()));

        self.is_game_complete = true;
        self.cashed_out = false;
        self.final_prize = final_prize;
        Ok(())
    }

    /// Make way for a catalogue change.
    ///
    /// Fails while a game is running. A finished game is reset, since its shuffled
    /// order refers to the envelopes being replaced. Returns whether the session changed.
    pub fn release_catalogue(&mut self, max_tries: u32) -> Result<bool, SessionError> {
        let phase = self.phase();
        phase.next(SessionEvent::EditCatalogue)?;

        if phase == SessionPhase::Complete {
            *self = Self {
                revision: self.revision,
                ..Self::reset(max_tries)
            };
            return Ok(true);
        }
        Ok(false)
    }

    /// Ids of the shuffled order that have not been opened yet.
    pub fn unopened(&self) -> impl Iterator<Item = &String> {
        let selected = self
            .selected_envelopes
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>();
        self.shuffled_order
            .iter()
            .filter(move |id| !selected.contains(id.as_str()))
    }

    fn last_unopened_prize(&self, envelopes: &[Envelope]) -> Option<String> {
        self.unopened()
            .find_map(|id| find_envelope(envelopes, id))
            .map(|envelope| envelope.prize_text.clone())
            .or_else(|| self.last_selected_prize(envelopes))
    }

    fn last_selected_prize(&self, envelopes: &[Envelope]) -> Option<String> {
        self.selected_envelopes
            .iter()
            .rev()
            .find_map(|id| find_envelope(envelopes, id))
            .map(|envelope| envelope.prize_text.clone())
    }
}

fn find_envelope<'a>(envelopes: &'a [Envelope], id: &str) -> Option<&'a Envelope> {
    envelopes.iter().find(|envelope| envelope.id == id)
}

impl From<GameConfigEntity> for GameConfig {
    fn from(value: GameConfigEntity) -> Self {
        Self {
            envelope_count: value.envelope_count,
            max_tries: value.max_tries,
            timer_seconds: value.timer_seconds,
        }
    }
}

impl From<GameConfig> for GameConfigEntity {
    fn from(value: GameConfig) -> Self {
        Self {
            envelope_count: value.envelope_count,
            max_tries: value.max_tries,
            timer_seconds: value.timer_seconds,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfigEntity::default().into()
    }
}

impl From<EnvelopeEntity> for Envelope {
    fn from(value: EnvelopeEntity) -> Self {
        Self {
            id: value.id,
            position: value.position,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

impl From<Envelope> for EnvelopeEntity {
    fn from(value: Envelope) -> Self {
        Self {
            id: value.id,
            position: value.position,
            prize_text: value.prize_text,
            color: value.color,
        }
    }
}

impl From<GameStateEntity> for GameSession {
    fn from(value: GameStateEntity) -> Self {
        Self {
            selected_envelopes: value.selected_envelopes,
            remaining_tries: value.remaining_tries,
            is_game_complete: value.is_game_complete,
            game_started: value.game_started,
            cashed_out: value.cashed_out,
            final_prize: value.final_prize,
            shuffled_order: value.shuffled_order,
            revision: value.revision,
            updated_at: value.updated_at,
        }
    }
}

impl From<GameSession> for GameStateEntity {
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
            updated_at: value.updated_at,
        }
    }
}
