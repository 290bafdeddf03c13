use thiserror::Error;

/// High-level phases a game session can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Envelopes are laid out but no game is running.
    NotStarted,
    /// The player is opening envelopes.
    InProgress,
    /// The game ended by exhausting tries, cashing out or running out of time.
    Complete,
}

/// Events that can be applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Shuffle the envelopes and hand the player a fresh set of tries.
    Start,
    /// Open one envelope; `exhausts_tries` is set when it consumes the last try.
    Select { exhausts_tries: bool },
    /// Bank a revealed prize and stop playing.
    CashOut,
    /// The client-side countdown reached zero.
    TimeUp,
    /// Return to the initial, not-started state.
    Reset,
    /// Create or replace envelopes. A finished game is discarded with the old catalogue.
    EditCatalogue,
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the session was in when the event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

impl SessionPhase {
    /// Derive the phase from the persisted flags.
    pub fn from_flags(game_started: bool, is_game_complete: bool) -> Self {
        match (game_started, is_game_complete) {
            (_, true) => SessionPhase::Complete,
            (true, false) => SessionPhase::InProgress,
            (false, false) => SessionPhase::NotStarted,
        }
    }

    /// Compute the phase reached by applying `event`, if the transition is valid.
    pub fn next(self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self, event) {
            (_, SessionEvent::Start) => SessionPhase::InProgress,
            (_, SessionEvent::Reset) => SessionPhase::NotStarted,
            (SessionPhase::InProgress, SessionEvent::Select { exhausts_tries }) => {
                if exhausts_tries {
                    SessionPhase::Complete
                } else {
                    SessionPhase::InProgress
                }
            }
            (_, SessionEvent::CashOut | SessionEvent::TimeUp) => SessionPhase::Complete,
            (
                SessionPhase::NotStarted | SessionPhase::Complete,
                SessionEvent::EditCatalogue,
            ) => SessionPhase::NotStarted,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(phase: SessionPhase, event: SessionEvent) -> SessionPhase {
        phase.next(event).unwrap()
    }

    #[test]
    fn flags_map_to_phases() {
        assert_eq!(
            SessionPhase::from_flags(false, false),
            SessionPhase::NotStarted
        );
        assert_eq!(
            SessionPhase::from_flags(true, false),
            SessionPhase::InProgress
        );
        assert_eq!(SessionPhase::from_flags(true, true), SessionPhase::Complete);
    }

    #[test]
    fn full_happy_path_through_game() {
        let mut phase = SessionPhase::NotStarted;

        phase = apply(phase, SessionEvent::Start);
        assert_eq!(phase, SessionPhase::InProgress);
        phase = apply(
            phase,
            SessionEvent::Select {
                exhausts_tries: false,
            },
        );
        assert_eq!(phase, SessionPhase::InProgress);
        phase = apply(
            phase,
            SessionEvent::Select {
                exhausts_tries: true,
            },
        );
        assert_eq!(phase, SessionPhase::Complete);
        assert_eq!(apply(phase, SessionEvent::Reset), SessionPhase::NotStarted);
    }

    #[test]
    fn cash_out_and_time_up_complete_from_every_phase() {
        for phase in [
            SessionPhase::NotStarted,
            SessionPhase::InProgress,
            SessionPhase::Complete,
        ] {
            for event in [SessionEvent::CashOut, SessionEvent::TimeUp] {
                assert_eq!(apply(phase, event), SessionPhase::Complete);
            }
        }
    }

    #[test]
    fn catalogue_is_locked_while_a_game_runs() {
        assert_eq!(
            apply(SessionPhase::NotStarted, SessionEvent::EditCatalogue),
            SessionPhase::NotStarted
        );
        assert_eq!(
            apply(SessionPhase::Complete, SessionEvent::EditCatalogue),
            SessionPhase::NotStarted
        );
        assert!(
            SessionPhase::InProgress
                .next(SessionEvent::EditCatalogue)
                .is_err()
        );
    }

    #[test]
    fn start_and_reset_are_accepted_from_every_phase() {
        for phase in [
            SessionPhase::NotStarted,
            SessionPhase::InProgress,
            SessionPhase::Complete,
        ] {
            assert_eq!(apply(phase, SessionEvent::Start), SessionPhase::InProgress);
            assert_eq!(apply(phase, SessionEvent::Reset), SessionPhase::NotStarted);
        }
    }

    #[test]
    fn invalid_transition_returns_error() {
        let err = SessionPhase::NotStarted
            .next(SessionEvent::Select {
                exhausts_tries: false,
            })
            .unwrap_err();
        assert_eq!(err.from, SessionPhase::NotStarted);

        let err = SessionPhase::Complete
            .next(SessionEvent::Select {
                exhausts_tries: false,
            })
            .unwrap_err();
        assert_eq!(err.from, SessionPhase::Complete);

        let err = SessionPhase::InProgress
            .next(SessionEvent::EditCatalogue)
            .unwrap_err();
        assert_eq!(err.event, SessionEvent::EditCatalogue);
    }
}
