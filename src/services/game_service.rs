use std::{collections::HashSet, time::SystemTime};

use tracing::{debug, info};

use crate::{
    config::AppConfig,
    dao::{game_store::GameStore, storage::StorageError},
    dto::game_state::{DisplayEnvelope, GameStateDto},
    error::ServiceError,
    services::{config_service::load_config, envelope_service::load_envelopes, sse_events},
    state::{
        SharedState,
        game::{Envelope, GameConfig, GameSession, SessionError},
    },
};

/// Everything a transition needs to decide the next session.
struct TransitionInput {
    current: Option<GameSession>,
    config: GameConfig,
    envelopes: Vec<Envelope>,
}

async fn load_session(store: &dyn GameStore) -> Result<Option<GameSession>, ServiceError> {
    Ok(store.find_game_state().await?.map(GameSession::from))
}

/// Write `session` if the stored revision is still `expected`, bumping the revision.
async fn persist(
    store: &dyn GameStore,
    mut session: GameSession,
    expected: Option<u64>,
) -> Result<GameSession, ServiceError> {
    session.revision = expected.map_or(1, |revision| revision + 1);
    session.updated_at = SystemTime::now();
    store
        .save_game_state(session.clone().into(), expected)
        .await?;
    Ok(session)
}

/// Read, decide and write the session under the transition gate, then broadcast it.
async fn transition<F>(
    state: &SharedState,
    operation: &'static str,
    decide: F,
) -> Result<GameStateDto, ServiceError>
where
    F: FnOnce(TransitionInput) -> Result<GameSession, ServiceError> + Send,
{
    let store = state.require_game_store().await?;

    let session = state
        .run_transition(operation, move || async move {
            let current = load_session(store.as_ref()).await?;
            let expected = current.as_ref().map(|session| session.revision);
            let input = TransitionInput {
                current,
                config: load_config(store.as_ref()).await?,
                envelopes: load_envelopes(store.as_ref()).await?,
            };

            let next = decide(input)?;
            persist(store.as_ref(), next, expected).await
        })
        .await?;

    debug!(
        operation,
        revision = session.revision,
        remaining_tries = session.remaining_tries,
        complete = session.is_game_complete,
        "game state written"
    );

    let dto = GameStateDto::from(session);
    sse_events::broadcast_game_state(state, &dto);
    Ok(dto)
}

/// Lock check for catalogue writers, run inside their transition.
///
/// Rejects the write while a game is running. A finished game is reset and written back,
/// and the reset session is returned so the caller can broadcast it.
pub(crate) async fn release_catalogue(
    store: &dyn GameStore,
) -> Result<Option<GameSession>, ServiceError> {
    let Some(mut session) = load_session(store).await? else {
        return Ok(None);
    };

    let expected = session.revision;
    let config = load_config(store).await?;
    if !session.release_catalogue(config.max_tries)? {
        return Ok(None);
    }

    let session = persist(store, session, Some(expected)).await?;
    info!(revision = session.revision, "finished game reset for a catalogue change");
    Ok(Some(session))
}

/// Current game state, creating the default not-started record when none exists.
pub async fn get_game_state(state: &SharedState) -> Result<GameStateDto, ServiceError> {
    let store = state.require_game_store().await?;
    if let Some(session) = load_session(store.as_ref()).await? {
        return Ok(session.into());
    }

    let created = state
        .run_transition("create_game_state", move || async move {
            if let Some(existing) = load_session(store.as_ref()).await? {
                return Ok(existing);
            }

            let config = load_config(store.as_ref()).await?;
            match persist(store.as_ref(), GameSession::reset(config.max_tries), None).await {
                Err(ServiceError::Conflict(StorageError::Conflict { .. })) => {
                    load_session(store.as_ref())
                        .await?
                        .ok_or(ServiceError::Session(SessionError::NoActiveSession))
                }
                other => other,
            }
        })
        .await?;

    Ok(created.into())
}

/// Shuffle every envelope into a new game granting `maxTries` selections.
pub async fn start_game(state: &SharedState) -> Result<GameStateDto, ServiceError> {
    let dto = transition(state, "start_game", |input| {
        let ids = input
            .envelopes
            .into_iter()
            .map(|envelope| envelope.id)
            .collect::<Vec<_>>();
        let mut rng = rand::rng();
        Ok(GameSession::start(input.config.max_tries, ids, &mut rng))
    })
    .await?;

    info!(
        envelopes = dto.shuffled_order.len(),
        max_tries = dto.remaining_tries,
        "game started"
    );
    Ok(dto)
}

pub async fn reset_game(state: &SharedState) -> Result<GameStateDto, ServiceError> {
    let dto = transition(state, "reset_game", |input| {
        Ok(GameSession::reset(input.config.max_tries))
    })
    .await?;

    info!("game reset");
    Ok(dto)
}

/// Open `envelope_id`, consuming one try.
pub async fn select_envelope(
    state: &SharedState,
    envelope_id: Option<String>,
) -> Result<GameStateDto, ServiceError> {
    let id = envelope_id.clone();
    let dto = transition(state, "select_envelope", move |input| {
        let mut session = input
            .current
            .unwrap_or_else(|| GameSession::reset(input.config.max_tries));
        session.select(id.as_deref(), &input.envelopes)?;
        Ok(session)
    })
    .await?;

    info!(
        envelope_id = envelope_id.as_deref().unwrap_or_default(),
        remaining_tries = dto.remaining_tries,
        complete = dto.is_game_complete,
        "envelope selected"
    );
    Ok(dto)
}

/// End the game early, banking the prize behind `envelope_id`.
pub async fn cash_out(
    state: &SharedState,
    envelope_id: Option<String>,
) -> Result<GameStateDto, ServiceError> {
    let id = envelope_id.clone();
    let dto = transition(state, "cash_out", move |input| {
        let mut session = input.current.ok_or(SessionError::NoActiveSession)?;
        session.cash_out(id.as_deref(), &input.envelopes)?;
        Ok(session)
    })
    .await?;

    info!(
        envelope_id = envelope_id.as_deref().unwrap_or_default(),
        "player cashed out"
    );
    Ok(dto)
}

/// Complete the game once the countdown ran out.
pub async fn time_up(
    state: &SharedState,
    final_prize: Option<String>,
) -> Result<GameStateDto, ServiceError> {
    let dto = transition(state, "time_up", move |input| {
        let mut session = input.current.ok_or(SessionError::NoActiveSession)?;
        session.time_up(final_prize, &input.envelopes)?;
        Ok(session)
    })
    .await?;

    info!("game timed out");
    Ok(dto)
}

/// Envelopes laid out the way the player sees them.
pub async fn board(state: &SharedState) -> Result<Vec<DisplayEnvelope>, ServiceError> {
    let store = state.require_game_store().await?;
    let session = load_session(store.as_ref()).await?;
    let envelopes = load_envelopes(store.as_ref()).await?;
    Ok(build_board(session.as_ref(), &envelopes, state.config()))
}

/// Display order follows the shuffled order of a started game, storage order otherwise.
/// Ids of envelopes deleted since the start are skipped.
pub fn build_board(
    session: Option<&GameSession>,
    envelopes: &[Envelope],
    config: &AppConfig,
) -> Vec<DisplayEnvelope> {
    let (opened, reveal_all): (HashSet<&str>, bool) = match session {
        Some(session) => (
            session
                .selected_envelopes
                .iter()
                .map(String::as_str)
                .collect(),
            session.is_game_complete,
        ),
        None => (HashSet::new(), false),
    };

    let ordered: Vec<&Envelope> = match session {
        Some(session) if session.game_started && !session.shuffled_order.is_empty() => session
            .shuffled_order
            .iter()
            .filter_map(|id| envelopes.iter().find(|envelope| &envelope.id == id))
            .collect(),
        _ => envelopes.iter().collect(),
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, envelope)| {
            let is_opened = opened.contains(envelope.id.as_str());
            DisplayEnvelope {
                id: envelope.id.clone(),
                display_position: index as u32 + 1,
                position: envelope.position,
                color: config.color_for_index(index).to_owned(),
                opened: is_opened,
                prize_text: (is_opened || reveal_all).then(|| envelope.prize_text.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn envelopes(count: u32) -> Vec<Envelope> {
        (1..=count)
            .map(|position| Envelope {
                id: format!("env-{position}"),
                position,
                prize_text: format!("Prize {position}"),
                color: "coral".into(),
            })
            .collect()
    }

    #[test]
    fn board_uses_storage_order_before_start() {
        let envelopes = envelopes(3);
        let board = build_board(None, &envelopes, &AppConfig::default());

        let ids: Vec<_> = board.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["env-1", "env-2", "env-3"]);
        assert_eq!(board[2].display_position, 3);
        assert_eq!(board[1].color, "mint");
        assert!(board.iter().all(|e| !e.opened && e.prize_text.is_none()));
    }

    #[test]
    fn board_follows_shuffled_order_and_reveals_opened_envelopes() {
        let envelopes = envelopes(6);
        let ids = envelopes.iter().map(|e| e.id.clone()).collect();
        let mut session = GameSession::start(3, ids, &mut StdRng::seed_from_u64(11));
        let picked = session.shuffled_order[2].clone();
        session.select(Some(&picked), &envelopes).unwrap();

        let board = build_board(Some(&session), &envelopes, &AppConfig::default());
        let order: Vec<_> = board.iter().map(|e| e.id.clone()).collect();
        assert_eq!(order, session.shuffled_order);

        assert!(board[2].opened);
        assert_eq!(board[2].prize_text.as_deref(), Some(board_prize(&envelopes, &picked)));
        assert!(board.iter().filter(|e| e.id != picked).all(|e| e.prize_text.is_none()));
    }

    #[test]
    fn completed_board_reveals_everything_and_skips_missing_ids() {
        let mut all = envelopes(4);
        let ids = all.iter().map(|e| e.id.clone()).collect();
        let mut session = GameSession::start(3, ids, &mut StdRng::seed_from_u64(5));
        session.time_up(Some("Picnic".into()), &all).unwrap();
        all.retain(|e| e.id != "env-2");

        let board = build_board(Some(&session), &all, &AppConfig::default());
        assert_eq!(board.len(), 3);
        assert!(board.iter().all(|e| e.prize_text.is_some()));
        assert_eq!(
            board.iter().map(|e| e.display_position).collect::<Vec<_>>(),
            [1, 2, 3]
        );
    }

    fn board_prize<'a>(envelopes: &'a [Envelope], id: &str) -> &'a str {
        envelopes
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.prize_text.as_str())
            .unwrap()
    }
}
