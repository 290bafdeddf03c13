use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{game_store::GameStore, models::EnvelopeEntity},
    dto::{
        envelope::{EnvelopeDto, InsertEnvelope},
        game_state::GameStateDto,
    },
    error::ServiceError,
    services::{game_service::release_catalogue, sse_events},
    state::{
        SharedState,
        game::{Envelope, GameSession},
    },
};

pub(crate) async fn load_envelopes(store: &dyn GameStore) -> Result<Vec<Envelope>, ServiceError> {
    Ok(store
        .list_envelopes()
        .await?
        .into_iter()
        .map(Envelope::from)
        .collect())
}

/// Turn an admin payload into a stored envelope, filling blank text and colour.
fn build_envelope(insert: InsertEnvelope, config: &AppConfig) -> Envelope {
    let InsertEnvelope {
        position,
        prize_text,
        color,
    } = insert;

    let prize_text = match prize_text.trim() {
        "" => format!("Prize {position}"),
        text => text.to_owned(),
    };

    let color = color
        .map(|color| color.trim().to_owned())
        .filter(|color| !color.is_empty())
        .unwrap_or_else(|| {
            let index = position.saturating_sub(1) as usize;
            config.color_for_index(index).to_owned()
        });

    Envelope {
        id: Uuid::new_v4().to_string(),
        position,
        prize_text,
        color,
    }
}

pub async fn list_envelopes(state: &SharedState) -> Result<Vec<EnvelopeDto>, ServiceError> {
    let store = state.require_game_store().await?;
    let envelopes = load_envelopes(store.as_ref()).await?;
    Ok(envelopes.into_iter().map(EnvelopeDto::from).collect())
}

/// Add one envelope; its position must not be taken yet and no game may be running.
pub async fn create_envelope(
    state: &SharedState,
    insert: InsertEnvelope,
) -> Result<EnvelopeDto, ServiceError> {
    let store = state.require_game_store().await?;
    let envelope = build_envelope(insert, state.config());

    let candidate = &envelope;
    let (envelopes, reset) = state
        .run_transition("create_envelope", move || async move {
            let mut envelopes = load_envelopes(store.as_ref()).await?;
            if envelopes.iter().any(|e| e.position == candidate.position) {
                return Err(ServiceError::InvalidInput(format!(
                    "Position {} is already taken",
                    candidate.position
                )));
            }

            let reset = release_catalogue(store.as_ref()).await?;
            store.insert_envelope(candidate.clone().into()).await?;
            envelopes.push(candidate.clone());
            envelopes.sort_by_key(|e| e.position);
            Ok((envelopes, reset))
        })
        .await?;

    info!(envelope_id = %envelope.id, position = envelope.position, "envelope created");
    broadcast_reset(state, reset);
    broadcast_catalogue(state, envelopes);
    Ok(envelope.into())
}

/// Replace the whole catalogue, returning the new envelopes ordered by position.
/// Refused while a game is running.
pub async fn replace_envelopes(
    state: &SharedState,
    inserts: Vec<InsertEnvelope>,
) -> Result<Vec<EnvelopeDto>, ServiceError> {
    let store = state.require_game_store().await?;

    let mut envelopes = inserts
        .into_iter()
        .map(|insert| build_envelope(insert, state.config()))
        .collect::<Vec<_>>();
    envelopes.sort_by_key(|e| e.position);

    let replacement: Vec<EnvelopeEntity> = envelopes.iter().cloned().map(Into::into).collect();
    let reset = state
        .run_transition("replace_envelopes", move || async move {
            let reset = release_catalogue(store.as_ref()).await?;
            store.replace_envelopes(replacement).await?;
            Ok(reset)
        })
        .await?;

    info!(count = envelopes.len(), "envelope catalogue replaced");
    broadcast_reset(state, reset);
    Ok(broadcast_catalogue(state, envelopes))
}

fn broadcast_reset(state: &SharedState, reset: Option<GameSession>) {
    if let Some(session) = reset {
        sse_events::broadcast_game_state(state, &GameStateDto::from(session));
    }
}

fn broadcast_catalogue(state: &SharedState, envelopes: Vec<Envelope>) -> Vec<EnvelopeDto> {
    let dtos = envelopes
        .into_iter()
        .map(EnvelopeDto::from)
        .collect::<Vec<_>>();
    sse_events::broadcast_envelopes(state, &dtos);
    dtos
}
