use tracing::info;

use crate::{
    dao::game_store::GameStore,
    dto::config::GameConfigDto,
    error::ServiceError,
    services::sse_events,
    state::{SharedState, game::GameConfig},
};

/// Stored configuration, or the defaults when none was saved yet.
pub(crate) async fn load_config(store: &dyn GameStore) -> Result<GameConfig, ServiceError> {
    Ok(store
        .find_config()
        .await?
        .map(GameConfig::from)
        .unwrap_or_default())
}

pub async fn get_config(state: &SharedState) -> Result<GameConfigDto, ServiceError> {
    let store = state.require_game_store().await?;
    Ok(load_config(store.as_ref()).await?.into())
}

/// Replace the stored configuration wholesale.
pub async fn save_config(
    state: &SharedState,
    config: GameConfig,
) -> Result<GameConfigDto, ServiceError> {
    let store = state.require_game_store().await?;

    state
        .run_transition("save_config", move || async move {
            store.save_config(config.into()).await?;
            Ok(())
        })
        .await?;

    info!(
        envelope_count = config.envelope_count,
        max_tries = config.max_tries,
        timer_seconds = config.timer_seconds,
        "game configuration saved"
    );

    let dto = GameConfigDto::from(config);
    sse_events::broadcast_game_config(state, &dto);
    Ok(dto)
}
