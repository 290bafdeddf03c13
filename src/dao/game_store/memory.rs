//! Process-local store used by default and in tests.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    game_store::GameStore,
    models::{EnvelopeEntity, GameConfigEntity, GameStateEntity},
    storage::{StorageError, StorageResult},
};

#[derive(Default)]
struct MemoryInner {
    config: Option<GameConfigEntity>,
    envelopes: Vec<EnvelopeEntity>,
    game_state: Option<GameStateEntity>,
}

/// [`GameStore`] keeping everything behind a single async lock.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_position(mut envelopes: Vec<EnvelopeEntity>) -> Vec<EnvelopeEntity> {
    envelopes.sort_by_key(|envelope| envelope.position);
    envelopes
}

impl GameStore for InMemoryGameStore {
    fn find_config(&self) -> BoxFuture<'static, StorageResult<Option<GameConfigEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.config.clone()) })
    }

    fn save_config(&self, config: GameConfigEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.write().await.config = Some(config);
            Ok(())
        })
    }

    fn list_envelopes(&self) -> BoxFuture<'static, StorageResult<Vec<EnvelopeEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(sorted_by_position(inner.read().await.envelopes.clone())) })
    }

    fn insert_envelope(&self, envelope: EnvelopeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.write().await.envelopes.push(envelope);
            Ok(())
        })
    }

    fn replace_envelopes(
        &self,
        envelopes: Vec<EnvelopeEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.write().await.envelopes = envelopes;
            Ok(())
        })
    }

    fn find_game_state(&self) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.game_state.clone()) })
    }

    fn save_game_state(
        &self,
        state: GameStateEntity,
        expected_revision: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            let actual = guard.game_state.as_ref().map(|current| current.revision);
            if actual != expected_revision {
                return Err(StorageError::conflict(expected_revision, actual));
            }
            guard.game_state = Some(state);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn envelope(id: &str, position: u32) -> EnvelopeEntity {
        EnvelopeEntity {
            id: id.into(),
            position,
            prize_text: format!("Prize {position}"),
            color: "mint".into(),
        }
    }

    fn state(revision: u64) -> GameStateEntity {
        GameStateEntity {
            selected_envelopes: Vec::new(),
            remaining_tries: 3,
            is_game_complete: false,
            game_started: false,
            cashed_out: false,
            final_prize: None,
            shuffled_order: Vec::new(),
            revision,
            updated_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn envelopes_are_listed_by_position() {
        let store = InMemoryGameStore::new();
        store.insert_envelope(envelope("b", 2)).await.unwrap();
        store.insert_envelope(envelope("a", 1)).await.unwrap();

        let ids: Vec<_> = store
            .list_envelopes()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn replace_envelopes_drops_previous_entries() {
        let store = InMemoryGameStore::new();
        store.insert_envelope(envelope("old", 1)).await.unwrap();
        store
            .replace_envelopes(vec![envelope("new", 1)])
            .await
            .unwrap();

        let envelopes = store.list_envelopes().await.unwrap();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].id, "new");
    }

    #[tokio::test]
    async fn game_state_save_checks_revision() {
        let store = InMemoryGameStore::new();
        store.save_game_state(state(1), None).await.unwrap();

        let err = store.save_game_state(state(2), None).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict {
                expected: None,
                actual: Some(1)
            }
        ));

        store.save_game_state(state(2), Some(1)).await.unwrap();
        let stored = store.find_game_state().await.unwrap().unwrap();
        assert_eq!(stored.revision, 2);
    }
}
