#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{EnvelopeEntity, GameConfigEntity, GameStateEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for the game configuration, the
/// envelope catalogue and the singleton game state.
pub trait GameStore: Send + Sync {
    /// Stored configuration, `None` until an admin saved one.
    fn find_config(&self) -> BoxFuture<'static, StorageResult<Option<GameConfigEntity>>>;
    /// Replace the stored configuration wholesale.
    fn save_config(&self, config: GameConfigEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Envelopes ordered by position.
    fn list_envelopes(&self) -> BoxFuture<'static, StorageResult<Vec<EnvelopeEntity>>>;
    /// Add a single envelope to the catalogue.
    fn insert_envelope(&self, envelope: EnvelopeEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every envelope, then insert the given ones.
    fn replace_envelopes(
        &self,
        envelopes: Vec<EnvelopeEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// The singleton game state, `None` before the first write.
    fn find_game_state(&self) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>>;
    /// Replace the game state if the stored revision still equals `expected_revision`
    /// (`None` meaning no record exists yet).
    fn save_game_state(
        &self,
        state: GameStateEntity,
        expected_revision: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip proving the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
