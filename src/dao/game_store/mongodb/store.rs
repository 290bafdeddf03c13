use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoConfigDocument, MongoEnvelopeDocument, MongoGameStateDocument, singleton_filter,
    },
};
use crate::dao::{
    game_store::GameStore,
    models::{EnvelopeEntity, GameConfigEntity, GameStateEntity},
    storage::{StorageError, StorageResult},
};

const CONFIG_COLLECTION_NAME: &str = "game_configs";
const ENVELOPE_COLLECTION_NAME: &str = "envelopes";
const GAME_STATE_COLLECTION_NAME: &str = "game_states";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let previous = {
            let mut guard = self.state.write().await;
            guard.database = database;
            std::mem::replace(&mut guard.client, client)
        };
        // Release the pools of the dropped connection.
        previous.shutdown().await;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.envelope_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"position": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("envelope_position_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ENVELOPE_COLLECTION_NAME,
                index: "position",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn config_collection(&self) -> Collection<MongoConfigDocument> {
        self.database()
            .await
            .collection::<MongoConfigDocument>(CONFIG_COLLECTION_NAME)
    }

    async fn envelope_collection(&self) -> Collection<MongoEnvelopeDocument> {
        self.database()
            .await
            .collection::<MongoEnvelopeDocument>(ENVELOPE_COLLECTION_NAME)
    }

    async fn game_state_collection(&self) -> Collection<MongoGameStateDocument> {
        self.database()
            .await
            .collection::<MongoGameStateDocument>(GAME_STATE_COLLECTION_NAME)
    }

    async fn find_config(&self) -> MongoResult<Option<GameConfigEntity>> {
        let document = self
            .config_collection()
            .await
            .find_one(singleton_filter())
            .await
            .map_err(|source| MongoDaoError::LoadConfig { source })?;
        Ok(document.map(Into::into))
    }

    async fn save_config(&self, config: GameConfigEntity) -> MongoResult<()> {
        let document: MongoConfigDocument = config.into();
        self.config_collection()
            .await
            .replace_one(singleton_filter(), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveConfig { source })?;
        Ok(())
    }

    async fn list_envelopes(&self) -> MongoResult<Vec<EnvelopeEntity>> {
        let documents: Vec<MongoEnvelopeDocument> = self
            .envelope_collection()
            .await
            .find(doc! {})
            .sort(doc! {"position": 1})
            .await
            .map_err(|source| MongoDaoError::ListEnvelopes { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListEnvelopes { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn insert_envelope(&self, envelope: EnvelopeEntity) -> MongoResult<()> {
        let id = envelope.id.clone();
        let document: MongoEnvelopeDocument = envelope.into();
        self.envelope_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveEnvelope { id, source })?;
        Ok(())
    }

    async fn replace_envelopes(&self, envelopes: Vec<EnvelopeEntity>) -> MongoResult<()> {
        let collection = self.envelope_collection().await;
        collection
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::DeleteEnvelopes { source })?;

        if envelopes.is_empty() {
            return Ok(());
        }

        let first_id = envelopes[0].id.clone();
        let documents = envelopes
            .into_iter()
            .map(MongoEnvelopeDocument::from)
            .collect::<Vec<_>>();
        collection
            .insert_many(documents)
            .await
            .map_err(|source| MongoDaoError::SaveEnvelope {
                id: first_id,
                source,
            })?;
        Ok(())
    }

    async fn find_game_state(&self) -> MongoResult<Option<GameStateEntity>> {
        let document = self
            .game_state_collection()
            .await
            .find_one(singleton_filter())
            .await
            .map_err(|source| MongoDaoError::LoadGameState { source })?;
        Ok(document.map(Into::into))
    }

    /// Compare-and-swap on the `revision` field. Inserting the first record relies on
    /// the `_id` uniqueness to detect a concurrent creator.
    async fn save_game_state(
        &self,
        state: GameStateEntity,
        expected_revision: Option<u64>,
    ) -> StorageResult<()> {
        let collection = self.game_state_collection().await;
        let document: MongoGameStateDocument = state.into();

        let swapped = match expected_revision {
            None => match collection.insert_one(&document).await {
                Ok(_) => true,
                Err(err) if is_duplicate_key(&err) => false,
                Err(source) => return Err(MongoDaoError::SaveGameState { source }.into()),
            },
            Some(revision) => {
                let mut filter = singleton_filter();
                filter.insert("revision", revision as i64);
                let result = collection
                    .replace_one(filter, &document)
                    .await
                    .map_err(|source| MongoDaoError::SaveGameState { source })?;
                result.matched_count > 0
            }
        };

        if swapped {
            return Ok(());
        }

        let actual = self
            .find_game_state()
            .await?
            .map(|current| current.revision);
        Err(StorageError::conflict(expected_revision, actual))
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl GameStore for MongoGameStore {
    fn find_config(&self) -> BoxFuture<'static, StorageResult<Option<GameConfigEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_config().await.map_err(Into::into) })
    }

    fn save_config(&self, config: GameConfigEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_config(config).await.map_err(Into::into) })
    }

    fn list_envelopes(&self) -> BoxFuture<'static, StorageResult<Vec<EnvelopeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_envelopes().await.map_err(Into::into) })
    }

    fn insert_envelope(&self, envelope: EnvelopeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_envelope(envelope).await.map_err(Into::into) })
    }

    fn replace_envelopes(
        &self,
        envelopes: Vec<EnvelopeEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace_envelopes(envelopes).await.map_err(Into::into) })
    }

    fn find_game_state(&self) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_state().await.map_err(Into::into) })
    }

    fn save_game_state(
        &self,
        state: GameStateEntity,
        expected_revision: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game_state(state, expected_revision).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
