use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, json};

use crate::dao::{
    game_store::GameStore,
    models::{EnvelopeEntity, GameConfigEntity, GameStateEntity},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, BulkDocResult, CONFIG_DOC_ID, CouchConfigDocument, CouchDeletion,
        CouchEnvelopeDocument, CouchGameStateDocument, END_SUFFIX, ENVELOPE_PREFIX, STATE_DOC_ID,
    },
};

const ALL_DOCS: &str = "_all_docs";
const BULK_DOCS: &str = "_bulk_docs";

#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

/// Outcome of a single-document write.
enum PutOutcome {
    Written,
    Conflict,
}

impl CouchGameStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .credentials
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Database {
                database: database.clone(),
                action: "query",
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Database {
                        database: database.clone(),
                        action: "create",
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<PutOutcome>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Written),
            status => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| {
                from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: ALL_DOCS.to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn bulk_docs(&self, docs: Vec<Value>) -> CouchResult<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let response = self
            .request(Method::POST, BULK_DOCS)
            .json(&json!({ "docs": docs }))
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: BULK_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: BULK_DOCS.to_string(),
                status: response.status(),
            });
        }

        let results = response
            .json::<Vec<BulkDocResult>>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: BULK_DOCS.to_string(),
                source,
            })?;

        let reasons = results
            .into_iter()
            .filter_map(|result| {
                result.error.map(|error| {
                    format!(
                        "{}: {} ({})",
                        result.id,
                        error,
                        result.reason.unwrap_or_default()
                    )
                })
            })
            .collect::<Vec<_>>();

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(CouchDaoError::BulkRejected {
                count: reasons.len(),
                reasons,
            })
        }
    }

    async fn list_envelope_documents(&self) -> CouchResult<Vec<CouchEnvelopeDocument>> {
        let mut docs = self
            .list_documents::<CouchEnvelopeDocument>(ENVELOPE_PREFIX)
            .await?;
        docs.sort_by_key(|doc| doc.position);
        Ok(docs)
    }

    async fn replace_envelopes(&self, envelopes: Vec<EnvelopeEntity>) -> CouchResult<()> {
        let existing = self.list_envelope_documents().await?;

        let mut docs = Vec::with_capacity(existing.len() + envelopes.len());
        for doc in existing {
            if let Some(rev) = doc.rev {
                docs.push(to_json(
                    &CouchDeletion {
                        id: doc.id,
                        rev,
                        deleted: true,
                    },
                    BULK_DOCS,
                )?);
            }
        }
        for envelope in envelopes {
            docs.push(to_json(&CouchEnvelopeDocument::from(envelope), BULK_DOCS)?);
        }

        self.bulk_docs(docs).await
    }

    async fn save_game_state(
        &self,
        state: GameStateEntity,
        expected_revision: Option<u64>,
    ) -> StorageResult<()> {
        let existing = self
            .get_document::<CouchGameStateDocument>(STATE_DOC_ID)
            .await?;
        let actual = existing.as_ref().map(|doc| doc.state.revision);
        if actual != expected_revision {
            return Err(StorageError::conflict(expected_revision, actual));
        }

        let doc: CouchGameStateDocument = (state, existing.and_then(|doc| doc.rev)).into();
        match self.put_document(STATE_DOC_ID, &doc).await? {
            PutOutcome::Written => Ok(()),
            // CouchDB rejected our `_rev`: someone wrote in between.
            PutOutcome::Conflict => {
                let actual = self
                    .get_document::<CouchGameStateDocument>(STATE_DOC_ID)
                    .await?
                    .map(|doc| doc.state.revision);
                Err(StorageError::conflict(expected_revision, actual))
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T, path: &str) -> CouchResult<Value> {
    serde_json::to_value(value).map_err(|source| CouchDaoError::SerializeValue {
        path: path.to_string(),
        source,
    })
}

impl GameStore for CouchGameStore {
    fn find_config(&self) -> BoxFuture<'static, StorageResult<Option<GameConfigEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store
                .get_document::<CouchConfigDocument>(CONFIG_DOC_ID)
                .await?;
            Ok(doc.map(|doc| doc.config))
        })
    }

    fn save_config(&self, config: GameConfigEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let rev = store
                .get_document::<CouchConfigDocument>(CONFIG_DOC_ID)
                .await?
                .and_then(|existing| existing.rev);
            let doc: CouchConfigDocument = (config, rev).into();
            match store.put_document(CONFIG_DOC_ID, &doc).await? {
                PutOutcome::Written => Ok(()),
                PutOutcome::Conflict => Err(CouchDaoError::RequestStatus {
                    path: CONFIG_DOC_ID.to_string(),
                    status: StatusCode::CONFLICT,
                }
                .into()),
            }
        })
    }

    fn list_envelopes(&self) -> BoxFuture<'static, StorageResult<Vec<EnvelopeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store.list_envelope_documents().await?;
            Ok(docs
                .into_iter()
                .map(CouchEnvelopeDocument::into_entity)
                .collect())
        })
    }

    fn insert_envelope(&self, envelope: EnvelopeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = CouchEnvelopeDocument::from(envelope);
            match store.put_document(&doc.id, &doc).await? {
                PutOutcome::Written => Ok(()),
                PutOutcome::Conflict => Err(CouchDaoError::RequestStatus {
                    path: doc.id.clone(),
                    status: StatusCode::CONFLICT,
                }
                .into()),
            }
        })
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
        Box::pin(async move {
            let doc = store
                .get_document::<CouchGameStateDocument>(STATE_DOC_ID)
                .await?;
            Ok(doc.map(|doc| doc.state))
        })
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
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
