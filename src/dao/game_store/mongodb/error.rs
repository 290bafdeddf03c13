use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB database `{database}` did not answer the initial ping")]
    InitialPing {
        database: String,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game config")]
    LoadConfig {
        #[source]
        source: MongoError,
    },
    #[error("failed to save game config")]
    SaveConfig {
        #[source]
        source: MongoError,
    },
    #[error("failed to list envelopes")]
    ListEnvelopes {
        #[source]
        source: MongoError,
    },
    #[error("failed to save envelope `{id}`")]
    SaveEnvelope {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete envelopes")]
    DeleteEnvelopes {
        #[source]
        source: MongoError,
    },
    #[error("failed to load game state")]
    LoadGameState {
        #[source]
        source: MongoError,
    },
    #[error("failed to save game state")]
    SaveGameState {
        #[source]
        source: MongoError,
    },
}
