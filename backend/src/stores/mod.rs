use async_trait::async_trait;
use shared::models::{SettingsModel, SettingsSnapshot, SnapshotError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod file;
pub mod postgres;
pub mod remote;
pub mod sqlite;

pub use file::FileSettingsStore;
pub use postgres::PostgresSettingsStore;
pub use remote::RemoteSettingsStore;
pub use sqlite::SqliteSettingsStore;

pub type PersistResult<T> = Result<T, PersistError>;

/// Row id of the single settings record in the SQL stores.
pub(crate) const SETTINGS_ROW_ID: i32 = 1;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed settings: {0}")]
    Malformed(#[from] SnapshotError),
    #[error("Save rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid store configuration: {0}")]
    Config(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    File { path: PathBuf },
    Sqlite { path: PathBuf },
    Postgres { url: String },
    Remote { base_url: String },
}

impl StoreConfig {
    pub async fn connect(&self) -> PersistResult<Arc<dyn SettingsStore>> {
        let store: Arc<dyn SettingsStore> = match self {
            StoreConfig::File { path } => Arc::new(FileSettingsStore::new(path.clone())),
            StoreConfig::Sqlite { path } => Arc::new(SqliteSettingsStore::connect(path).await?),
            StoreConfig::Postgres { url } => Arc::new(PostgresSettingsStore::connect(url).await?),
            StoreConfig::Remote { base_url } => Arc::new(RemoteSettingsStore::new(base_url)?),
        };
        tracing::info!("Using settings store: {}", store.describe());
        Ok(store)
    }
}

/// Durable home of the last saved settings snapshot.
///
/// Implementations must make `save` atomic from the reader's point of view: a
/// concurrent `load` sees either the old snapshot or the new one. A failed save
/// leaves the previous snapshot in place.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Reads the stored snapshot, `Ok(None)` if nothing was saved yet.
    async fn read(&self) -> PersistResult<Option<SettingsSnapshot>>;

    async fn save(&self, snapshot: &SettingsSnapshot) -> PersistResult<()>;

    fn describe(&self) -> String;

    /// Last saved snapshot, or defaults when there is none or it can't be read.
    async fn load(&self) -> SettingsSnapshot {
        match self.read().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!("No saved settings in {}, using defaults", self.describe());
                SettingsSnapshot::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load settings from {}, using defaults: {:?}",
                    self.describe(),
                    e
                );
                SettingsSnapshot::default()
            }
        }
    }
}

/// Parses stored JSON; bad fields fall back to their defaults.
pub(crate) fn parse_payload(text: &str) -> PersistResult<SettingsSnapshot> {
    Ok(SettingsModel::from_json(text)?.to_snapshot())
}
