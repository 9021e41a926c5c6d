use crate::stores::{PersistResult, SETTINGS_ROW_ID, SettingsStore, parse_payload};
use async_trait::async_trait;
use shared::models::SettingsSnapshot;
use sqlx::{
    Pool, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::path::Path;

#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
    label: String,
}

impl SqliteSettingsStore {
    pub async fn connect(path: &Path) -> PersistResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self {
            pool,
            label: format!("sqlite {}", path.display()),
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> PersistResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY,
                payload TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn read(&self) -> PersistResult<Option<SettingsSnapshot>> {
        let row = sqlx::query("SELECT payload FROM settings WHERE id = ?")
            .bind(SETTINGS_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload")?;
        parse_payload(&payload).map(Some)
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> PersistResult<()> {
        let payload = serde_json::to_string(snapshot)?;
        sqlx::query(
            "INSERT INTO settings (id, payload) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
        )
        .bind(SETTINGS_ROW_ID)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
