use crate::stores::{PersistResult, SETTINGS_ROW_ID, SettingsStore};
use async_trait::async_trait;
use serde_json::Value;
use shared::models::{SettingsModel, SettingsSnapshot};
use sqlx::{
    Pool, Postgres, Row,
    postgres::{PgConnectOptions, PgPoolOptions},
};

#[derive(Clone)]
pub struct PostgresSettingsStore {
    pool: Pool<Postgres>,
    label: String,
}

/// Host, port and database of a connection, never its credentials.
fn label(options: &PgConnectOptions) -> String {
    format!(
        "postgres {}:{}/{}",
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or("postgres")
    )
}

impl PostgresSettingsStore {
    pub async fn connect(database_url: &str) -> PersistResult<Self> {
        let options: PgConnectOptions = database_url.parse()?;
        let label = label(&options);
        let pool = PgPoolOptions::new().connect_with(options).await?;

        let store = Self { pool, label };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> PersistResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY,
                payload JSONB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    async fn read(&self) -> PersistResult<Option<SettingsSnapshot>> {
        let row = sqlx::query("SELECT payload FROM settings WHERE id = $1")
            .bind(SETTINGS_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|row| row.try_get::<Value, _>("payload"))
            .transpose()?
            .map(|payload| SettingsModel::from_partial(&payload).to_snapshot()))
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> PersistResult<()> {
        let payload = serde_json::to_value(snapshot)?;
        sqlx::query(
            "INSERT INTO settings (id, payload) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET payload = EXCLUDED.payload",
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
