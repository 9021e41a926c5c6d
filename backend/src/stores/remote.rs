use crate::stores::{PersistError, PersistResult, SettingsStore, parse_payload};
use async_trait::async_trait;
use shared::models::SettingsSnapshot;
use std::time::Duration;

pub const SETTINGS_PATH: &str = "/api/settings";
pub const SAVE_SETTINGS_PATH: &str = "/api/save-settings";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings held by a remote paramdeck server.
///
/// Every save is a single POST carrying all six fields. Failed saves are
/// reported and never retried here.
#[derive(Clone)]
pub struct RemoteSettingsStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSettingsStore {
    pub fn new(base_url: &str) -> PersistResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PersistError::Config(format!(
                "remote store needs an http(s) URL, got {base_url:?}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SettingsStore for RemoteSettingsStore {
    async fn read(&self) -> PersistResult<Option<SettingsSnapshot>> {
        let body = self
            .client
            .get(self.url(SETTINGS_PATH))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_payload(&body).map(Some)
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> PersistResult<()> {
        let response = self
            .client
            .post(self.url(SAVE_SETTINGS_PATH))
            .json(snapshot)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let store = RemoteSettingsStore::new("http://localhost:8080/").unwrap();
        assert_eq!(
            store.url(SAVE_SETTINGS_PATH),
            "http://localhost:8080/api/save-settings"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(RemoteSettingsStore::new("localhost:8080").is_err());
    }

    #[tokio::test]
    async fn unreachable_server_loads_defaults() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let store = RemoteSettingsStore::new("http://127.0.0.1:9").unwrap();
        assert_eq!(store.load().await, SettingsSnapshot::default());
        assert!(matches!(
            store.save(&SettingsSnapshot::default()).await,
            Err(PersistError::Http(_))
        ));
    }
}
