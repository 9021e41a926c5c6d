use crate::stores::{PersistError, PersistResult, SettingsStore, parse_payload};
use async_trait::async_trait;
use shared::models::SettingsSnapshot;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Settings kept as a JSON document on local disk.
///
/// Each save writes its own uniquely named temp file next to the target and
/// renames it into place, so a reader never sees a half-written document,
/// even when several stores (or processes) share the path.
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_PATH)
    }
}

fn write_replace(dir: &Path, target: &Path, content: &[u8]) -> PersistResult<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(".settings-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    // On failure the temp file is removed when the handle drops.
    temp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn read(&self) -> PersistResult<Option<SettingsSnapshot>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_payload(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> PersistResult<()> {
        let _guard = self.write_lock.lock().await;

        let dir = self.dir();
        tokio::fs::create_dir_all(&dir).await?;

        let content = serde_json::to_string_pretty(snapshot)?;
        let target = self.path.clone();
        tokio::task::spawn_blocking(move || write_replace(&dir, &target, content.as_bytes()))
            .await
            .map_err(|e| PersistError::Io(std::io::Error::other(e)))??;

        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn edited() -> SettingsSnapshot {
        SettingsSnapshot {
            temperature: 1.2,
            top_p: 0.5,
            ai_search_enabled: true,
            data_response_limit_enabled: true,
            top_k: 30,
            strictness: 4,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        assert!(store.read().await.unwrap().is_none());
        assert_eq!(store.load().await, SettingsSnapshot::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested/settings.json"));
        store.save(&edited()).await.unwrap();
        assert_eq!(store.load().await, edited());
    }

    #[tokio::test]
    async fn saved_document_uses_wire_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        store.save(&SettingsSnapshot::default()).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        for key in ["topP", "aiSearchEnabled", "dataResponseLimitEnabled", "topK"] {
            assert!(text.contains(key), "{key} missing from {text}");
        }
    }

    #[tokio::test]
    async fn garbage_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json at all").unwrap();
        let store = FileSettingsStore::new(&path);
        assert!(matches!(store.read().await, Err(PersistError::Malformed(_))));
        assert_eq!(store.load().await, SettingsSnapshot::default());
    }

    #[tokio::test]
    async fn partial_file_fills_defaults_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"aiSearchEnabled": true, "topK": "ten"}"#).unwrap();
        let snapshot = FileSettingsStore::new(&path).load().await;
        assert!(snapshot.ai_search_enabled);
        assert_eq!(snapshot.top_k, 5);
    }

    #[tokio::test]
    async fn out_of_range_number_loads_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"temperature": 1e400, "topK": 20}"#).unwrap();
        let store = FileSettingsStore::new(&path);
        assert!(matches!(store.read().await, Err(PersistError::Malformed(_))));
        assert_eq!(store.load().await, SettingsSnapshot::default());
    }

    #[tokio::test]
    async fn failed_save_leaves_target_and_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("settings.json");
        // A non-empty directory on the target path makes the rename fail.
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "previous").unwrap();

        let store = FileSettingsStore::new(&target);
        assert!(matches!(
            store.save(&edited()).await,
            Err(PersistError::Io(_))
        ));
        assert_eq!(
            std::fs::read_to_string(target.join("keep")).unwrap(),
            "previous"
        );
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("settings.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stores_sharing_a_path_never_tear_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let first = Arc::new(FileSettingsStore::new(&path));
        let second = Arc::new(FileSettingsStore::new(&path));
        let reader = FileSettingsStore::new(&path);
        first.save(&SettingsSnapshot::default()).await.unwrap();

        let writer = |store: Arc<FileSettingsStore>, snapshot: SettingsSnapshot| {
            tokio::spawn(async move {
                let mut errors = 0;
                for _ in 0..100 {
                    if store.save(&snapshot).await.is_err() {
                        errors += 1;
                    }
                }
                errors
            })
        };
        let a = writer(first, SettingsSnapshot::default());
        let b = writer(second, edited());

        for _ in 0..300 {
            let seen = reader.read().await.unwrap().unwrap();
            assert!(
                seen == SettingsSnapshot::default() || seen == edited(),
                "saw a mixed snapshot: {seen:?}"
            );
            tokio::task::yield_now().await;
        }

        assert_eq!(a.await.unwrap(), 0);
        assert_eq!(b.await.unwrap(), 0);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
