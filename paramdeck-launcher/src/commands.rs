use crate::cli::SetArgs;
use axum::Router;
use backend::AppState;
use backend::stores::SettingsStore;
use shared::models::{SettingField, SettingsModel};
use std::error::Error;
use std::fmt::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

type CommandResult<T> = Result<T, Box<dyn Error>>;

pub async fn serve(
    store: Arc<dyn SettingsStore>,
    host: IpAddr,
    port: u16,
    dist_dir: Option<PathBuf>,
) -> CommandResult<()> {
    let mut router: Router<AppState> = Router::new();
    if let Some(dist_dir) = dist_dir {
        tracing::info!("Serving static files from {}", dist_dir.display());
        router = router.fallback_service(ServeDir::new(dist_dir));
    }

    let addr = SocketAddr::new(host, port);
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, backend::init(router, store)).await?;
    Ok(())
}

pub async fn show(store: &dyn SettingsStore, json: bool) -> CommandResult<String> {
    let model = SettingsModel::from_snapshot(store.load().await);
    if json {
        return Ok(format!(
            "{}\n",
            serde_json::to_string_pretty(&model.to_snapshot())?
        ));
    }
    Ok(render(&model))
}

/// Applies every requested edit, then saves once. A value that can't be
/// parsed aborts the command before anything is written.
pub async fn set(store: &dyn SettingsStore, args: &SetArgs) -> CommandResult<String> {
    let edits = args.edits();
    if edits.is_empty() {
        return Err("nothing to set; pass at least one setting flag".into());
    }

    let mut model = SettingsModel::from_snapshot(store.load().await);
    for (field, raw) in edits {
        model.apply_input(field, raw)?;
    }

    store.save(&model.to_snapshot()).await?;
    tracing::info!("Settings saved to {}", store.describe());
    Ok(render(&model))
}

pub async fn reset(store: &dyn SettingsStore) -> CommandResult<String> {
    let mut model = SettingsModel::from_snapshot(store.load().await);
    model.reset();
    store.save(&model.to_snapshot()).await?;
    tracing::info!("Settings reset in {}", store.describe());
    Ok(render(&model))
}

fn render(model: &SettingsModel) -> String {
    let mut out = String::new();
    for field in SettingField::ALL {
        let state = if model.is_active(field) { "" } else { "(inactive)" };
        let line = format!(
            "{:<26}{:<8}{}",
            field.key(),
            model.display_value(field),
            state
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::stores::FileSettingsStore;
    use shared::models::SettingsSnapshot;

    fn store_in(dir: &tempfile::TempDir) -> FileSettingsStore {
        FileSettingsStore::new(dir.path().join("settings.json"))
    }

    #[tokio::test]
    async fn show_marks_inactive_fields() {
        let dir = tempfile::tempdir().unwrap();
        let out = show(&store_in(&dir), false).await.unwrap();
        assert!(out.contains("temperature               0.70"));
        assert!(out.contains("topK                      5       (inactive)"));
        assert!(!out.lines().next().unwrap().contains("inactive"));
    }

    #[tokio::test]
    async fn show_json_prints_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let out = show(&store_in(&dir), true).await.unwrap();
        let snapshot: SettingsSnapshot = serde_json::from_str(&out).unwrap();
        assert_eq!(snapshot, SettingsSnapshot::default());
    }

    #[tokio::test]
    async fn set_clamps_and_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let args = SetArgs {
            ai_search: Some("on".to_string()),
            top_k: Some("999".to_string()),
            temperature: Some("-1".to_string()),
            ..Default::default()
        };

        let out = set(&store, &args).await.unwrap();
        assert!(out.contains("strictness                1       (inactive)"));

        let saved = store.load().await;
        assert!(saved.ai_search_enabled);
        assert_eq!(saved.top_k, 50);
        assert_eq!(saved.temperature, 0.0);
    }

    #[tokio::test]
    async fn set_with_bad_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let args = SetArgs {
            top_p: Some("0.5".to_string()),
            strictness: Some("very".to_string()),
            ..Default::default()
        };

        assert!(set(&store, &args).await.is_err());
        assert!(store.read().await.unwrap().is_none());
        assert!(set(&store, &SetArgs::default()).await.is_err());
    }

    #[tokio::test]
    async fn reset_saves_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut model = SettingsModel::new();
        model.set_top_p(0.3);
        store.save(&model.to_snapshot()).await.unwrap();

        reset(&store).await.unwrap();
        assert_eq!(store.load().await, SettingsSnapshot::default());
    }
}
