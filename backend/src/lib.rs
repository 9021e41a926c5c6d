mod handlers;
pub mod stores;

use crate::handlers::{effective_settings, get_settings, reset_settings, save_settings};
use crate::stores::SettingsStore;
use crate::stores::remote::{SAVE_SETTINGS_PATH, SETTINGS_PATH};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SettingsStore>,
}

pub fn init(router: Router<AppState>, store: Arc<dyn SettingsStore>) -> Router<()> {
    let state = AppState { store };

    router
        .route("/api/health", get(|| async { "OK" }))
        .route(SETTINGS_PATH, get(get_settings))
        .route("/api/settings/effective", get(effective_settings))
        .route(SAVE_SETTINGS_PATH, post(save_settings))
        .route("/api/reset-settings", post(reset_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
