use crate::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use shared::models::{EffectiveSettings, SettingsModel, SettingsSnapshot};

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsSnapshot> {
    Json(state.store.load().await)
}

pub async fn effective_settings(State(state): State<AppState>) -> Json<EffectiveSettings> {
    let model = SettingsModel::from_snapshot(state.store.load().await);
    Json(model.effective())
}

pub async fn save_settings(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<SettingsSnapshot>, StatusCode> {
    // Out-of-range numbers (negative ones included) are clamped, not rejected.
    let snapshot = SettingsModel::from_complete(&payload)
        .map_err(|e| {
            tracing::warn!("Rejected settings payload: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        })?
        .to_snapshot();

    state.store.save(&snapshot).await.map_err(|e| {
        tracing::error!("Failed to save settings: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("Saved settings to {}", state.store.describe());
    Ok(Json(snapshot))
}

pub async fn reset_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsSnapshot>, StatusCode> {
    let snapshot = SettingsModel::new().to_snapshot();

    state.store.save(&snapshot).await.map_err(|e| {
        tracing::error!("Failed to reset settings: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("Reset settings in {}", state.store.describe());
    Ok(Json(snapshot))
}
