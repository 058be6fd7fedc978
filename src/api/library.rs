//! Preset, history and profile HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use crate::{
    services::{
        history::ProfilePatch,
        presets::{NewPreset, PresetPatch},
        UserProfile, WorkoutPreset, WorkoutRecord, WorkoutStats,
    },
    state::AppState,
};
use super::responses::{api_error, store_error, ApiResult};

/// Handle GET /presets
pub async fn list_presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<WorkoutPreset>> {
    Json(state.presets.list())
}

/// Handle POST /presets
pub async fn create_preset_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPreset>,
) -> Result<(StatusCode, Json<WorkoutPreset>), super::responses::ApiError> {
    let preset = state.presets.add(new).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(preset)))
}

/// Handle GET /presets/:id
pub async fn get_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<WorkoutPreset> {
    state
        .presets
        .get(&id)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no entry with id {}", id)))
}

/// Handle PUT /presets/:id
pub async fn update_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<PresetPatch>,
) -> ApiResult<WorkoutPreset> {
    let preset = state.presets.update(&id, patch).map_err(store_error)?;
    Ok(Json(preset))
}

/// Handle DELETE /presets/:id
pub async fn delete_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, super::responses::ApiError> {
    match state.presets.delete(&id).map_err(store_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(api_error(StatusCode::NOT_FOUND, format!("no entry with id {}", id))),
    }
}

/// Handle POST /presets/:id/favorite
pub async fn favorite_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<WorkoutPreset> {
    let preset = state.presets.toggle_favorite(&id).map_err(store_error)?;
    Ok(Json(preset))
}

/// Handle POST /presets/:id/apply - Load the preset into the timer
pub async fn apply_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<WorkoutPreset> {
    let preset = state.apply_preset(&id).map_err(store_error)?;
    info!("Apply endpoint called - preset {} loaded", preset.name);
    Ok(Json(preset))
}

/// Handle GET /history
pub async fn list_history_handler(State(state): State<Arc<AppState>>) -> Json<Vec<WorkoutRecord>> {
    Json(state.history.list())
}

/// Handle DELETE /history/:id
pub async fn delete_history_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, super::responses::ApiError> {
    match state.history.delete_workout(&id).map_err(store_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(api_error(StatusCode::NOT_FOUND, format!("no entry with id {}", id))),
    }
}

/// Handle GET /history/stats
pub async fn history_stats_handler(State(state): State<Arc<AppState>>) -> Json<WorkoutStats> {
    Json(state.history.stats())
}

/// Handle GET /profile
pub async fn get_profile_handler(State(state): State<Arc<AppState>>) -> Json<UserProfile> {
    Json(state.history.profile())
}

/// Handle PUT /profile
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<UserProfile> {
    let profile = state.history.update_profile(&patch).map_err(store_error)?;
    Ok(Json(profile))
}
