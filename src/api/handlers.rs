//! Timer, music and server HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use tracing::info;

use crate::{
    services::{sound::MusicPatch, MusicState},
    state::{AppState, SettingsPatch, TimerSettings},
};
use super::responses::{
    settings_error, ApiResult, HealthResponse, StatusResponse, TimerResponse,
};

/// Handle POST /timer/start - Start a new session
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let was_running = state.timer_status().is_ticking();
    let timer = state.start_timer().map_err(settings_error)?;

    let message = if was_running {
        "Timer already running".to_string()
    } else {
        info!("Start endpoint called - session started");
        "Session started".to_string()
    };
    Ok(Json(TimerResponse::new(message, timer)))
}

/// Handle POST /timer/pause - Pause or resume the running session
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let timer = state.toggle_pause();

    let message = if !timer.is_running {
        "No session running".to_string()
    } else if timer.is_paused {
        "Timer paused".to_string()
    } else {
        "Timer resumed".to_string()
    };
    Ok(Json(TimerResponse::new(message, timer)))
}

/// Handle POST /timer/reset - Cancel the session and return to idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let timer = state.reset_timer();
    info!("Reset endpoint called - timer idle");
    Ok(Json(TimerResponse::new("Timer reset".to_string(), timer)))
}

/// Handle GET /timer/status - Current timer snapshot
pub async fn timer_status_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let timer = state.timer_status();
    Ok(Json(TimerResponse::new(timer.phase.to_string(), timer)))
}

/// Handle GET /timer/settings - Settings for the next session
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<TimerSettings> {
    Json(state.settings())
}

/// Handle PUT /timer/settings - Merge a partial settings update
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<TimerSettings> {
    let settings = state.update_settings(&patch).map_err(settings_error)?;
    info!("Settings endpoint called - {:?}", settings);
    Ok(Json(settings))
}

/// Handle GET /music - Current music settings
pub async fn get_music_handler(State(state): State<Arc<AppState>>) -> Json<MusicState> {
    Json(state.sound.music_state())
}

/// Handle PUT /music - Merge a partial music update
pub async fn update_music_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<MusicPatch>,
) -> Json<MusicState> {
    Json(state.sound.update_music(&patch))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer_status(),
        settings: state.settings(),
        music: state.sound.music_state(),
        current_preset: state.current_preset.lock().clone(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
