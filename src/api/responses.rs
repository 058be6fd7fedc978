//! API response structures

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    error::{SettingsError, StoreError},
    services::MusicState,
    state::{Phase, TimerSettings, TimerStatus},
    utils::format::format_time,
};

/// Response for timer commands and timer status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerStatus,
    /// `time_remaining` as `M:SS`
    pub display: String,
}

impl TimerResponse {
    /// Create a new timer response; the status label follows the phase
    pub fn new(message: String, timer: TimerStatus) -> Self {
        let status = match timer.phase {
            Phase::Idle => "idle",
            Phase::Complete => "complete",
            _ if timer.is_paused => "paused",
            _ => "running",
        };

        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            display: format_time(timer.time_remaining),
            timer,
        }
    }
}

/// Server status with timer, settings and music
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timer: TimerStatus,
    pub settings: TimerSettings,
    pub music: MusicState,
    pub current_preset: Option<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned with non-2xx status codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn api_error(code: StatusCode, message: String) -> ApiError {
    (code, Json(ErrorResponse::new(message)))
}

pub fn settings_error(e: SettingsError) -> ApiError {
    warn!("Rejected timer settings: {}", e);
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

pub fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
        StoreError::InvalidPreset(_) => {
            warn!("Rejected preset: {}", e);
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        }
        StoreError::Io(_) | StoreError::Json(_) => {
            error!("Storage failure: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
