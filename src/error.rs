//! Error types shared across the crate

use thiserror::Error;

/// Rejected timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("total rounds must be at least 1")]
    ZeroRounds,

    #[error("round time must be greater than zero seconds")]
    ZeroRoundTime,
}

/// Failures while triggering bell or music playback
#[derive(Debug, Error)]
pub enum SoundError {
    #[error("failed to spawn player `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("player exited unsuccessfully: {0}")]
    PlayerFailed(String),

    #[error("player command is empty")]
    EmptyCommand,
}

/// Failures in the JSON-backed preset and history stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no entry with id {0}")]
    NotFound(String),

    #[error("invalid preset: {0}")]
    InvalidPreset(#[from] SettingsError),
}
