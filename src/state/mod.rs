//! State management module
//! 
//! This module contains the timer data model and the application state that owns it.

pub mod settings;
pub mod status;
pub mod app_state;

// Re-export main types
pub use settings::{SettingsPatch, TimerSettings};
pub use status::{Phase, TimerStatus};
pub use app_state::AppState;
