//! Shadowbox Timer - A round timer for shadow-boxing workouts
//! 
//! This library provides the drift-corrected countdown engine, bell and
//! music cues, workout presets and history, and the HTTP API that drives them.

pub mod config;
pub mod error;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CountdownEngine, TickScheduler};
pub use state::{AppState, Phase, TimerSettings, TimerStatus};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
