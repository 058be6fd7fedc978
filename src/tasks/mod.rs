//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod sound_cues;
pub mod tick_loop;
pub mod workout_recorder;

// Re-export main functions
pub use sound_cues::{sound_cues_task, spawn_sound_cues};
pub use tick_loop::tick_loop_task;
pub use workout_recorder::{spawn_workout_recorder, workout_recorder_task};
