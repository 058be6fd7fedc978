//! Collaborator services module
//! 
//! This module contains the sound notifier and the JSON-backed preset and
//! workout history stores that sit around the countdown engine.

pub mod history;
pub mod presets;
pub mod sound;
pub mod storage;

// Re-export main types
pub use history::{HistoryStore, Intensity, UserProfile, WorkoutRecord, WorkoutStats};
pub use presets::{PresetStore, WorkoutPreset};
pub use sound::{AudioPlayer, CommandPlayer, MusicState, SilentPlayer, SoundNotifier, SoundService};
