//! Main application state management

use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    engine::{CountdownEngine, TickScheduler},
    error::{SettingsError, StoreError},
    services::{
        history::NewWorkout, HistoryStore, Intensity, PresetStore, SoundService, WorkoutPreset,
        WorkoutRecord,
    },
    utils::format::format_long_duration,
};

use super::{SettingsPatch, TimerSettings, TimerStatus};

/// Everything the HTTP layer and background tasks share.
///
/// Constructed once in `main` and handed around as `Arc<AppState>`; there is
/// no global engine.
#[derive(Debug)]
pub struct AppState {
    /// Countdown engine and its tick loop
    pub timer: TickScheduler,
    pub sound: Arc<SoundService>,
    pub presets: PresetStore,
    pub history: HistoryStore,
    /// Intensity recorded for completed sessions
    pub intensity: Intensity,
    /// Name of the preset whose settings are loaded, if any
    pub current_preset: Mutex<Option<String>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        settings: TimerSettings,
        sound: SoundService,
        presets: PresetStore,
        history: HistoryStore,
    ) -> Result<Self, SettingsError> {
        let engine = Arc::new(CountdownEngine::new(settings)?);

        Ok(Self {
            timer: TickScheduler::new(engine),
            sound: Arc::new(sound),
            presets,
            history,
            intensity: Intensity::default(),
            current_preset: Mutex::new(None),
            start_time: Instant::now(),
            port: 0,
            host: String::new(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        })
    }

    /// Silent sound and in-memory stores
    pub fn in_memory(settings: TimerSettings) -> Result<Self, SettingsError> {
        Self::new(
            settings,
            SoundService::silent(),
            PresetStore::in_memory(),
            HistoryStore::in_memory(),
        )
    }

    pub fn with_server(mut self, host: String, port: u16) -> Self {
        self.host = host;
        self.port = port;
        self
    }

    pub fn with_intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn engine(&self) -> &Arc<CountdownEngine> {
        self.timer.engine()
    }

    pub fn timer_status(&self) -> TimerStatus {
        self.engine().status()
    }

    pub fn settings(&self) -> TimerSettings {
        self.engine().settings()
    }

    pub fn start_timer(&self) -> Result<TimerStatus, SettingsError> {
        let status = self.timer.start()?;
        self.record_action("start");
        Ok(status)
    }

    pub fn toggle_pause(&self) -> TimerStatus {
        let status = self.timer.toggle_pause();
        self.record_action(if status.is_paused { "pause" } else { "resume" });
        status
    }

    pub fn reset_timer(&self) -> TimerStatus {
        let status = self.timer.reset();
        self.record_action("reset");
        status
    }

    /// Manual settings change; the loaded preset no longer describes them
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<TimerSettings, SettingsError> {
        let settings = self.engine().update_settings(patch)?;
        *self.current_preset.lock() = None;
        self.record_action("settings");
        Ok(settings)
    }

    /// Load a preset's rounds, durations and music into the timer
    pub fn apply_preset(&self, id: &str) -> Result<WorkoutPreset, StoreError> {
        let preset = self
            .presets
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.engine().update_settings(&preset.settings_patch())?;
        self.sound.update_music(&preset.music_patch());
        *self.current_preset.lock() = Some(preset.name.clone());

        info!("Applied preset {}", preset.name);
        self.record_action("apply-preset");
        Ok(preset)
    }

    /// Log a finished session to history
    pub fn record_completed_workout(&self, status: &TimerStatus) -> Result<WorkoutRecord, StoreError> {
        let settings = self.engine().session_settings();
        let workout = NewWorkout {
            duration: status.total_elapsed_time,
            rounds: settings.total_rounds,
            round_time: settings.round_time,
            rest_time: settings.rest_time,
            intensity: self.intensity,
            notes: None,
            preset_name: self.current_preset.lock().clone(),
        };
        self.history.add_workout(workout)
    }

    fn record_action(&self, action: &str) {
        *self.last_action.lock() = Some(action.to_string());
        *self.last_action_time.lock() = Some(Utc::now());
    }

    /// Server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_long_duration(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        (self.last_action.lock().clone(), *self.last_action_time.lock())
    }

    /// Stop ticking before the process exits
    pub fn shutdown(&self) {
        if self.timer_status().is_running {
            warn!("Shutting down with a session in progress");
        }
        self.timer.cancel();
    }
}
