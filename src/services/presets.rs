//! Workout preset store

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{
    sound::{MusicPatch, MusicSource},
    storage::{generate_id, load_json, save_json},
};
use crate::{
    error::StoreError,
    state::{SettingsPatch, TimerSettings},
};

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Shadow Boxing",
    "Heavy Bag",
    "Speed Bag",
    "Cardio",
    "Abs Workout",
    "Strength Training",
    "Footwork",
    "Custom",
];

/// Saved round/rest configuration with optional music
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPreset {
    pub id: String,
    pub name: String,
    pub category: String,
    pub total_rounds: u32,
    pub round_time: u64,
    pub rest_time: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub music_enabled: bool,
    #[serde(default)]
    pub music_source: MusicSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
}

impl WorkoutPreset {
    /// Engine settings for this preset; get-ready time is not part of a preset
    pub fn settings_patch(&self) -> SettingsPatch {
        SettingsPatch {
            total_rounds: Some(self.total_rounds),
            round_time: Some(self.round_time),
            rest_time: Some(self.rest_time),
            get_ready_time: None,
        }
    }

    pub fn music_patch(&self) -> MusicPatch {
        MusicPatch {
            enabled: Some(self.music_enabled),
            source: Some(self.music_source),
            url: self.music_url.clone(),
        }
    }

    fn validate(&self) -> Result<(), StoreError> {
        TimerSettings::new(self.total_rounds, self.round_time, self.rest_time, 0).validate()?;
        Ok(())
    }
}

/// Fields supplied when creating a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreset {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub total_rounds: u32,
    pub round_time: u64,
    pub rest_time: u64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub music_enabled: bool,
    #[serde(default)]
    pub music_source: MusicSource,
    #[serde(default)]
    pub music_url: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORIES[0].to_string()
}

/// Partial preset update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub total_rounds: Option<u32>,
    pub round_time: Option<u64>,
    pub rest_time: Option<u64>,
    pub is_favorite: Option<bool>,
    pub music_enabled: Option<bool>,
    pub music_source: Option<MusicSource>,
    pub music_url: Option<String>,
}

/// Presets in insertion order, persisted as one JSON array
#[derive(Debug)]
pub struct PresetStore {
    path: Option<PathBuf>,
    presets: Mutex<Vec<WorkoutPreset>>,
}

impl PresetStore {
    /// Load presets from `path`. An unreadable file is logged and treated as empty.
    pub fn open(path: PathBuf) -> Self {
        let presets = match load_json::<Vec<WorkoutPreset>>(&path) {
            Ok(presets) => {
                info!("Loaded {} presets from {}", presets.len(), path.display());
                presets
            }
            Err(e) => {
                error!("Error loading presets from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self {
            path: Some(path),
            presets: Mutex::new(presets),
        }
    }

    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            presets: Mutex::new(Vec::new()),
        }
    }

    pub fn list(&self) -> Vec<WorkoutPreset> {
        self.presets.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<WorkoutPreset> {
        self.presets.lock().iter().find(|p| p.id == id).cloned()
    }

    pub fn add(&self, new: NewPreset) -> Result<WorkoutPreset, StoreError> {
        let now = Utc::now();
        let preset = WorkoutPreset {
            id: generate_id(),
            name: new.name,
            category: new.category,
            total_rounds: new.total_rounds,
            round_time: new.round_time,
            rest_time: new.rest_time,
            created_at: now,
            updated_at: now,
            is_favorite: new.is_favorite,
            music_enabled: new.music_enabled,
            music_source: new.music_source,
            music_url: new.music_url,
        };
        preset.validate()?;

        let mut presets = self.presets.lock();
        let mut next = presets.clone();
        next.push(preset.clone());
        self.persist(&next)?;
        *presets = next;

        info!("Added preset {} ({})", preset.name, preset.id);
        Ok(preset)
    }

    pub fn update(&self, id: &str, patch: PresetPatch) -> Result<WorkoutPreset, StoreError> {
        self.modify(id, |preset| {
            if let Some(name) = patch.name {
                preset.name = name;
            }
            if let Some(category) = patch.category {
                preset.category = category;
            }
            if let Some(total_rounds) = patch.total_rounds {
                preset.total_rounds = total_rounds;
            }
            if let Some(round_time) = patch.round_time {
                preset.round_time = round_time;
            }
            if let Some(rest_time) = patch.rest_time {
                preset.rest_time = rest_time;
            }
            if let Some(is_favorite) = patch.is_favorite {
                preset.is_favorite = is_favorite;
            }
            if let Some(music_enabled) = patch.music_enabled {
                preset.music_enabled = music_enabled;
            }
            if let Some(music_source) = patch.music_source {
                preset.music_source = music_source;
            }
            if let Some(music_url) = patch.music_url {
                preset.music_url = Some(music_url);
            }
        })
    }

    /// Remove a preset; returns whether it existed
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut presets = self.presets.lock();
        let next: Vec<WorkoutPreset> = presets.iter().filter(|p| p.id != id).cloned().collect();
        if next.len() == presets.len() {
            return Ok(false);
        }

        self.persist(&next)?;
        *presets = next;
        info!("Deleted preset {}", id);
        Ok(true)
    }

    pub fn toggle_favorite(&self, id: &str) -> Result<WorkoutPreset, StoreError> {
        self.modify(id, |preset| preset.is_favorite = !preset.is_favorite)
    }

    /// Edit one preset under a single lock; memory only changes once the write succeeds
    fn modify<F>(&self, id: &str, edit: F) -> Result<WorkoutPreset, StoreError>
    where
        F: FnOnce(&mut WorkoutPreset),
    {
        let mut presets = self.presets.lock();
        let index = presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut updated = presets[index].clone();
        edit(&mut updated);
        updated.validate()?;
        updated.updated_at = Utc::now();

        let mut next = presets.clone();
        next[index] = updated.clone();
        self.persist(&next)?;
        *presets = next;
        Ok(updated)
    }

    fn persist(&self, presets: &[WorkoutPreset]) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_json(path, presets),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_preset(name: &str) -> NewPreset {
        NewPreset {
            name: name.to_string(),
            category: "Heavy Bag".to_string(),
            total_rounds: 6,
            round_time: 120,
            rest_time: 30,
            is_favorite: false,
            music_enabled: false,
            music_source: MusicSource::Local,
            music_url: None,
        }
    }

    #[test]
    fn crud_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");

        let store = PresetStore::open(path.clone());
        let preset = store.add(new_preset("Bag day")).unwrap();
        assert_eq!(store.list().len(), 1);

        let updated = store
            .update(
                &preset.id,
                PresetPatch {
                    round_time: Some(150),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.round_time, 150);
        assert!(updated.updated_at >= preset.updated_at);
        assert_eq!(updated.created_at, preset.created_at);

        let reopened = PresetStore::open(path);
        assert_eq!(reopened.get(&preset.id).unwrap().round_time, 150);

        assert!(reopened.delete(&preset.id).unwrap());
        assert!(!reopened.delete(&preset.id).unwrap());
        assert!(reopened.list().is_empty());
    }

    #[test]
    fn toggling_favorite_flips_the_flag() {
        let store = PresetStore::in_memory();
        let preset = store.add(new_preset("Sprint")).unwrap();
        assert!(store.toggle_favorite(&preset.id).unwrap().is_favorite);
        assert!(!store.toggle_favorite(&preset.id).unwrap().is_favorite);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let store = PresetStore::in_memory();
        assert!(matches!(
            store.update("nope", PresetPatch::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.toggle_favorite("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn invalid_durations_are_rejected() {
        let store = PresetStore::in_memory();
        let mut bad = new_preset("Broken");
        bad.total_rounds = 0;
        assert!(matches!(store.add(bad), Err(StoreError::InvalidPreset(_))));

        let preset = store.add(new_preset("Fine")).unwrap();
        let result = store.update(
            &preset.id,
            PresetPatch {
                round_time: Some(0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::InvalidPreset(_))));
        assert_eq!(store.get(&preset.id).unwrap().round_time, 120);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, "[{\"broken\":").unwrap();
        assert!(PresetStore::open(path).list().is_empty());
    }

    #[test]
    fn preset_maps_to_engine_settings() {
        let store = PresetStore::in_memory();
        let preset = store.add(new_preset("Bag day")).unwrap();
        let settings = TimerSettings::default().merged(&preset.settings_patch());
        assert_eq!(settings, TimerSettings::new(6, 120, 30, 10));
    }

    #[test]
    fn new_preset_defaults_category() {
        let new: NewPreset =
            serde_json::from_str(r#"{"name":"Quick","totalRounds":2,"roundTime":60,"restTime":20}"#).unwrap();
        assert_eq!(new.category, "Shadow Boxing");
        assert!(!new.music_enabled);
    }

    #[test]
    fn failed_write_leaves_presets_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = PresetStore::open(blocker.join("presets.json"));
        assert!(matches!(store.add(new_preset("Lost")), Err(StoreError::Io(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn failed_update_and_delete_keep_the_saved_preset() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let store = PresetStore::open(data.join("presets.json"));
        let preset = store.add(new_preset("Kept")).unwrap();

        // Turn the data directory into a file so every later write fails
        std::fs::remove_dir_all(&data).unwrap();
        std::fs::write(&data, "").unwrap();

        let patch = PresetPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(store.update(&preset.id, patch).is_err());
        assert!(store.toggle_favorite(&preset.id).is_err());
        assert!(store.delete(&preset.id).is_err());

        assert_eq!(store.list(), vec![preset]);
    }

    #[test]
    fn concurrent_toggles_are_not_lost() {
        let store = PresetStore::in_memory();
        let preset = store.add(new_preset("Busy")).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        store.toggle_favorite(&preset.id).unwrap();
                    }
                });
            }
        });

        // 100 flips end where they started
        assert!(!store.get(&preset.id).unwrap().is_favorite);
    }
}
