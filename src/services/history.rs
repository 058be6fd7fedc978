//! Workout history, user profile and calorie estimates

use std::path::PathBuf;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::storage::{generate_id, load_json, save_json};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

impl Intensity {
    /// Base burn rate in kcal per minute
    pub fn calories_per_minute(&self) -> f64 {
        match self {
            Intensity::Low => 5.0,
            Intensity::Medium => 8.0,
            Intensity::High => 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Kilograms
    pub weight: f64,
    /// Centimetres
    pub height: f64,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "default_age")]
    pub age: u32,
}

fn default_age() -> u32 {
    30
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight: 70.0,
            height: 175.0,
            gender: Gender::Male,
            age: default_age(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

impl UserProfile {
    pub fn merged(&self, patch: &ProfilePatch) -> Self {
        Self {
            weight: patch.weight.unwrap_or(self.weight),
            height: patch.height.unwrap_or(self.height),
            gender: patch.gender.unwrap_or(self.gender),
            age: patch.age.unwrap_or(self.age),
        }
    }

    /// Harris-Benedict BMR relative to an average adult of the same gender
    pub fn bmr_factor(&self) -> f64 {
        if self.weight <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }

        let age = f64::from(self.age);
        match self.gender {
            Gender::Male => {
                let bmr = 88.362 + 13.397 * self.weight + 4.799 * self.height - 5.677 * age;
                bmr / 1700.0
            }
            Gender::Female => {
                let bmr = 447.593 + 9.247 * self.weight + 3.098 * self.height - 4.330 * age;
                bmr / 1400.0
            }
        }
    }
}

/// Estimated kcal for a workout of `duration_seconds`
pub fn estimate_calories(duration_seconds: u64, intensity: Intensity, profile: &UserProfile) -> u32 {
    let minutes = duration_seconds as f64 / 60.0;
    let rate = intensity.calories_per_minute() * profile.bmr_factor();
    (minutes * rate).round().max(0.0) as u32
}

/// One finished workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Seconds
    pub duration: u64,
    pub rounds: u32,
    pub round_time: u64,
    pub rest_time: u64,
    pub intensity: Intensity,
    pub calories_burned: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_name: Option<String>,
}

/// A workout about to be recorded; calories are computed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub duration: u64,
    pub rounds: u32,
    pub round_time: u64,
    pub rest_time: u64,
    pub intensity: Intensity,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub preset_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_time_in_seconds: u64,
    pub total_calories_burned: u64,
    pub this_week_workouts: usize,
    pub this_week_time_in_seconds: u64,
    pub this_week_calories_burned: u64,
    pub this_month_workouts: usize,
    pub avg_workout_duration: f64,
}

/// Workout log (newest first) and the profile used for calorie estimates
#[derive(Debug)]
pub struct HistoryStore {
    dir: Option<PathBuf>,
    records: Mutex<Vec<WorkoutRecord>>,
    profile: Mutex<UserProfile>,
}

const HISTORY_FILE: &str = "workout-history.json";
const PROFILE_FILE: &str = "user-profile.json";

impl HistoryStore {
    /// Load history and profile from `dir`; unreadable files are logged and replaced by defaults
    pub fn open(dir: PathBuf) -> Self {
        let records = match load_json::<Vec<WorkoutRecord>>(&dir.join(HISTORY_FILE)) {
            Ok(records) => {
                info!("Loaded {} workouts from history", records.len());
                records
            }
            Err(e) => {
                error!("Error loading workout history: {}", e);
                Vec::new()
            }
        };

        let profile = match load_json::<Option<UserProfile>>(&dir.join(PROFILE_FILE)) {
            Ok(profile) => profile.unwrap_or_default(),
            Err(e) => {
                error!("Error loading user profile: {}", e);
                UserProfile::default()
            }
        };

        Self {
            dir: Some(dir),
            records: Mutex::new(records),
            profile: Mutex::new(profile),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            dir: None,
            records: Mutex::new(Vec::new()),
            profile: Mutex::new(UserProfile::default()),
        }
    }

    pub fn list(&self) -> Vec<WorkoutRecord> {
        self.records.lock().clone()
    }

    pub fn profile(&self) -> UserProfile {
        *self.profile.lock()
    }

    pub fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, StoreError> {
        let mut profile = self.profile.lock();
        let merged = profile.merged(patch);
        if let Some(dir) = &self.dir {
            save_json(&dir.join(PROFILE_FILE), &merged)?;
        }
        *profile = merged;
        Ok(merged)
    }

    /// Estimate with the current profile
    pub fn calculate_calories_burned(&self, duration_seconds: u64, intensity: Intensity) -> u32 {
        estimate_calories(duration_seconds, intensity, &self.profile())
    }

    pub fn add_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, StoreError> {
        let record = WorkoutRecord {
            id: generate_id(),
            date: Utc::now(),
            duration: workout.duration,
            rounds: workout.rounds,
            round_time: workout.round_time,
            rest_time: workout.rest_time,
            intensity: workout.intensity,
            calories_burned: self.calculate_calories_burned(workout.duration, workout.intensity),
            notes: workout.notes,
            preset_name: workout.preset_name,
        };

        let mut records = self.records.lock();
        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(record.clone());
        next.extend(records.iter().cloned());
        self.persist(&next)?;
        *records = next;

        info!(
            "Recorded workout: {} rounds, {}s, {} kcal",
            record.rounds, record.duration, record.calories_burned
        );
        Ok(record)
    }

    pub fn delete_workout(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock();
        let next: Vec<WorkoutRecord> = records.iter().filter(|r| r.id != id).cloned().collect();
        if next.len() == records.len() {
            return Ok(false);
        }
        self.persist(&next)?;
        *records = next;
        Ok(true)
    }

    pub fn stats(&self) -> WorkoutStats {
        self.stats_at(&Local::now())
    }

    /// Stats with week (Sunday-based) and month boundaries taken in `now`'s time zone
    pub fn stats_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> WorkoutStats {
        let records = self.records.lock();
        let tz = now.timezone();
        let today = now.date_naive();
        let week_start = today - chrono::Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

        let mut stats = WorkoutStats {
            total_workouts: records.len(),
            ..Default::default()
        };
        for record in records.iter() {
            let day = record.date.with_timezone(&tz).date_naive();
            let calories = u64::from(record.calories_burned);

            stats.total_time_in_seconds += record.duration;
            stats.total_calories_burned += calories;
            if day >= week_start {
                stats.this_week_workouts += 1;
                stats.this_week_time_in_seconds += record.duration;
                stats.this_week_calories_burned += calories;
            }
            if day >= month_start {
                stats.this_month_workouts += 1;
            }
        }
        if stats.total_workouts > 0 {
            stats.avg_workout_duration = stats.total_time_in_seconds as f64 / stats.total_workouts as f64;
        }
        stats
    }

    fn persist(&self, records: &[WorkoutRecord]) -> Result<(), StoreError> {
        match &self.dir {
            Some(dir) => save_json(&dir.join(HISTORY_FILE), records),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    fn insert_at(&self, date: DateTime<Utc>, duration: u64, calories: u32) {
        self.records.lock().push(WorkoutRecord {
            id: generate_id(),
            date,
            duration,
            rounds: 3,
            round_time: 180,
            rest_time: 60,
            intensity: Intensity::Medium,
            calories_burned: calories,
            notes: None,
            preset_name: None,
        });
    }
}
