//! Timer settings and partial updates

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Durations and round count for one workout session.
///
/// All durations are whole seconds. Settings are copied into the engine on
/// `start()`, so changing them never affects a session that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub total_rounds: u32,
    pub round_time: u64,
    pub rest_time: u64,
    pub get_ready_time: u64,
}

impl TimerSettings {
    pub fn new(total_rounds: u32, round_time: u64, rest_time: u64, get_ready_time: u64) -> Self {
        Self {
            total_rounds,
            round_time,
            rest_time,
            get_ready_time,
        }
    }

    /// Check the invariants a session depends on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.total_rounds == 0 {
            return Err(SettingsError::ZeroRounds);
        }
        if self.round_time == 0 {
            return Err(SettingsError::ZeroRoundTime);
        }
        Ok(())
    }

    /// Return a copy with every field present in `patch` replaced
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            total_rounds: patch.total_rounds.unwrap_or(self.total_rounds),
            round_time: patch.round_time.unwrap_or(self.round_time),
            rest_time: patch.rest_time.unwrap_or(self.rest_time),
            get_ready_time: patch.get_ready_time.unwrap_or(self.get_ready_time),
        }
    }

    /// Planned session length, ignoring pauses and scheduler starvation
    pub fn planned_duration(&self) -> u64 {
        let rounds = u64::from(self.total_rounds);
        self.get_ready_time
            .saturating_add(rounds.saturating_mul(self.round_time))
            .saturating_add(rounds.saturating_sub(1).saturating_mul(self.rest_time))
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            round_time: 180,
            rest_time: 60,
            get_ready_time: 10,
        }
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_ready_time: Option<u64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.total_rounds.is_none()
            && self.round_time.is_none()
            && self.rest_time.is_none()
            && self.get_ready_time.is_none()
    }
}

impl From<TimerSettings> for SettingsPatch {
    fn from(settings: TimerSettings) -> Self {
        Self {
            total_rounds: Some(settings.total_rounds),
            round_time: Some(settings.round_time),
            rest_time: Some(settings.rest_time),
            get_ready_time: Some(settings.get_ready_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_three_round_workout() {
        let settings = TimerSettings::default();
        assert_eq!(settings, TimerSettings::new(3, 180, 60, 10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_zero_rounds_and_zero_round_time() {
        assert_eq!(
            TimerSettings::new(0, 180, 60, 10).validate(),
            Err(SettingsError::ZeroRounds)
        );
        assert_eq!(
            TimerSettings::new(3, 0, 60, 10).validate(),
            Err(SettingsError::ZeroRoundTime)
        );
        // Zero rest and zero get-ready are allowed
        assert!(TimerSettings::new(1, 5, 0, 0).validate().is_ok());
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let patch = SettingsPatch {
            round_time: Some(120),
            ..Default::default()
        };
        let merged = TimerSettings::default().merged(&patch);
        assert_eq!(merged, TimerSettings::new(3, 120, 60, 10));
        assert!(SettingsPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn planned_duration_skips_trailing_rest() {
        // 10 + 3 * 180 + 2 * 60
        assert_eq!(TimerSettings::default().planned_duration(), 670);
        assert_eq!(TimerSettings::new(1, 5, 10, 0).planned_duration(), 5);
        assert_eq!(TimerSettings::new(u32::MAX, u64::MAX, 60, 10).planned_duration(), u64::MAX);
    }

    #[test]
    fn patch_deserializes_from_camel_case() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"totalRounds":5,"getReadyTime":0}"#).unwrap();
        assert_eq!(patch.total_rounds, Some(5));
        assert_eq!(patch.get_ready_time, Some(0));
        assert_eq!(patch.round_time, None);
    }
}
