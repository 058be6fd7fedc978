//! Timer phase and status snapshot

use serde::{Deserialize, Serialize};

/// Stage of a workout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    GettingReady,
    Round,
    Rest,
    Complete,
}

impl Phase {
    /// Whether the countdown runs in this phase
    pub fn is_counting(&self) -> bool {
        matches!(self, Phase::GettingReady | Phase::Round | Phase::Rest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::GettingReady => "getting ready",
            Phase::Round => "round",
            Phase::Rest => "rest",
            Phase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the engine, replaced as a whole on every change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub phase: Phase,
    pub current_round: u32,
    /// Seconds left in the current phase
    pub time_remaining: u64,
    pub is_running: bool,
    pub is_paused: bool,
    /// Wall-clock session length, only set once the session completes
    pub total_elapsed_time: u64,
}

impl TimerStatus {
    /// The resting snapshot before any session and after `reset()`
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            current_round: 1,
            time_remaining: 0,
            is_running: false,
            is_paused: false,
            total_elapsed_time: 0,
        }
    }

    /// True while a session is counting down (paused or not)
    pub fn is_active(&self) -> bool {
        self.is_running && self.phase.is_counting()
    }

    /// True while the countdown is actually advancing
    pub fn is_ticking(&self) -> bool {
        self.is_active() && !self.is_paused
    }
}

impl Default for TimerStatus {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_is_the_reset_state() {
        let status = TimerStatus::default();
        assert_eq!(status.phase, Phase::Idle);
        assert_eq!(status.current_round, 1);
        assert_eq!(status.time_remaining, 0);
        assert!(!status.is_running);
        assert!(!status.is_paused);
        assert!(!status.is_active());
    }

    #[test]
    fn phases_serialize_in_camel_case() {
        assert_eq!(serde_json::to_string(&Phase::GettingReady).unwrap(), "\"gettingReady\"");
        let json = serde_json::to_value(TimerStatus::idle()).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["timeRemaining"], 0);
        assert_eq!(json["totalElapsedTime"], 0);
    }

    #[test]
    fn only_countdown_phases_count() {
        assert!(Phase::Round.is_counting());
        assert!(Phase::Rest.is_counting());
        assert!(Phase::GettingReady.is_counting());
        assert!(!Phase::Idle.is_counting());
        assert!(!Phase::Complete.is_counting());
    }
}
