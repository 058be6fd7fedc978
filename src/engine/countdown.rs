//! Drift-corrected, pausable multi-phase countdown

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{
    clock::{Clock, SystemClock},
    events::{BellCue, BellReason, StatusSubscription},
};
use crate::{
    error::SettingsError,
    state::{Phase, SettingsPatch, TimerSettings, TimerStatus},
};

/// Ticks closer together than this are ignored outright
pub const TICK_DEBOUNCE: Duration = Duration::from_millis(250);

/// Seconds remaining at which the warning bell rings
pub const WARNING_AT_SECONDS: u64 = 10;

const STATUS_CHANNEL_CAPACITY: usize = 256;
const BELL_CHANNEL_CAPACITY: usize = 64;

/// Identifies one session; bumped on every `start()` and `reset()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

/// Result of one scheduler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token belongs to a session that was reset or replaced
    Stale,
    /// The session is over; the scheduler loop should stop
    Finished,
    /// Paused, or less than a whole second has elapsed
    Unchanged,
    /// At least one second was consumed and a new snapshot published
    Advanced,
}

#[derive(Debug)]
struct Inner {
    /// Settings for the next session
    settings: TimerSettings,
    /// Settings frozen at `start()` for the running session
    active: TimerSettings,
    status: TimerStatus,
    session: u64,
    session_started: Duration,
    /// Reference instant; only ever advanced by whole seconds
    last_tick: Duration,
    /// Sub-second progress carried across a pause
    paused_remainder: Duration,
    warning_sounded: bool,
}

/// Round/rest countdown engine.
///
/// Commands are synchronous. Every change replaces the whole [`TimerStatus`]
/// and is published to subscribers while the state lock is held, so
/// subscribers see snapshots in exactly the order they were produced.
/// Bell cues are published alongside; playing them is someone else's job.
#[derive(Debug)]
pub struct CountdownEngine<C: Clock = SystemClock> {
    clock: C,
    inner: Mutex<Inner>,
    status_tx: broadcast::Sender<TimerStatus>,
    bell_tx: broadcast::Sender<BellCue>,
}

impl CountdownEngine<SystemClock> {
    /// Engine on the system clock with the given settings
    pub fn new(settings: TimerSettings) -> Result<Self, SettingsError> {
        Self::with_clock(settings, SystemClock::new())
    }
}

impl<C: Clock> CountdownEngine<C> {
    pub fn with_clock(settings: TimerSettings, clock: C) -> Result<Self, SettingsError> {
        settings.validate()?;

        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        let (bell_tx, _) = broadcast::channel(BELL_CHANNEL_CAPACITY);

        Ok(Self {
            clock,
            inner: Mutex::new(Inner {
                settings,
                active: settings,
                status: TimerStatus::idle(),
                session: 0,
                session_started: Duration::ZERO,
                last_tick: Duration::ZERO,
                paused_remainder: Duration::ZERO,
                warning_sounded: false,
            }),
            status_tx,
            bell_tx,
        })
    }

    /// Settings the next `start()` will use
    pub fn settings(&self) -> TimerSettings {
        self.inner.lock().settings
    }

    /// Settings frozen for the current or most recent session
    pub fn session_settings(&self) -> TimerSettings {
        self.inner.lock().active
    }

    /// Current status snapshot
    pub fn status(&self) -> TimerStatus {
        self.inner.lock().status
    }

    pub fn session(&self) -> SessionToken {
        SessionToken(self.inner.lock().session)
    }

    /// Subscribe to the current snapshot and all later ones
    pub fn subscribe(&self) -> StatusSubscription {
        let inner = self.inner.lock();
        StatusSubscription::new(inner.status, self.status_tx.subscribe())
    }

    /// Subscribe to bell cues emitted from now on
    pub fn subscribe_bells(&self) -> broadcast::Receiver<BellCue> {
        self.bell_tx.subscribe()
    }

    /// Merge `patch` into the settings for the next session.
    ///
    /// The merged result is validated first; on error nothing changes.
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<TimerSettings, SettingsError> {
        let mut inner = self.inner.lock();
        let merged = inner.settings.merged(patch);
        merged.validate()?;
        inner.settings = merged;
        debug!("Timer settings updated: {:?}", merged);
        Ok(merged)
    }

    /// Begin a new session.
    ///
    /// Returns the new session's token, or `None` when a session is already
    /// counting down. A paused or completed session is replaced.
    pub fn start(&self) -> Result<Option<SessionToken>, SettingsError> {
        let mut inner = self.inner.lock();

        if inner.status.is_running && !inner.status.is_paused {
            debug!("Start ignored, session already running");
            return Ok(None);
        }

        let settings = inner.settings;
        settings.validate()?;

        let now = self.clock.now();
        inner.session += 1;
        inner.active = settings;
        inner.session_started = now;
        inner.last_tick = now;
        inner.paused_remainder = Duration::ZERO;
        inner.warning_sounded = false;

        let mut status = TimerStatus {
            phase: Phase::GettingReady,
            current_round: 1,
            time_remaining: settings.get_ready_time,
            is_running: true,
            is_paused: false,
            total_elapsed_time: 0,
        };
        if settings.get_ready_time == 0 {
            status.phase = Phase::Round;
            status.time_remaining = settings.round_time;
        }

        info!(
            "Session started: {} rounds of {}s, {}s rest, {}s get ready ({}s planned)",
            settings.total_rounds,
            settings.round_time,
            settings.rest_time,
            settings.get_ready_time,
            settings.planned_duration()
        );

        self.commit(&mut inner, status, &[BellCue::new(BellReason::SessionStart, &status)]);
        Ok(Some(SessionToken(inner.session)))
    }

    /// Pause a running session or resume a paused one. No-op when idle or complete.
    pub fn toggle_pause(&self) -> TimerStatus {
        let mut inner = self.inner.lock();

        if !inner.status.is_running {
            return inner.status;
        }

        let now = self.clock.now();
        if inner.status.is_paused {
            inner.last_tick = now.saturating_sub(inner.paused_remainder);
            inner.paused_remainder = Duration::ZERO;

            let status = TimerStatus { is_paused: false, ..inner.status };
            info!("Timer resumed with {}s remaining", status.time_remaining);
            self.commit(&mut inner, status, &[]);
        } else {
            // Whole seconds already due belong to the time before the pause
            self.advance(&mut inner, now);
            if !inner.status.is_running {
                return inner.status;
            }
            inner.paused_remainder = now.saturating_sub(inner.last_tick);

            let status = TimerStatus { is_paused: true, ..inner.status };
            info!("Timer paused with {}s remaining", status.time_remaining);
            self.commit(&mut inner, status, &[]);
        }

        inner.status
    }

    /// Return to Idle. Any scheduler still holding the old token becomes stale.
    pub fn reset(&self) -> TimerStatus {
        let mut inner = self.inner.lock();
        inner.session += 1;
        inner.paused_remainder = Duration::ZERO;
        inner.warning_sounded = false;

        if inner.status != TimerStatus::idle() {
            info!("Timer reset");
            self.commit(&mut inner, TimerStatus::idle(), &[]);
        }

        inner.status
    }

    /// Advance the current session, whatever it is
    pub fn tick(&self) -> TickOutcome {
        let token = self.session();
        self.tick_session(token)
    }

    /// Scheduler entry point; ticks for any other session are ignored
    pub fn tick_session(&self, token: SessionToken) -> TickOutcome {
        let mut inner = self.inner.lock();

        if inner.session != token.0 {
            return TickOutcome::Stale;
        }
        if !inner.status.is_running {
            return TickOutcome::Finished;
        }

        let now = self.clock.now();
        if self.advance(&mut inner, now) {
            TickOutcome::Advanced
        } else {
            TickOutcome::Unchanged
        }
    }

    /// Consume whole elapsed seconds. Returns whether a snapshot was published.
    fn advance(&self, inner: &mut Inner, now: Duration) -> bool {
        if !inner.status.is_ticking() {
            return false;
        }

        let elapsed = now.saturating_sub(inner.last_tick);
        if elapsed < TICK_DEBOUNCE {
            return false;
        }
        let elapsed_seconds = elapsed.as_secs();
        if elapsed_seconds < 1 {
            return false;
        }

        // Keep the sub-second remainder for the next tick
        inner.last_tick += Duration::from_secs(elapsed_seconds);

        let mut status = inner.status;
        status.time_remaining = status.time_remaining.saturating_sub(elapsed_seconds);

        let mut bells = Vec::new();
        if status.time_remaining == WARNING_AT_SECONDS && !inner.warning_sounded {
            inner.warning_sounded = true;
            bells.push(BellCue::new(BellReason::TenSecondWarning, &status));
        }

        if status.time_remaining == 0 {
            let bell = self.finish_phase(inner, &mut status, now);
            bells.push(bell);
        }

        self.commit(inner, status, &bells);
        true
    }

    /// Apply the transition out of a phase that just reached zero
    fn finish_phase(&self, inner: &mut Inner, status: &mut TimerStatus, now: Duration) -> BellCue {
        let settings = inner.active;
        inner.warning_sounded = false;

        match status.phase {
            Phase::GettingReady => self.enter_round(settings, status),
            Phase::Round if status.current_round >= settings.total_rounds => {
                self.complete(inner, status, now)
            }
            Phase::Round if settings.rest_time == 0 => {
                status.current_round += 1;
                self.enter_round(settings, status)
            }
            Phase::Round => {
                status.phase = Phase::Rest;
                status.time_remaining = settings.rest_time;
                debug!("Rest after round {}", status.current_round);
                BellCue::new(BellReason::RestStart, status)
            }
            Phase::Rest => {
                status.current_round += 1;
                if status.current_round > settings.total_rounds {
                    self.complete(inner, status, now)
                } else {
                    self.enter_round(settings, status)
                }
            }
            Phase::Idle | Phase::Complete => self.complete(inner, status, now),
        }
    }

    fn enter_round(&self, settings: TimerSettings, status: &mut TimerStatus) -> BellCue {
        status.phase = Phase::Round;
        status.time_remaining = settings.round_time;
        debug!("Round {} of {}", status.current_round, settings.total_rounds);
        BellCue::new(BellReason::RoundStart, status)
    }

    fn complete(&self, inner: &Inner, status: &mut TimerStatus, now: Duration) -> BellCue {
        let elapsed = now.saturating_sub(inner.session_started);
        status.phase = Phase::Complete;
        status.time_remaining = 0;
        status.is_running = false;
        status.is_paused = false;
        status.total_elapsed_time = (elapsed.as_millis() as u64 + 500) / 1000;
        info!(
            "Workout complete: {} rounds in {}s",
            status.current_round, status.total_elapsed_time
        );
        BellCue::new(BellReason::Complete, status)
    }

    /// Replace the snapshot and publish it with its bells
    fn commit(&self, inner: &mut Inner, status: TimerStatus, bells: &[BellCue]) {
        inner.status = status;

        // Sending only fails when nobody is subscribed
        for bell in bells {
            let _ = self.bell_tx.send(*bell);
        }
        let _ = self.status_tx.send(status);
    }

    #[cfg(test)]
    fn reference_offset(&self) -> Duration {
        let inner = self.inner.lock();
        self.clock.now().saturating_sub(inner.last_tick)
    }
}
