//! Owns the single tick loop of an engine

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{
    clock::{Clock, SystemClock},
    countdown::{CountdownEngine, SessionToken},
};
use crate::{
    error::SettingsError,
    state::TimerStatus,
    tasks::tick_loop::{tick_loop_task, TICK_PERIOD},
};

/// Couples engine commands with the lifetime of the tick loop.
///
/// At most one loop runs at a time: starting a session aborts the previous
/// loop before spawning the next, and reset or drop aborts it outright.
/// `start` must be called from inside a tokio runtime.
#[derive(Debug)]
pub struct TickScheduler<C: Clock = SystemClock> {
    engine: Arc<CountdownEngine<C>>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock> TickScheduler<C> {
    pub fn new(engine: Arc<CountdownEngine<C>>) -> Self {
        Self::with_period(engine, TICK_PERIOD)
    }

    pub fn with_period(engine: Arc<CountdownEngine<C>>, period: Duration) -> Self {
        Self {
            engine,
            period,
            task: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<CountdownEngine<C>> {
        &self.engine
    }

    /// Start a session and its tick loop
    pub fn start(&self) -> Result<TimerStatus, SettingsError> {
        if let Some(session) = self.engine.start()? {
            self.spawn_loop(session);
        }
        Ok(self.engine.status())
    }

    pub fn toggle_pause(&self) -> TimerStatus {
        self.engine.toggle_pause()
    }

    /// Stop the loop, then return the engine to Idle
    pub fn reset(&self) -> TimerStatus {
        self.cancel();
        self.engine.reset()
    }

    /// Whether a tick loop task is still alive
    pub fn is_ticking(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Abort the running loop, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.task.lock().take() {
            debug!("Cancelling tick loop");
            handle.abort();
        }
    }

    fn spawn_loop(&self, session: SessionToken) {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *task = Some(tokio::spawn(tick_loop_task(
            Arc::clone(&self.engine),
            session,
            self.period,
        )));
    }
}

impl<C: Clock> Drop for TickScheduler<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::clock::SystemClock,
        state::{Phase, TimerSettings},
    };

    fn scheduler(settings: TimerSettings) -> TickScheduler<SystemClock> {
        let engine = CountdownEngine::with_clock(settings, SystemClock::new()).unwrap();
        TickScheduler::new(Arc::new(engine))
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn loop_counts_down_in_real_seconds() {
        let scheduler = scheduler(TimerSettings::new(2, 30, 10, 5));
        let status = scheduler.start().unwrap();
        assert_eq!(status.phase, Phase::GettingReady);
        assert!(scheduler.is_ticking());

        sleep_ms(3_100).await;
        assert_eq!(scheduler.engine().status().time_remaining, 2);

        sleep_ms(2_000).await;
        let status = scheduler.engine().status();
        assert_eq!(status.phase, Phase::Round);
        assert_eq!(status.time_remaining, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_after_completion() {
        let scheduler = scheduler(TimerSettings::new(1, 3, 0, 0));
        scheduler.start().unwrap();

        sleep_ms(3_500).await;
        let status = scheduler.engine().status();
        assert_eq!(status.phase, Phase::Complete);
        assert_eq!(status.total_elapsed_time, 3);

        sleep_ms(400).await;
        assert!(!scheduler.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_the_loop() {
        let scheduler = scheduler(TimerSettings::new(3, 60, 30, 0));
        scheduler.start().unwrap();
        sleep_ms(2_100).await;

        let mut sub = scheduler.engine().subscribe();
        let status = scheduler.reset();
        assert_eq!(status, TimerStatus::idle());
        assert!(!scheduler.is_ticking());

        sleep_ms(5_000).await;
        assert_eq!(sub.drain(), vec![status_after_reset_pending(), TimerStatus::idle()]);
    }

    /// Snapshot current when the test subscribed: round 1, two seconds in
    fn status_after_reset_pending() -> TimerStatus {
        TimerStatus {
            phase: Phase::Round,
            current_round: 1,
            time_remaining: 58,
            is_running: true,
            is_paused: false,
            total_elapsed_time: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_previous_loop() {
        let scheduler = scheduler(TimerSettings::new(1, 60, 0, 0));
        scheduler.start().unwrap();
        sleep_ms(1_100).await;
        scheduler.toggle_pause();

        // Starting while paused opens a new session with a new loop
        scheduler.start().unwrap();
        sleep_ms(2_100).await;
        assert_eq!(scheduler.engine().status().time_remaining, 58);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_session_does_not_advance() {
        let scheduler = scheduler(TimerSettings::new(1, 60, 0, 0));
        scheduler.start().unwrap();
        sleep_ms(1_100).await;
        scheduler.toggle_pause();

        sleep_ms(30_000).await;
        assert_eq!(scheduler.engine().status().time_remaining, 59);

        scheduler.toggle_pause();
        sleep_ms(1_000).await;
        assert_eq!(scheduler.engine().status().time_remaining, 58);
    }
}
