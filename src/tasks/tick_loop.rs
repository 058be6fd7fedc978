//! Countdown tick loop background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::{Clock, CountdownEngine, SessionToken, TickOutcome};

/// How often the loop polls the engine; much finer than the one-second display
pub const TICK_PERIOD: Duration = Duration::from_millis(200);

/// Drive one session until it completes or is replaced.
///
/// The engine measures real elapsed time on every call, so a late, batched
/// or skipped interval tick only changes when a second is applied, never how
/// many seconds are applied.
pub async fn tick_loop_task<C: Clock>(
    engine: Arc<CountdownEngine<C>>,
    session: SessionToken,
    period: Duration,
) {
    debug!("Starting tick loop for {:?}", session);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match engine.tick_session(session) {
            TickOutcome::Stale => {
                debug!("Tick loop for {:?} superseded, stopping", session);
                break;
            }
            TickOutcome::Finished => {
                info!("Session finished, stopping tick loop");
                break;
            }
            TickOutcome::Unchanged | TickOutcome::Advanced => {}
        }
    }
}
