//! Workout recorder background task

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    engine::StatusSubscription,
    state::{AppState, Phase},
};

/// Subscribe now and record every session that reaches Complete
pub fn spawn_workout_recorder(state: Arc<AppState>) -> JoinHandle<()> {
    let statuses = state.engine().subscribe();
    tokio::spawn(workout_recorder_task(state, statuses))
}

/// Background task that writes completed sessions to the workout history
pub async fn workout_recorder_task(state: Arc<AppState>, mut statuses: StatusSubscription) {
    info!("Starting workout recorder task");

    let mut previous = Phase::Idle;
    while let Some(status) = statuses.next().await {
        if status.phase == Phase::Complete && previous != Phase::Complete {
            match state.record_completed_workout(&status) {
                Ok(record) => debug!("Workout {} saved to history", record.id),
                Err(e) => error!("Failed to record completed workout: {}", e),
            }
        }
        previous = status.phase;
    }

    debug!("Workout recorder task finished");
}
