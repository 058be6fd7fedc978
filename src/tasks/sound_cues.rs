//! Sound cue background task

use std::sync::Arc;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    engine::{BellCue, Clock, CountdownEngine, StatusSubscription},
    services::SoundNotifier,
    state::{Phase, TimerStatus},
};

/// Music action implied by a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Play,
    Pause,
    Stop,
}

/// Music plays while a round counts down, pauses for rest and while the
/// timer is paused, and stops when the session completes or is reset.
pub fn music_cue(previous: &TimerStatus, next: &TimerStatus) -> Option<MusicCue> {
    let was_fighting = previous.phase == Phase::Round && previous.is_ticking();
    let is_fighting = next.phase == Phase::Round && next.is_ticking();

    if is_fighting && (!was_fighting || previous.current_round != next.current_round) {
        Some(MusicCue::Play)
    } else if matches!(next.phase, Phase::Complete | Phase::Idle) && previous.phase != next.phase {
        Some(MusicCue::Stop)
    } else if next.phase == Phase::Rest && previous.phase != Phase::Rest {
        Some(MusicCue::Pause)
    } else if next.is_paused && !previous.is_paused {
        Some(MusicCue::Pause)
    } else {
        None
    }
}

/// Subscribe to `engine` now and forward its cues to `notifier` in the background
pub fn spawn_sound_cues<C, N>(engine: &CountdownEngine<C>, notifier: Arc<N>) -> JoinHandle<()>
where
    C: Clock,
    N: SoundNotifier + ?Sized + 'static,
{
    let bells = engine.subscribe_bells();
    let statuses = engine.subscribe();
    tokio::spawn(sound_cues_task(bells, statuses, notifier))
}

/// Background task that plays bells and keeps music in step with the timer.
/// Playback failures are logged and never stop the task.
pub async fn sound_cues_task<N>(
    mut bells: broadcast::Receiver<BellCue>,
    mut statuses: StatusSubscription,
    notifier: Arc<N>,
) where
    N: SoundNotifier + ?Sized,
{
    info!("Starting sound cue task");

    let Some(mut previous) = statuses.next().await else {
        return;
    };

    loop {
        tokio::select! {
            bell = bells.recv() => match bell {
                Ok(cue) => {
                    debug!("Bell: {:?} ({} round {})", cue.reason, cue.phase, cue.round);
                    if let Err(e) = notifier.play_bell() {
                        warn!("Failed to play bell: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Sound cue task skipped {} bells", skipped);
                }
                Err(RecvError::Closed) => break,
            },

            status = statuses.next() => {
                let Some(status) = status else {
                    break;
                };
                if let Some(cue) = music_cue(&previous, &status) {
                    apply_music_cue(notifier.as_ref(), cue);
                }
                previous = status;
            }
        }
    }

    debug!("Sound cue task finished");
}

fn apply_music_cue<N: SoundNotifier + ?Sized>(notifier: &N, cue: MusicCue) {
    let result = match cue {
        MusicCue::Play => notifier.play_music(),
        MusicCue::Pause => notifier.pause_music(),
        MusicCue::Stop => notifier.stop_music(),
    };
    if let Err(e) = result {
        warn!("Failed to {:?} music: {}", cue, e);
    }
}
