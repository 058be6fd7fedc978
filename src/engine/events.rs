//! Bell cues and status subscriptions emitted by the engine

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::state::{Phase, TimerStatus};

/// Why the bell rang
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BellReason {
    SessionStart,
    RoundStart,
    RestStart,
    TenSecondWarning,
    Complete,
}

/// One bell trigger, tagged with the phase it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BellCue {
    pub reason: BellReason,
    pub phase: Phase,
    pub round: u32,
}

impl BellCue {
    pub fn new(reason: BellReason, status: &TimerStatus) -> Self {
        Self {
            reason,
            phase: status.phase,
            round: status.current_round,
        }
    }
}

/// Stream of status snapshots: the snapshot current at subscription time,
/// then every later snapshot in the order the engine produced them.
#[derive(Debug)]
pub struct StatusSubscription {
    pending: Option<TimerStatus>,
    rx: broadcast::Receiver<TimerStatus>,
}

impl StatusSubscription {
    pub(crate) fn new(current: TimerStatus, rx: broadcast::Receiver<TimerStatus>) -> Self {
        Self {
            pending: Some(current),
            rx,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the engine is dropped.
    pub async fn next(&mut self) -> Option<TimerStatus> {
        if let Some(status) = self.pending.take() {
            return Some(status);
        }

        loop {
            match self.rx.recv().await {
                Ok(status) => return Some(status),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Status subscriber lagged behind, skipped {} snapshots", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next snapshot if one is already queued
    pub fn try_next(&mut self) -> Option<TimerStatus> {
        if let Some(status) = self.pending.take() {
            return Some(status);
        }

        loop {
            match self.rx.try_recv() {
                Ok(status) => return Some(status),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Status subscriber lagged behind, skipped {} snapshots", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every queued snapshot
    pub fn drain(&mut self) -> Vec<TimerStatus> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_current_snapshot_first() {
        let (tx, rx) = broadcast::channel(8);
        let mut sub = StatusSubscription::new(TimerStatus::idle(), rx);

        let mut running = TimerStatus::idle();
        running.is_running = true;
        tx.send(running).unwrap();

        assert_eq!(sub.next().await, Some(TimerStatus::idle()));
        assert_eq!(sub.next().await, Some(running));
        assert_eq!(sub.try_next(), None);

        drop(tx);
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn drain_skips_over_lag() {
        let (tx, rx) = broadcast::channel(2);
        let mut sub = StatusSubscription::new(TimerStatus::idle(), rx);
        for remaining in 1..=4 {
            let mut status = TimerStatus::idle();
            status.time_remaining = remaining;
            tx.send(status).unwrap();
        }

        let seen: Vec<u64> = sub.drain().iter().map(|s| s.time_remaining).collect();
        assert_eq!(seen, vec![0, 3, 4]);
    }
}
