//! Countdown engine module
//!
//! This module contains the round/rest state machine, its time sources,
//! the events it emits and the scheduler that drives it.

pub mod clock;
pub mod countdown;
pub mod events;
pub mod scheduler;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{CountdownEngine, SessionToken, TickOutcome};
pub use events::{BellCue, BellReason, StatusSubscription};
pub use scheduler::TickScheduler;
