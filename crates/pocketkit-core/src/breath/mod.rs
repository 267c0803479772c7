//! Breath Snack: breathing patterns, the routine catalog, the session
//! engine and progress over the session history.

mod engine;
pub mod history;
mod pattern;
mod reminder;
mod routine;
mod session;

pub use engine::{BreathEngine, BreathState};
pub use history::{Progress, ProgressGroup, RoutineMinutes, TimeRange};
pub use pattern::{phase_at, BreathPattern, CircleScales, CyclePhase, PhaseFrame, Rhythm};
pub use reminder::{sync_reminder, REMINDER_ID};
pub use routine::{all_routines, catalog, history_color, BreathCategory, BreathRoutine, QuickPicks};
pub use session::BreathSession;
