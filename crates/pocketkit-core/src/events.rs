use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breath::{BreathPattern, BreathState, CircleScales, PhaseFrame};

/// Every change in a breathing session produces an Event.
/// The CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        pattern: BreathPattern,
        routine_title: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        label: String,
        hold: u32,
        expand: bool,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        pattern: BreathPattern,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was closed and written to history.
    SessionEnded {
        session_id: Uuid,
        routine_title: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: BreathState,
        pattern: BreathPattern,
        routine_title: String,
        remaining_ms: u64,
        total_ms: u64,
        progress_pct: f64,
        frame: PhaseFrame,
        scales: CircleScales,
        animation_secs: f64,
        at: DateTime<Utc>,
    },
}
