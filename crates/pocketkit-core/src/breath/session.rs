use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pattern::BreathPattern;

/// A finished (or ended early) breathing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathSession {
    pub id: Uuid,
    pub routine_title: String,
    pub date: DateTime<Utc>,
    /// Seconds actually breathed.
    pub duration_secs: u64,
    pub routine_color: String,
    pub pattern: BreathPattern,
}

impl BreathSession {
    pub fn new(pattern: BreathPattern, duration_secs: u64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_title: pattern.routine().title.to_string(),
            date,
            duration_secs,
            routine_color: pattern.gradient()[0].to_string(),
            pattern,
        }
    }

    /// Whole minutes, as counted by progress totals.
    pub fn minutes(&self) -> u64 {
        self.duration_secs / 60
    }
}
