//! Breathing session engine.
//!
//! A wall-clock state machine: no internal thread, the caller invokes
//! `tick()` (the CLI does so once per second). Every command has an `_at`
//! form taking epoch milliseconds so tests can drive the clock.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed
//! ```
//!
//! `finish()` closes the session from any non-idle state and returns it
//! for the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pattern::{phase_at, BreathPattern, PhaseFrame};
use super::routine::BreathRoutine;
use super::session::BreathSession;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathEngine {
    pattern: BreathPattern,
    duration_ms: u64,
    state: BreathState,
    remaining_ms: u64,
    /// Epoch milliseconds of the last flush while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    frame: PhaseFrame,
    /// Whole remaining second the current frame was computed for.
    #[serde(default)]
    frame_secs: Option<u32>,
}

impl BreathEngine {
    pub fn new(routine: &BreathRoutine) -> Self {
        Self::with_duration(routine.pattern, routine.duration_secs)
    }

    /// Engine for `pattern` with a custom length.
    pub fn with_duration(pattern: BreathPattern, duration_secs: u64) -> Self {
        let duration_ms = duration_secs.saturating_mul(1000);
        Self {
            pattern,
            duration_ms,
            state: BreathState::Idle,
            remaining_ms: duration_ms,
            last_tick_epoch_ms: None,
            frame: PhaseFrame::initial(),
            frame_secs: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> BreathState {
        self.state
    }

    pub fn pattern(&self) -> BreathPattern {
        self.pattern
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn remaining_secs(&self) -> u32 {
        u32::try_from(self.remaining_ms / 1000).unwrap_or(u32::MAX)
    }

    pub fn frame(&self) -> &PhaseFrame {
        &self.frame
    }

    /// Seconds breathed so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.duration_ms.saturating_sub(self.remaining_ms) / 1000
    }

    /// 0.0 .. 100.0
    pub fn progress_pct(&self) -> f64 {
        if self.duration_ms == 0 {
            return 100.0;
        }
        (1.0 - self.remaining_ms as f64 / self.duration_ms as f64) * 100.0
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    pub fn snapshot_at(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            state: self.state,
            pattern: self.pattern,
            routine_title: self.pattern.routine().title.to_string(),
            remaining_ms: self.remaining_ms,
            total_ms: self.duration_ms,
            progress_pct: self.progress_pct(),
            frame: self.frame.clone(),
            scales: self.frame.scales(),
            animation_secs: self.pattern.animation_secs(),
            at: at(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Start from idle, or restart a completed session. Starting a paused
    /// session resumes it.
    pub fn start_at(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            BreathState::Idle | BreathState::Completed => {
                self.remaining_ms = self.duration_ms;
                self.frame = PhaseFrame::initial();
                self.frame_secs = None;
                self.state = BreathState::Running;
                self.last_tick_epoch_ms = Some(now_ms);
                tracing::info!(pattern = %self.pattern, secs = self.duration_ms / 1000, "breathing session started");
                Some(Event::SessionStarted {
                    pattern: self.pattern,
                    routine_title: self.pattern.routine().title.to_string(),
                    duration_secs: self.duration_ms / 1000,
                    at: at(now_ms),
                })
            }
            BreathState::Paused => self.resume_at(now_ms),
            BreathState::Running => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != BreathState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        self.state = BreathState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::SessionPaused {
            remaining_ms: self.remaining_ms,
            at: at(now_ms),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != BreathState::Paused {
            return None;
        }
        self.state = BreathState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        Some(Event::SessionResumed {
            remaining_ms: self.remaining_ms,
            at: at(now_ms),
        })
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Advance the clock. Emits `PhaseChanged` whenever the phase label
    /// changes and `SessionCompleted` once the countdown reaches zero.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != BreathState::Running {
            return events;
        }

        self.flush_elapsed(now_ms);
        let secs = self.remaining_secs();
        if self.frame_secs != Some(secs) {
            self.frame_secs = Some(secs);
            let next = phase_at(self.pattern, secs);
            if next.label != self.frame.label {
                events.push(Event::PhaseChanged {
                    label: next.label.clone(),
                    hold: next.hold,
                    expand: next.expand,
                    remaining_secs: secs,
                    at: at(now_ms),
                });
            }
            self.frame = next;
        }

        if self.remaining_ms == 0 {
            self.state = BreathState::Completed;
            self.last_tick_epoch_ms = None;
            tracing::info!(pattern = %self.pattern, "breathing session completed");
            events.push(Event::SessionCompleted {
                pattern: self.pattern,
                duration_secs: self.duration_ms / 1000,
                at: at(now_ms),
            });
        }
        events
    }

    pub fn finish(&mut self) -> Option<BreathSession> {
        self.finish_at(now_ms())
    }

    /// Close the session and return it for the history. Only the seconds
    /// actually breathed are counted. The engine returns to idle.
    pub fn finish_at(&mut self, now_ms: u64) -> Option<BreathSession> {
        if self.state == BreathState::Idle {
            return None;
        }
        if self.state == BreathState::Running {
            self.flush_elapsed(now_ms);
        }
        let session = BreathSession::new(self.pattern, self.elapsed_secs(), at(now_ms));

        self.state = BreathState::Idle;
        self.remaining_ms = self.duration_ms;
        self.last_tick_epoch_ms = None;
        self.frame = PhaseFrame::initial();
        self.frame_secs = None;
        tracing::info!(pattern = %self.pattern, secs = session.duration_secs, "breathing session finished");
        Some(session)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now_ms.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }
}

fn at(epoch_ms: u64) -> DateTime<Utc> {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
