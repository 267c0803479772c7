//! Progress views over the session history.
//!
//! Day and month buckets are computed in the caller's time zone; the CLI
//! passes `chrono::Local`, tests pass `Utc` or a fixed offset.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::routine::history_color;
use super::session::BreathSession;
use crate::error::ValidationError;

const RECENT_LIMIT: usize = 5;
const MIN_CHART_CEILING: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    /// Earliest session date included, or `None` for everything.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::Week => Some(now - Duration::days(7)),
            TimeRange::Month => now.checked_sub_months(Months::new(1)),
            TimeRange::Year => now.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }

    fn bucket<Tz: TimeZone>(self, date: DateTime<Utc>, tz: &Tz) -> NaiveDate {
        let local = date.with_timezone(tz).date_naive();
        match self {
            TimeRange::Week | TimeRange::Month => local,
            TimeRange::Year | TimeRange::All => local.with_day(1).unwrap_or(local),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::All => "all",
        })
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "w" | "d" => Ok(TimeRange::Week),
            "month" | "m" => Ok(TimeRange::Month),
            "year" | "y" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            _ => Err(ValidationError::UnknownItem {
                kind: "time range",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineMinutes {
    pub title: String,
    pub minutes: u64,
    pub color: String,
}

/// One point on the activity chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressGroup {
    /// First day of the bucket (a day, or the first of a month).
    pub date: NaiveDate,
    pub routines: Vec<RoutineMinutes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub range: TimeRange,
    pub total_sessions: usize,
    pub total_minutes: u64,
    pub groups: Vec<ProgressGroup>,
    pub chart_ceiling: u64,
    pub routine_titles: Vec<String>,
    pub recent: Vec<BreathSession>,
}

/// Sum of whole minutes per session.
pub fn total_minutes(sessions: &[BreathSession]) -> u64 {
    sessions.iter().map(BreathSession::minutes).sum()
}

/// Bucket the sessions inside `range` and sum minutes per routine.
/// Groups come back oldest first; routines within a group by title.
pub fn group_sessions<Tz: TimeZone>(
    sessions: &[BreathSession],
    range: TimeRange,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<ProgressGroup> {
    let cutoff = range.cutoff(now);
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<&str, u64>> = BTreeMap::new();

    for session in sessions {
        if cutoff.is_some_and(|c| session.date < c) {
            continue;
        }
        *buckets
            .entry(range.bucket(session.date, tz))
            .or_default()
            .entry(session.routine_title.as_str())
            .or_default() += session.minutes();
    }

    buckets
        .into_iter()
        .map(|(date, routines)| ProgressGroup {
            date,
            routines: routines
                .into_iter()
                .map(|(title, minutes)| RoutineMinutes {
                    title: title.to_string(),
                    minutes,
                    color: history_color(title).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Upper bound of the chart's minute axis.
pub fn chart_ceiling(groups: &[ProgressGroup]) -> u64 {
    let max = groups
        .iter()
        .flat_map(|g| g.routines.iter().map(|r| r.minutes))
        .max()
        .unwrap_or(0);
    (max + 5).max(MIN_CHART_CEILING)
}

/// Distinct routine titles across the whole history, sorted.
pub fn routine_titles(sessions: &[BreathSession]) -> Vec<String> {
    let mut titles: Vec<String> = sessions.iter().map(|s| s.routine_title.clone()).collect();
    titles.sort();
    titles.dedup();
    titles
}

/// The most recent sessions, newest first.
pub fn recent_sessions(sessions: &[BreathSession]) -> Vec<BreathSession> {
    let mut recent = sessions.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_LIMIT);
    recent
}

pub fn progress<Tz: TimeZone>(
    sessions: &[BreathSession],
    range: TimeRange,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Progress {
    let groups = group_sessions(sessions, range, now, tz);
    Progress {
        range,
        total_sessions: sessions.len(),
        total_minutes: total_minutes(sessions),
        chart_ceiling: chart_ceiling(&groups),
        groups,
        routine_titles: routine_titles(sessions),
        recent: recent_sessions(sessions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::BreathPattern;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn session(pattern: BreathPattern, secs: u64, date: DateTime<Utc>) -> BreathSession {
        BreathSession::new(pattern, secs, date)
    }

    fn sample() -> Vec<BreathSession> {
        vec![
            session(BreathPattern::BoxBreathing, 300, at(2026, 10, 15, 8)),
            session(BreathPattern::BoxBreathing, 179, at(2026, 10, 15, 20)),
            session(BreathPattern::CoherentBreathing, 600, at(2026, 10, 15, 9)),
            session(BreathPattern::BreathOfFire, 60, at(2026, 10, 12, 7)),
            session(BreathPattern::SlowBodyScan, 600, at(2026, 8, 1, 7)),
            session(BreathPattern::MindfulCounting, 600, at(2025, 1, 3, 7)),
        ]
    }

    #[test]
    fn week_groups_by_day() {
        let now = at(2026, 10, 16, 12);
        let groups = group_sessions(&sample(), TimeRange::Week, now, &Utc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());

        let day = &groups[1];
        assert_eq!(day.routines.len(), 2);
        assert_eq!(day.routines[0].title, "Box Breathing");
        // 5 + 2 whole minutes
        assert_eq!(day.routines[0].minutes, 7);
        assert_eq!(day.routines[1].title, "Coherent Breathing");
        assert_eq!(day.routines[1].minutes, 10);
    }

    #[test]
    fn year_groups_by_month() {
        let now = at(2026, 10, 16, 12);
        let groups = group_sessions(&sample(), TimeRange::Year, now, &Utc);
        let dates: Vec<_> = groups.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-08-01", "2026-10-01"]);

        let all = group_sessions(&sample(), TimeRange::All, now, &Utc);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].routines[0].color, "#A2C374");
    }

    #[test]
    fn buckets_follow_the_time_zone() {
        let now = at(2026, 10, 16, 12);
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let groups = group_sessions(&sample(), TimeRange::Week, now, &tokyo);
        // 20:00 UTC on the 15th is already the 16th in Tokyo.
        let last = groups.last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(last.routines[0].minutes, 2);
    }

    #[test]
    fn ceiling_has_a_floor() {
        assert_eq!(chart_ceiling(&[]), 30);
        let groups = group_sessions(&sample(), TimeRange::All, at(2026, 10, 16, 12), &Utc);
        // Busiest bucket: coherent breathing, 10 minutes in October.
        assert_eq!(chart_ceiling(&groups), 30);

        let long = vec![session(BreathPattern::Diaphragmatic, 40 * 60, at(2026, 10, 16, 1))];
        let groups = group_sessions(&long, TimeRange::Week, at(2026, 10, 16, 12), &Utc);
        assert_eq!(chart_ceiling(&groups), 45);
    }

    #[test]
    fn summary_numbers() {
        let sessions = sample();
        let p = progress(&sessions, TimeRange::Month, at(2026, 10, 16, 12), &Utc);
        assert_eq!(p.total_sessions, 6);
        assert_eq!(p.total_minutes, 5 + 2 + 10 + 1 + 10 + 10);
        assert_eq!(p.routine_titles.len(), 5);
        assert_eq!(p.recent.len(), 5);
        assert_eq!(p.recent[0].date, at(2026, 10, 15, 20));
        assert!(p.routine_titles.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parse_ranges() {
        assert_eq!("Y".parse::<TimeRange>().unwrap(), TimeRange::Year);
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("decade".parse::<TimeRange>().is_err());
    }
}
