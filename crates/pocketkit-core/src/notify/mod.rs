//! Locally scheduled notifications.
//!
//! The apps never deliver anything themselves; they hand requests to a
//! [`NotificationCenter`]. The SQLite-backed center keeps the pending
//! requests so the CLI can list them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::storage::database::{parse_timestamp, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Breath,
    News,
    Vocab,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Breath => "breath",
            AppKind::News => "news",
            AppKind::Vocab => "vocab",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breath" => Ok(AppKind::Breath),
            "news" => Ok(AppKind::News),
            "vocab" => Ok(AppKind::Vocab),
            _ => Err(ValidationError::UnknownItem {
                kind: "app",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trigger {
    /// Repeats every day at a wall-clock time.
    Daily { hour: u32, minute: u32 },
    /// Fires once, `secs` after the request was made.
    After { secs: u64 },
}

impl Trigger {
    /// When the notification fires next, if it still will.
    ///
    /// `Daily` resolves in `tz` and is always in the future; `After` is
    /// `None` once its moment has passed.
    pub fn next_fire<Tz: TimeZone>(
        &self,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Option<DateTime<Utc>> {
        match *self {
            Trigger::After { secs } => {
                let fire = created_at + Duration::seconds(i64::try_from(secs).ok()?);
                (fire > now).then_some(fire)
            }
            Trigger::Daily { hour, minute } => {
                let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
                let today = now.with_timezone(tz).date_naive();
                (0..=2)
                    .filter_map(|offset| today.checked_add_days(chrono::Days::new(offset)))
                    .filter_map(|day| tz.from_local_datetime(&day.and_time(time)).earliest())
                    .map(|dt| dt.with_timezone(&Utc))
                    .find(|fire| *fire > now)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub app: AppKind,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        id: impl Into<String>,
        app: AppKind,
        title: impl Into<String>,
        body: impl Into<String>,
        trigger: Trigger,
    ) -> Self {
        Self {
            id: id.into(),
            app,
            title: title.into(),
            body: body.into(),
            trigger,
            created_at: Utc::now(),
        }
    }

    /// One-off notification with a random id.
    pub fn once(app: AppKind, title: impl Into<String>, body: impl Into<String>, secs: u64) -> Self {
        Self::new(
            Uuid::new_v4().to_string(),
            app,
            title,
            body,
            Trigger::After { secs },
        )
    }
}

/// Sink for notification requests.
pub trait NotificationCenter {
    /// Schedule a request; an existing request with the same id is replaced.
    fn add(&self, notification: &Notification) -> Result<()>;

    /// Drop every pending request of one app.
    fn remove_pending(&self, app: AppKind) -> Result<()>;

    /// Drop one request by id.
    fn remove(&self, id: &str) -> Result<()>;

    /// All pending requests, oldest first.
    fn pending(&self) -> Result<Vec<Notification>>;
}

/// Center that records requests in the `notifications` table.
pub struct SqliteNotificationCenter<'a> {
    db: &'a Database,
}

impl<'a> SqliteNotificationCenter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Remove one-off requests whose moment has passed.
    pub fn prune_delivered(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for n in self.pending()? {
            if matches!(n.trigger, Trigger::After { .. })
                && n.trigger.next_fire(n.created_at, now, &Utc).is_none()
            {
                self.remove(&n.id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl NotificationCenter for SqliteNotificationCenter<'_> {
    fn add(&self, notification: &Notification) -> Result<()> {
        let trigger = serde_json::to_string(&notification.trigger)?;
        self.db.conn().execute(
            "INSERT OR REPLACE INTO notifications (id, app, title, body, trigger, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                notification.id,
                notification.app.as_str(),
                notification.title,
                notification.body,
                trigger,
                notification.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(id = %notification.id, app = %notification.app, "notification scheduled");
        Ok(())
    }

    fn remove_pending(&self, app: AppKind) -> Result<()> {
        let removed = self
            .db
            .conn()
            .execute("DELETE FROM notifications WHERE app = ?1", params![app.as_str()])?;
        tracing::debug!(%app, removed, "pending notifications removed");
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.db
            .conn()
            .execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Notification>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, app, title, body, trigger, created_at
             FROM notifications
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, app, title, body, trigger, created_at) = row?;
            out.push(Notification {
                id,
                app: app.parse()?,
                title,
                body,
                trigger: serde_json::from_str(&trigger)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, m, 0).unwrap()
    }

    #[test]
    fn daily_trigger_rolls_over() {
        let daily = Trigger::Daily { hour: 9, minute: 0 };
        assert_eq!(daily.next_fire(utc(0, 0), utc(8, 30), &Utc), Some(utc(9, 0)));
        assert_eq!(
            daily.next_fire(utc(0, 0), utc(9, 0), &Utc),
            Some(utc(9, 0) + Duration::days(1))
        );
    }

    #[test]
    fn daily_trigger_uses_local_time() {
        let daily = Trigger::Daily { hour: 9, minute: 0 };
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 09:00 at +02:00 is 07:00 UTC.
        assert_eq!(daily.next_fire(utc(0, 0), utc(6, 0), &plus_two), Some(utc(7, 0)));
    }

    #[test]
    fn one_off_trigger_expires() {
        let after = Trigger::After { secs: 5 };
        let created = utc(10, 0);
        assert_eq!(
            after.next_fire(created, created, &Utc),
            Some(created + Duration::seconds(5))
        );
        assert_eq!(after.next_fire(created, created + Duration::seconds(5), &Utc), None);
        assert_eq!(Trigger::Daily { hour: 25, minute: 0 }.next_fire(created, created, &Utc), None);
    }

    #[test]
    fn add_replaces_by_id() {
        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        let daily = Trigger::Daily { hour: 9, minute: 0 };
        center
            .add(&Notification::new("wordOfDay", AppKind::Vocab, "Word of the Day: a", "x", daily))
            .unwrap();
        center
            .add(&Notification::new("wordOfDay", AppKind::Vocab, "Word of the Day: b", "y", daily))
            .unwrap();

        let pending = center.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Word of the Day: b");
        assert_eq!(pending[0].trigger, daily);
    }

    #[test]
    fn remove_pending_is_scoped_to_one_app() {
        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        center
            .add(&Notification::once(AppKind::News, "Breaking News!", "body", 1))
            .unwrap();
        center
            .add(&Notification::new(
                "dailyBreathingReminder",
                AppKind::Breath,
                "Time for a Breathing Break",
                "body",
                Trigger::Daily { hour: 9, minute: 0 },
            ))
            .unwrap();

        center.remove_pending(AppKind::News).unwrap();
        let pending = center.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].app, AppKind::Breath);
    }

    #[test]
    fn prune_drops_only_past_one_offs() {
        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        let mut old = Notification::once(AppKind::News, "Article Bookmarked", "x", 1);
        old.created_at = Utc::now() - Duration::minutes(5);
        center.add(&old).unwrap();
        center
            .add(&Notification::new("daily", AppKind::Breath, "t", "b", Trigger::Daily { hour: 9, minute: 0 }))
            .unwrap();

        assert_eq!(center.prune_delivered(Utc::now()).unwrap(), 1);
        assert_eq!(center.pending().unwrap().len(), 1);
    }
}
