//! The word of the day: one phrase pinned per local calendar day.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deck::PhraseDeck;
use super::phrase::Phrase;
use crate::error::Result;
use crate::notify::{AppKind, Notification, NotificationCenter, Trigger};
use crate::storage::{Database, VocabConfig};

const WORD_OF_DAY_KEY: &str = "word_of_day";
pub const REMINDER_ID: &str = "wordOfDay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordOfDay {
    pub phrase_id: Uuid,
    pub day_start: DateTime<Utc>,
}

/// Midnight of `now`'s local day, in UTC.
fn start_of_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let day = now.with_timezone(tz).date_naive();
    tz.from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

fn same_local_day<Tz: TimeZone>(a: DateTime<Utc>, b: DateTime<Utc>, tz: &Tz) -> bool {
    a.with_timezone(tz).date_naive() == b.with_timezone(tz).date_naive()
}

pub fn load(db: &Database) -> Result<Option<WordOfDay>> {
    db.kv_get_json(WORD_OF_DAY_KEY)
}

/// Schedule the daily reminder for `phrase`, replacing any pending vocab
/// request. Nothing is scheduled while reminders are off.
pub fn schedule_reminder(
    center: &dyn NotificationCenter,
    config: &VocabConfig,
    phrase: &Phrase,
) -> Result<Option<Notification>> {
    center.remove_pending(AppKind::Vocab)?;
    if !config.daily_reminder_enabled {
        return Ok(None);
    }
    let (hour, minute) = config.reminder_hour_minute();
    let reminder = Notification::new(
        REMINDER_ID,
        AppKind::Vocab,
        format!("Word of the Day: {}", phrase.word),
        phrase.phrase.clone(),
        Trigger::Daily { hour, minute },
    );
    center.add(&reminder)?;
    tracing::info!(hour, minute, word = %phrase.word, "word of the day reminder scheduled");
    Ok(Some(reminder))
}

/// Reschedule the reminder for the stored pick after a settings change.
/// Turning reminders off cancels the pending request even when no word has
/// been drawn yet.
pub fn resync_reminder(
    db: &Database,
    deck: &PhraseDeck,
    center: &dyn NotificationCenter,
    config: &VocabConfig,
) -> Result<Option<Notification>> {
    let stored = load(db)?.and_then(|pick| deck.get(pick.phrase_id));
    match stored {
        Some(phrase) => schedule_reminder(center, config, phrase),
        None => {
            if !config.daily_reminder_enabled {
                center.remove_pending(AppKind::Vocab)?;
            }
            Ok(None)
        }
    }
}

/// Today's phrase. The stored pick is kept while it is still in the deck
/// and was made on the same local day; otherwise a new one is drawn,
/// stored and the reminder rescheduled. `None` only for an empty deck.
pub fn check_and_update<Tz: TimeZone, R: Rng + ?Sized>(
    db: &Database,
    deck: &PhraseDeck,
    center: &dyn NotificationCenter,
    config: &VocabConfig,
    now: DateTime<Utc>,
    tz: &Tz,
    rng: &mut R,
) -> Result<Option<Phrase>> {
    if let Some(stored) = load(db)? {
        if same_local_day(stored.day_start, now, tz) {
            if let Some(phrase) = deck.get(stored.phrase_id) {
                return Ok(Some(phrase.clone()));
            }
            tracing::debug!(id = %stored.phrase_id, "stored word of the day left the deck");
        }
    }

    let Some(phrase) = deck.random(rng).cloned() else {
        return Ok(None);
    };
    let pick = WordOfDay {
        phrase_id: phrase.id,
        day_start: start_of_day(now, tz),
    };
    db.kv_set_json(WORD_OF_DAY_KEY, &pick)?;
    tracing::info!(word = %phrase.word, "new word of the day");
    schedule_reminder(center, config, &phrase)?;
    Ok(Some(phrase))
}
