use crate::error::Result;
use crate::notify::{AppKind, Notification, NotificationCenter, Trigger};
use crate::storage::BreathConfig;

pub const REMINDER_ID: &str = "dailyBreathingReminder";

/// Bring the daily breathing reminder in line with the preferences.
///
/// Any pending breath notification is dropped first; when reminders are
/// enabled a fresh daily request is added. Returns the scheduled request.
pub fn sync_reminder(
    center: &dyn NotificationCenter,
    config: &BreathConfig,
) -> Result<Option<Notification>> {
    center.remove_pending(AppKind::Breath)?;
    if !config.notifications_enabled {
        return Ok(None);
    }

    let reminder = Notification::new(
        REMINDER_ID,
        AppKind::Breath,
        "Time for a Breathing Break",
        "Take a moment to refresh your mind and body with a breathing exercise.",
        Trigger::Daily {
            hour: config.reminder_hour,
            minute: config.reminder_minute,
        },
    );
    center.add(&reminder)?;
    tracing::info!(hour = config.reminder_hour, minute = config.reminder_minute, "breathing reminder scheduled");
    Ok(Some(reminder))
}
