use super::article::Article;
use crate::error::Result;
use crate::notify::{AppKind, Notification, NotificationCenter};
use crate::storage::NewsConfig;

/// Announce a fresh story, if the reader asked for breaking news.
pub fn breaking_news(
    center: &dyn NotificationCenter,
    config: &NewsConfig,
    article: &Article,
) -> Result<Option<Notification>> {
    if !config.notify_breaking_news {
        return Ok(None);
    }
    let n = Notification::once(
        AppKind::News,
        "Breaking News!",
        format!("{}\n{}", article.title, article.summary),
        1,
    );
    center.add(&n)?;
    Ok(Some(n))
}

/// Confirm a new bookmark, if the reader asked for it.
pub fn bookmark_added(
    center: &dyn NotificationCenter,
    config: &NewsConfig,
    article: &Article,
) -> Result<Option<Notification>> {
    if !config.notify_bookmarks {
        return Ok(None);
    }
    let n = Notification::once(
        AppKind::News,
        "Article Bookmarked",
        format!("You've bookmarked: {}", article.title),
        1,
    );
    center.add(&n)?;
    Ok(Some(n))
}

/// Sample notification from the settings screen; always sent.
pub fn test_notification(center: &dyn NotificationCenter) -> Result<Notification> {
    let n = Notification::once(
        AppKind::News,
        "Breaking News!",
        "New article: 'AI Breakthrough: ChatGPT Achieves Human-Level Understanding'\nTap to read more.",
        5,
    );
    center.add(&n)?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::article::{article_id, Category};
    use crate::notify::{SqliteNotificationCenter, Trigger};
    use crate::storage::{Config, Database};
    use chrono::Utc;

    fn article() -> Article {
        Article {
            id: article_id(1),
            hn_id: 1,
            title: "Postgres 17".into(),
            summary: "Released today".into(),
            content: String::new(),
            author: "pg".into(),
            publish_date: Utc::now(),
            image_url: None,
            source_url: None,
            category: Category::Software,
        }
    }

    #[test]
    fn toggles_gate_notifications() {
        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        let mut config = Config::default().news;

        assert!(breaking_news(&center, &config, &article()).unwrap().is_none());
        assert!(bookmark_added(&center, &config, &article()).unwrap().is_none());

        config.notify_bookmarks = true;
        let n = bookmark_added(&center, &config, &article()).unwrap().unwrap();
        assert_eq!(n.body, "You've bookmarked: Postgres 17");
        assert_eq!(n.trigger, Trigger::After { secs: 1 });
        assert_eq!(center.pending().unwrap().len(), 1);
    }

    #[test]
    fn test_notification_fires_after_five_seconds() {
        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        let n = test_notification(&center).unwrap();
        assert_eq!(n.trigger, Trigger::After { secs: 5 });
        assert_eq!(n.app, AppKind::News);
    }
}
