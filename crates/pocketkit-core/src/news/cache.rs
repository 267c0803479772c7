//! Fetched feeds cached in `article_cache`, keyed by feed name.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::article::{Article, Category};
use crate::error::Result;
use crate::storage::database::{parse_timestamp, Database};

/// Cache key of the home feed.
pub const LATEST_FEED: &str = "latest";

/// Cache key of a category feed.
pub fn category_feed(category: Category) -> String {
    format!("category:{}", category.key())
}

pub struct FeedCache<'a> {
    db: &'a Database,
    ttl: Duration,
}

impl<'a> FeedCache<'a> {
    pub fn new(db: &'a Database, ttl_secs: u64) -> Self {
        Self {
            db,
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Cached articles of `feed` if they are younger than the TTL.
    pub fn get(&self, feed: &str, now: DateTime<Utc>) -> Result<Option<Vec<Article>>> {
        let Some((articles, fetched_at)) = self.load(feed)? else {
            return Ok(None);
        };
        if now - fetched_at >= self.ttl {
            tracing::debug!(feed, "feed cache expired");
            return Ok(None);
        }
        Ok(Some(articles))
    }

    pub fn put(&self, feed: &str, articles: &[Article], now: DateTime<Utc>) -> Result<()> {
        let json = serde_json::to_string(articles)?;
        self.db.conn().execute(
            "INSERT OR REPLACE INTO article_cache (feed, articles, fetched_at) VALUES (?1, ?2, ?3)",
            params![feed, json, now.to_rfc3339()],
        )?;
        tracing::debug!(feed, count = articles.len(), "feed cached");
        Ok(())
    }

    /// Look an article up across every cached feed, regardless of age.
    pub fn find(&self, id: Uuid) -> Result<Option<Article>> {
        let mut stmt = self.db.conn().prepare("SELECT articles FROM article_cache")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        for row in rows {
            let articles: Vec<Article> = match serde_json::from_str(&row?) {
                Ok(articles) => articles,
                Err(e) => {
                    tracing::warn!("ignoring undecodable cached feed: {e}");
                    continue;
                }
            };
            if let Some(article) = articles.into_iter().find(|a| a.id == id) {
                return Ok(Some(article));
            }
        }
        Ok(None)
    }

    pub fn clear(&self) -> Result<()> {
        self.db.conn().execute("DELETE FROM article_cache", [])?;
        Ok(())
    }

    fn load(&self, feed: &str) -> Result<Option<(Vec<Article>, DateTime<Utc>)>> {
        let row = self
            .db
            .conn()
            .query_row(
                "SELECT articles, fetched_at FROM article_cache WHERE feed = ?1",
                params![feed],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((json, fetched_at)) = row else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(articles) => Ok(Some((articles, parse_timestamp(&fetched_at)?))),
            Err(e) => {
                tracing::warn!(feed, "ignoring undecodable cached feed: {e}");
                Ok(None)
            }
        }
    }
}
