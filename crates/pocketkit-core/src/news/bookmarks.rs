use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use super::article::{Article, Category};
use crate::error::{DatabaseError, Result};
use crate::storage::database::{parse_timestamp, parse_uuid, Database};

/// Bookmarked articles, stored in full so they stay readable offline.
pub struct ArticleBookmarks<'a> {
    db: &'a Database,
}

impl<'a> ArticleBookmarks<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Returns `true` when the article was not bookmarked before.
    pub fn add(&self, article: &Article) -> Result<bool> {
        let inserted = self.db.conn().execute(
            "INSERT OR IGNORE INTO article_bookmarks
                (id, hn_id, title, summary, content, author, publish_date,
                 image_url, source_url, category, bookmarked_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                article.id.to_string(),
                article.hn_id,
                article.title,
                article.summary,
                article.content,
                article.author,
                article.publish_date.to_rfc3339(),
                article.image_url,
                article.source_url,
                article.category.key(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if inserted > 0 {
            tracing::debug!(id = %article.id, "article bookmarked");
        }
        Ok(inserted > 0)
    }

    /// Returns `true` when a bookmark was removed.
    pub fn remove(&self, id: Uuid) -> Result<bool> {
        let removed = self.db.conn().execute(
            "DELETE FROM article_bookmarks WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }

    pub fn remove_many(&self, ids: &[Uuid]) -> Result<usize> {
        let tx = self.db.conn().unchecked_transaction()?;
        let mut removed = 0;
        for id in ids {
            removed += tx.execute(
                "DELETE FROM article_bookmarks WHERE id = ?1",
                params![id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Flip the bookmark; returns whether the article is bookmarked afterwards.
    pub fn toggle(&self, article: &Article) -> Result<bool> {
        if self.is_bookmarked(article.id)? {
            self.remove(article.id)?;
            Ok(false)
        } else {
            self.add(article)?;
            Ok(true)
        }
    }

    pub fn is_bookmarked(&self, id: Uuid) -> Result<bool> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM article_bookmarks WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All bookmarks, newest publication first.
    pub fn list(&self) -> Result<Vec<Article>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, hn_id, title, summary, content, author, publish_date,
                    image_url, source_url, category
             FROM article_bookmarks
             ORDER BY publish_date DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?;

        let mut articles = Vec::new();
        for row in rows {
            let (id, hn_id, title, summary, content, author, publish_date, image_url, source_url, category) = row?;
            articles.push(Article {
                id: parse_uuid(&id)?,
                hn_id,
                title,
                summary,
                content,
                author,
                publish_date: parse_timestamp(&publish_date)?,
                image_url,
                source_url,
                category: category
                    .parse::<Category>()
                    .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?,
            });
        }
        Ok(articles)
    }
}
