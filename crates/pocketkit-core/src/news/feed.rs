//! Home feed, category feeds and search, with caching and the
//! breaking-news notification.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::article::{Article, Category};
use super::cache::{category_feed, FeedCache, LATEST_FEED};
use super::client::NewsClient;
use super::notifications;
use crate::error::Result;
use crate::notify::NotificationCenter;
use crate::storage::{Database, NewsConfig};

/// Categories picked on the categories screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    selected: BTreeSet<Category>,
}

impl CategorySelection {
    /// The saved selection. Before the first apply nothing is selected,
    /// whatever the config file says.
    pub fn from_config(config: &NewsConfig) -> Self {
        let selected = if config.has_launched_before {
            config.selected_categories.iter().copied().collect()
        } else {
            BTreeSet::new()
        };
        Self { selected }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.selected.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.selected.iter().copied()
    }

    /// Returns whether the category is selected afterwards.
    pub fn toggle(&mut self, category: Category) -> bool {
        if self.selected.remove(&category) {
            false
        } else {
            self.selected.insert(category);
            true
        }
    }

    /// Write the selection into the config and mark the first launch done.
    pub fn apply(&self, config: &mut NewsConfig) {
        config.selected_categories = self.selected.iter().copied().collect();
        config.has_launched_before = true;
    }

    /// Everything when nothing is selected, else only selected categories.
    pub fn filter(&self, articles: Vec<Article>) -> Vec<Article> {
        if self.selected.is_empty() {
            return articles;
        }
        articles
            .into_iter()
            .filter(|a| self.selected.contains(&a.category))
            .collect()
    }
}

/// Articles whose title or summary contains `query`. An empty query finds
/// nothing.
pub fn search(articles: &[Article], query: &str) -> Vec<Article> {
    if query.is_empty() {
        return Vec::new();
    }
    articles.iter().filter(|a| a.matches(query)).cloned().collect()
}

/// Feed loading over the client and the cache.
pub struct NewsFeed<'a> {
    client: &'a NewsClient,
    db: &'a Database,
    config: &'a NewsConfig,
}

impl<'a> NewsFeed<'a> {
    pub fn new(client: &'a NewsClient, db: &'a Database, config: &'a NewsConfig) -> Self {
        Self { client, db, config }
    }

    fn cache(&self) -> FeedCache<'a> {
        FeedCache::new(self.db, self.config.cache_ttl_secs)
    }

    /// The latest stories, from cache when fresh unless `refresh` is set.
    pub async fn latest(&self, refresh: bool, now: DateTime<Utc>) -> Result<Vec<Article>> {
        let cache = self.cache();
        if !refresh {
            if let Some(articles) = cache.get(LATEST_FEED, now)? {
                tracing::debug!("latest feed served from cache");
                return Ok(articles);
            }
        }
        let articles = self.client.fetch_latest().await?;
        cache.put(LATEST_FEED, &articles, now)?;
        Ok(articles)
    }

    pub async fn category(
        &self,
        category: Category,
        refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Article>> {
        let cache = self.cache();
        let key = category_feed(category);
        if !refresh {
            if let Some(articles) = cache.get(&key, now)? {
                return Ok(articles);
            }
        }
        let articles = self.client.fetch_by_category(category).await?;
        cache.put(&key, &articles, now)?;
        Ok(articles)
    }

    /// The home screen: latest stories filtered by the saved selection.
    /// With breaking-news notifications on, the first article is announced.
    pub async fn home(
        &self,
        center: &dyn NotificationCenter,
        refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Article>> {
        let selection = CategorySelection::from_config(self.config);
        let articles = selection.filter(self.latest(refresh, now).await?);
        if let Some(first) = articles.first() {
            notifications::breaking_news(center, self.config, first)?;
        }
        Ok(articles)
    }

    pub async fn search(&self, query: &str, now: DateTime<Utc>) -> Result<Vec<Article>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(search(&self.latest(false, now).await?, query))
    }

    /// Resolve an article by id from any cached feed.
    pub fn cached(&self, id: uuid::Uuid) -> Result<Option<Article>> {
        self.cache().find(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::article::article_id;
    use crate::notify::SqliteNotificationCenter;
    use crate::storage::Config;

    fn article(hn_id: u64, title: &str, summary: &str, category: Category) -> Article {
        Article {
            id: article_id(hn_id),
            hn_id,
            title: title.into(),
            summary: summary.into(),
            content: String::new(),
            author: "pg".into(),
            publish_date: Utc::now(),
            image_url: None,
            source_url: None,
            category,
        }
    }

    #[test]
    fn saved_selection_needs_first_launch() {
        let mut config = Config::default().news;
        config.selected_categories = vec![Category::Gaming];
        assert!(CategorySelection::from_config(&config).is_empty());

        config.has_launched_before = true;
        assert!(CategorySelection::from_config(&config).contains(Category::Gaming));
    }

    #[test]
    fn toggle_then_apply() {
        let mut config = Config::default().news;
        let mut selection = CategorySelection::default();
        assert!(selection.toggle(Category::Ai));
        assert!(selection.toggle(Category::Startups));
        assert!(!selection.toggle(Category::Ai));
        selection.apply(&mut config);
        assert!(config.has_launched_before);
        assert_eq!(config.selected_categories, vec![Category::Startups]);
    }

    #[test]
    fn filter_and_search() {
        let articles = vec![
            article(1, "Rust in the kernel", "Linux news", Category::Software),
            article(2, "New console", "A gaming handheld", Category::Gaming),
        ];
        let mut selection = CategorySelection::default();
        assert_eq!(selection.filter(articles.clone()).len(), 2);
        selection.toggle(Category::Gaming);
        assert_eq!(selection.filter(articles.clone())[0].hn_id, 2);

        assert!(search(&articles, "").is_empty());
        assert_eq!(search(&articles, "KERNEL")[0].hn_id, 1);
        assert_eq!(search(&articles, "handheld")[0].hn_id, 2);
        assert!(search(&articles, "quantum").is_empty());
    }

    #[test]
    fn search_matches_the_query_as_typed() {
        let articles = vec![article(1, "Rust in the kernel", "Linux news", Category::Software)];
        assert_eq!(search(&articles, " kernel").len(), 1);
        assert!(search(&articles, " kernel ").is_empty());
        assert!(search(&articles, "  ").is_empty());
    }

    #[tokio::test]
    async fn home_uses_cache_and_announces_first_story() {
        let mut server = mockito::Server::new_async().await;
        let ids = server
            .mock("GET", "/topstories.json")
            .with_body("[5]")
            .expect(1)
            .create_async()
            .await;
        let _item = server
            .mock("GET", "/item/5.json")
            .with_body(r#"{"id": 5, "type": "story", "time": 10, "title": "Big launch"}"#)
            .create_async()
            .await;

        let db = Database::open_memory().unwrap();
        let center = SqliteNotificationCenter::new(&db);
        let mut config = Config::default().news;
        config.notify_breaking_news = true;
        let client = NewsClient::new(&server.url()).unwrap();
        let feed = NewsFeed::new(&client, &db, &config);

        let now = Utc::now();
        let first = feed.home(&center, false, now).await.unwrap();
        let second = feed.home(&center, false, now).await.unwrap();
        assert_eq!(first, second);
        ids.assert_async().await;

        let pending = center.pending().unwrap();
        assert!(pending.iter().all(|n| n.title == "Breaking News!"));
        assert_eq!(pending[0].body, "Big launch\nBig launch");
        assert!(feed.cached(article_id(5)).unwrap().is_some());
    }
}
