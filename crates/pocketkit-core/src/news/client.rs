//! Hacker News client.
//!
//! Story lists are fetched first; the items are then fetched concurrently,
//! converted to [`Article`]s and returned newest first. A failing item is
//! logged and skipped. A failing story list fails the whole call.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use url::Url;

use super::article::{Article, Category, HnItem};
use crate::error::NewsError;

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Stories fetched for the home feed.
pub const LATEST_LIMIT: usize = 20;
/// Stories fetched per category.
pub const CATEGORY_LIMIT: usize = 15;

#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    base: Url,
}

impl NewsClient {
    pub fn new(base_url: &str) -> Result<Self, NewsError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| NewsError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, NewsError> {
        self.base
            .join(path)
            .map_err(|e| NewsError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, NewsError> {
        tracing::debug!(%url, "GET");
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NewsError::InvalidResponse {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| NewsError::Decoding(format!("{url}: {e}")))
    }

    /// Story ids of a feed such as `topstories`.
    pub async fn fetch_story_ids(&self, feed: &str) -> Result<Vec<u64>, NewsError> {
        let url = self.endpoint(&format!("{feed}.json"))?;
        self.get_json(url).await
    }

    /// One item as an article. Deleted items, jobs and untitled items are `None`.
    pub async fn fetch_story(&self, id: u64) -> Result<Option<Article>, NewsError> {
        let url = self.endpoint(&format!("item/{id}.json"))?;
        let item: Option<HnItem> = self.get_json(url).await?;
        Ok(item.as_ref().and_then(Article::from_item))
    }

    pub async fn fetch_latest(&self) -> Result<Vec<Article>, NewsError> {
        self.fetch_feed("topstories", LATEST_LIMIT).await
    }

    pub async fn fetch_by_category(&self, category: Category) -> Result<Vec<Article>, NewsError> {
        self.fetch_feed(category.endpoint(), CATEGORY_LIMIT).await
    }

    async fn fetch_feed(&self, feed: &str, limit: usize) -> Result<Vec<Article>, NewsError> {
        let ids = self.fetch_story_ids(feed).await?;

        let mut tasks = JoinSet::new();
        for id in ids.into_iter().take(limit) {
            let client = self.clone();
            tasks.spawn(async move { (id, client.fetch_story(id).await) });
        }

        let mut articles = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Some(article)))) => articles.push(article),
                Ok((_, Ok(None))) => {}
                Ok((id, Err(e))) => tracing::warn!(id, feed, "skipping story: {e}"),
                Err(e) => tracing::warn!(feed, "story fetch task failed: {e}"),
            }
        }

        articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        tracing::debug!(feed, count = articles.len(), "feed fetched");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: u64, time: i64, title: &str) -> String {
        format!(r#"{{"id": {id}, "type": "story", "by": "pg", "time": {time}, "title": "{title}"}}"#)
    }

    #[tokio::test]
    async fn latest_is_sorted_and_skips_bad_items() {
        let mut server = mockito::Server::new_async().await;
        let _ids = server
            .mock("GET", "/topstories.json")
            .with_status(200)
            .with_body("[1, 2, 3, 4]")
            .create_async()
            .await;
        let _one = server
            .mock("GET", "/item/1.json")
            .with_body(story(1, 100, "Older"))
            .create_async()
            .await;
        let _two = server
            .mock("GET", "/item/2.json")
            .with_body(story(2, 200, "Newer"))
            .create_async()
            .await;
        let _three = server
            .mock("GET", "/item/3.json")
            .with_status(500)
            .create_async()
            .await;
        let _four = server
            .mock("GET", "/item/4.json")
            .with_body(r#"{"id": 4, "type": "job", "time": 300, "title": "Hiring"}"#)
            .create_async()
            .await;

        let client = NewsClient::new(&server.url()).unwrap();
        let articles = client.fetch_latest().await.unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn failing_id_list_fails_the_call() {
        let mut server = mockito::Server::new_async().await;
        let _ids = server
            .mock("GET", "/showstories.json")
            .with_status(503)
            .create_async()
            .await;

        let client = NewsClient::new(&server.url()).unwrap();
        let err = client.fetch_by_category(Category::Startups).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidResponse { status: 503, .. }));
    }

    #[tokio::test]
    async fn category_feed_takes_fifteen() {
        let mut server = mockito::Server::new_async().await;
        let ids: Vec<String> = (1..=30).map(|n| n.to_string()).collect();
        let _ids = server
            .mock("GET", "/beststories.json")
            .with_body(format!("[{}]", ids.join(",")))
            .create_async()
            .await;
        let items = server
            .mock("GET", mockito::Matcher::Regex(r"^/item/\d+\.json$".into()))
            .with_body(story(0, 1, "Any"))
            .expect(15)
            .create_async()
            .await;

        let client = NewsClient::new(&server.url()).unwrap();
        let articles = client.fetch_by_category(Category::Ai).await.unwrap();
        assert_eq!(articles.len(), 15);
        items.assert_async().await;
    }

    #[tokio::test]
    async fn deleted_item_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/item/9.json")
            .with_body("null")
            .create_async()
            .await;
        let client = NewsClient::new(&server.url()).unwrap();
        assert!(client.fetch_story(9).await.unwrap().is_none());
    }

    #[test]
    fn base_url_keeps_its_path() {
        let client = NewsClient::new("https://example.com/v0").unwrap();
        assert_eq!(
            client.endpoint("topstories.json").unwrap().as_str(),
            "https://example.com/v0/topstories.json"
        );
        assert!(NewsClient::new("not a url").is_err());
    }
}
