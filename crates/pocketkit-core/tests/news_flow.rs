//! Fetch a category against a mock Hacker News server, then bookmark
//! and search the result offline.

use chrono::Utc;
use pocketkit_core::news::{self, ArticleBookmarks, Category, NewsClient, NewsFeed};
use pocketkit_core::notify::{NotificationCenter, SqliteNotificationCenter};
use pocketkit_core::{Config, Database};

#[tokio::test]
async fn category_feed_then_bookmark() {
    let mut server = mockito::Server::new_async().await;
    let _ids = server
        .mock("GET", "/showstories.json")
        .with_body("[41, 42]")
        .create_async()
        .await;
    let _a = server
        .mock("GET", "/item/41.json")
        .with_body(r#"{"id": 41, "type": "story", "by": "dang", "time": 1700000100, "title": "Show HN: A tiny editor", "text": "Vim or <i>Emacs</i>?"}"#)
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/item/42.json")
        .with_body("null")
        .create_async()
        .await;

    let db = Database::open_memory().unwrap();
    let mut config = Config::default().news;
    config.notify_bookmarks = true;
    let client = NewsClient::new(&server.url()).unwrap();
    let feed = NewsFeed::new(&client, &db, &config);

    let articles = feed.category(Category::Startups, false, Utc::now()).await.unwrap();
    assert_eq!(articles.len(), 1);
    let article = &articles[0];
    assert_eq!(article.summary, "Vim or Emacs?");
    assert_eq!(feed.cached(article.id).unwrap().as_ref(), Some(article));

    let bookmarks = ArticleBookmarks::new(&db);
    assert!(bookmarks.add(article).unwrap());
    assert!(!bookmarks.add(article).unwrap());
    let center = SqliteNotificationCenter::new(&db);
    news::notifications::bookmark_added(&center, &config, article).unwrap();
    assert_eq!(center.pending().unwrap().len(), 1);

    assert_eq!(bookmarks.list().unwrap(), vec![article.clone()]);
    assert_eq!(news::search(&articles, "emacs").len(), 1);
}
