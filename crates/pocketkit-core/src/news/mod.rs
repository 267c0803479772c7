//! TechFizz: a Hacker News reader with category filters, search,
//! bookmarks and notifications.

pub mod article;
mod bookmarks;
pub mod cache;
mod client;
mod feed;
pub mod notifications;

pub use article::{article_id, Article, Category, HnItem};
pub use bookmarks::ArticleBookmarks;
pub use cache::FeedCache;
pub use client::{NewsClient, CATEGORY_LIMIT, DEFAULT_BASE_URL, LATEST_LIMIT};
pub use feed::{search, CategorySelection, NewsFeed};
