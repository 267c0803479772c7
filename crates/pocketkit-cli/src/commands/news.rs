use chrono::Utc;
use clap::Subcommand;
use pocketkit_core::news::{
    notifications, ArticleBookmarks, Category, CategorySelection, FeedCache, NewsClient, NewsFeed,
};
use pocketkit_core::notify::SqliteNotificationCenter;
use pocketkit_core::{Config, Database};
use serde_json::json;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum NewsAction {
    /// Latest stories, filtered by the selected categories
    Latest {
        /// Bypass the feed cache
        #[arg(long)]
        refresh: bool,
    },
    /// Stories of one category
    Category {
        category: Category,
        #[arg(long)]
        refresh: bool,
    },
    /// List categories, or toggle some and save the selection
    Categories {
        /// Categories to toggle
        #[arg(long = "toggle")]
        toggle: Vec<Category>,
    },
    /// Search the latest stories by title or summary
    Search { query: String },
    /// Show one cached or bookmarked article
    Show { id: Uuid },
    /// Article bookmarks
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Schedule a sample notification
    TestNotification,
    /// Drop every cached feed
    ClearCache,
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// Bookmark a cached article
    Add { id: Uuid },
    /// Remove bookmarks
    Remove {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Bookmarks, newest published first
    List,
}

pub fn run(action: NewsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut config = Config::load()?;
    let center = SqliteNotificationCenter::new(&db);

    match action {
        NewsAction::Categories { toggle } => {
            let mut selection = CategorySelection::from_config(&config.news);
            if !toggle.is_empty() {
                for category in toggle {
                    selection.toggle(category);
                }
                selection.apply(&mut config.news);
                config.save()?;
            }
            let categories: Vec<_> = Category::ALL
                .iter()
                .map(|c| {
                    json!({
                        "key": c.key(),
                        "name": c.display_name(),
                        "selected": selection.contains(*c),
                    })
                })
                .collect();
            print_json(&categories)?;
        }
        NewsAction::Bookmark { action } => {
            let bookmarks = ArticleBookmarks::new(&db);
            match action {
                BookmarkAction::Add { id } => {
                    let client = NewsClient::new(&config.news.api_base_url)?;
                    let feed = NewsFeed::new(&client, &db, &config.news);
                    let article = feed
                        .cached(id)?
                        .ok_or_else(|| format!("article {id} is not in any cached feed"))?;
                    if bookmarks.add(&article)? {
                        notifications::bookmark_added(&center, &config.news, &article)?;
                    }
                    print_json(&article)?;
                }
                BookmarkAction::Remove { ids } => {
                    let removed = bookmarks.remove_many(&ids)?;
                    print_json(&json!({ "removed": removed }))?;
                }
                BookmarkAction::List => print_json(&bookmarks.list()?)?,
            }
        }
        NewsAction::Show { id } => {
            let client = NewsClient::new(&config.news.api_base_url)?;
            let feed = NewsFeed::new(&client, &db, &config.news);
            let article = match feed.cached(id)? {
                Some(article) => Some(article),
                None => ArticleBookmarks::new(&db)
                    .list()?
                    .into_iter()
                    .find(|a| a.id == id),
            };
            let article = article.ok_or_else(|| format!("article {id} not found"))?;
            let bookmarked = ArticleBookmarks::new(&db).is_bookmarked(id)?;
            print_json(&json!({ "article": article, "bookmarked": bookmarked }))?;
        }
        NewsAction::ClearCache => {
            FeedCache::new(&db, config.news.cache_ttl_secs).clear()?;
            println!("ok");
        }
        NewsAction::TestNotification => {
            print_json(&notifications::test_notification(&center)?)?;
        }
        NewsAction::Latest { refresh } => {
            let client = NewsClient::new(&config.news.api_base_url)?;
            let feed = NewsFeed::new(&client, &db, &config.news);
            let rt = tokio::runtime::Runtime::new()?;
            let articles = rt.block_on(feed.home(&center, refresh, Utc::now()))?;
            print_json(&articles)?;
        }
        NewsAction::Category { category, refresh } => {
            let client = NewsClient::new(&config.news.api_base_url)?;
            let feed = NewsFeed::new(&client, &db, &config.news);
            let rt = tokio::runtime::Runtime::new()?;
            let articles = rt.block_on(feed.category(category, refresh, Utc::now()))?;
            print_json(&articles)?;
        }
        NewsAction::Search { query } => {
            let client = NewsClient::new(&config.news.api_base_url)?;
            let feed = NewsFeed::new(&client, &db, &config.news);
            let rt = tokio::runtime::Runtime::new()?;
            let articles = rt.block_on(feed.search(&query, Utc::now()))?;
            print_json(&articles)?;
        }
    }
    Ok(())
}
