//! # pocketkit core library
//!
//! Business logic for three small apps sharing one storage layer:
//!
//! - **breath**: a breathing timer. [`BreathEngine`] is a wall-clock state
//!   machine; the caller invokes `tick()` to advance it and receives
//!   [`Event`]s for phase changes and completion.
//! - **news**: a Hacker News reader with category filters, search, a feed
//!   cache and bookmarks.
//! - **vocab**: vocabulary flashcards with bookmarks, a word of the day and a
//!   local account.
//!
//! Everything persists in one SQLite [`Database`] plus a TOML [`Config`].
//! Reminders go through a [`NotificationCenter`].

pub mod breath;
pub mod error;
pub mod events;
pub mod news;
pub mod notify;
pub mod storage;
pub mod vocab;

pub use breath::{BreathEngine, BreathPattern, BreathSession, BreathState};
pub use error::{AccountError, ConfigError, CoreError, DatabaseError, NewsError, ValidationError};
pub use events::Event;
pub use news::{Article, Category, NewsClient, NewsFeed};
pub use notify::{AppKind, Notification, NotificationCenter, SqliteNotificationCenter, Trigger};
pub use storage::{Config, Database};
pub use vocab::{Phrase, PhraseDeck};
