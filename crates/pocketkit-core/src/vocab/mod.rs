//! WordSubs: vocabulary flashcards with bookmarks, a word of the day and a
//! local account.

mod account;
mod deck;
mod phrase;
pub mod word_of_day;

pub use account::{AccountStore, UserAccount};
pub use deck::{share_text, PhraseBookmarks, PhraseDeck};
pub use phrase::Phrase;
pub use word_of_day::{check_and_update, resync_reminder, schedule_reminder, WordOfDay};
