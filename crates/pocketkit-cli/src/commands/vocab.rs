use chrono::{Local, Utc};
use clap::Subcommand;
use pocketkit_core::notify::SqliteNotificationCenter;
use pocketkit_core::storage::VocabConfig;
use pocketkit_core::vocab::{self, share_text, AccountStore, Phrase, PhraseBookmarks, PhraseDeck};
use pocketkit_core::{Config, Database};
use serde_json::{json, Value};
use uuid::Uuid;

use super::print_json;

const CURRENT_KEY: &str = "current_phrase";

#[derive(Subcommand)]
pub enum VocabAction {
    /// Move to a random phrase other than the current one
    Next,
    /// Show a phrase (the current one by default)
    Show { id: Option<Uuid> },
    /// Today's word, drawn once per day
    WordOfDay,
    /// Reschedule the daily reminder for today's word, or cancel it when off
    Reminder,
    /// Toggle a phrase bookmark (the current phrase by default)
    Bookmark { id: Option<Uuid> },
    /// Bookmarked phrases
    Bookmarks,
    /// Print the share text for a phrase
    Share { id: Option<Uuid> },
    /// Local account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Restore the default card preferences
    PrefsReset,
}

#[derive(Subcommand)]
pub enum AccountAction {
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signout,
    /// Copy the current bookmarks into the account
    Sync,
    Show,
}

fn card(phrase: &Phrase, config: &VocabConfig, bookmarked: bool) -> Value {
    let mut card = json!({
        "id": phrase.id,
        "word": phrase.word,
        "phrase": phrase.phrase,
        "bookmarked": bookmarked,
        "font": {
            "word": config.font_size.word_points(),
            "body": config.font_size.body_points(),
        },
    });
    if config.show_usage_examples {
        card["usage"] = json!(phrase.usage);
    }
    card
}

/// The deck with the last shown phrase restored.
pub(crate) fn load_deck(db: &Database, config: &VocabConfig) -> Result<PhraseDeck, Box<dyn std::error::Error>> {
    let mut deck = PhraseDeck::load(config)?;
    if let Some(id) = db.kv_get_json::<Uuid>(CURRENT_KEY)? {
        if deck.set_current(id).is_err() {
            tracing::debug!(%id, "last phrase is no longer in the deck");
        }
    }
    Ok(deck)
}

/// `id`, or the current phrase, or the first one.
fn pick(deck: &PhraseDeck, id: Option<Uuid>) -> Result<Phrase, Box<dyn std::error::Error>> {
    let phrase = match id {
        Some(id) => deck.get(id),
        None => deck.current().or_else(|| deck.phrases().first()),
    };
    Ok(phrase.cloned().ok_or("no such phrase")?)
}

pub fn run(action: VocabAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut config = Config::load()?;
    let bookmarks = PhraseBookmarks::new(&db);

    match action {
        VocabAction::Next => {
            let mut deck = load_deck(&db, &config.vocab)?;
            let phrase = deck
                .shuffle_next(&mut rand::thread_rng())
                .cloned()
                .ok_or("the phrase list is empty")?;
            db.kv_set_json(CURRENT_KEY, &phrase.id)?;
            let marked = bookmarks.load()?.contains(&phrase.id);
            print_json(&card(&phrase, &config.vocab, marked))?;
        }
        VocabAction::Show { id } => {
            let deck = load_deck(&db, &config.vocab)?;
            let phrase = pick(&deck, id)?;
            let marked = bookmarks.load()?.contains(&phrase.id);
            print_json(&card(&phrase, &config.vocab, marked))?;
        }
        VocabAction::WordOfDay => {
            if !config.vocab.show_word_of_the_day {
                println!("{{\"type\": \"word_of_day_hidden\"}}");
                return Ok(());
            }
            let deck = load_deck(&db, &config.vocab)?;
            let center = SqliteNotificationCenter::new(&db);
            let phrase = vocab::check_and_update(
                &db,
                &deck,
                &center,
                &config.vocab,
                Utc::now(),
                &Local,
                &mut rand::thread_rng(),
            )?
            .ok_or("the phrase list is empty")?;
            let marked = bookmarks.load()?.contains(&phrase.id);
            print_json(&card(&phrase, &config.vocab, marked))?;
        }
        VocabAction::Reminder => {
            let deck = load_deck(&db, &config.vocab)?;
            let center = SqliteNotificationCenter::new(&db);
            let reminder = match vocab::check_and_update(
                &db,
                &deck,
                &center,
                &config.vocab,
                Utc::now(),
                &Local,
                &mut rand::thread_rng(),
            )? {
                Some(phrase) => vocab::schedule_reminder(&center, &config.vocab, &phrase)?,
                None => vocab::resync_reminder(&db, &deck, &center, &config.vocab)?,
            };
            match reminder {
                Some(reminder) => print_json(&reminder)?,
                None => println!("{{\"type\": \"reminder_disabled\"}}"),
            }
        }
        VocabAction::Bookmark { id } => {
            let deck = load_deck(&db, &config.vocab)?;
            let phrase = pick(&deck, id)?;
            let marked = bookmarks.toggle(phrase.id)?;
            print_json(&json!({ "id": phrase.id, "word": phrase.word, "bookmarked": marked }))?;
        }
        VocabAction::Bookmarks => {
            let deck = load_deck(&db, &config.vocab)?;
            let marked = bookmarks.load()?;
            print_json(&deck.bookmarked(&marked))?;
        }
        VocabAction::Share { id } => {
            let deck = load_deck(&db, &config.vocab)?;
            println!("{}", share_text(&pick(&deck, id)?));
        }
        VocabAction::Account { action } => {
            let accounts = AccountStore::new(&db);
            match action {
                AccountAction::Signup {
                    email,
                    name,
                    password,
                } => {
                    let account = accounts.sign_up(&email, &name, &password, bookmarks.load()?)?;
                    print_json(&account)?;
                }
                AccountAction::Signin { email, password } => {
                    print_json(&accounts.sign_in(&email, &password)?)?;
                }
                AccountAction::Signout => {
                    accounts.sign_out()?;
                    println!("{{\"type\": \"signed_out\"}}");
                }
                AccountAction::Sync => {
                    print_json(&accounts.sync(&bookmarks.load()?)?)?;
                }
                AccountAction::Show => match accounts.current()? {
                    Some(account) => print_json(&account)?,
                    None => println!("{{\"type\": \"signed_out\"}}"),
                },
            }
        }
        VocabAction::PrefsReset => {
            config.vocab.reset_preferences();
            config.save()?;
            let deck = load_deck(&db, &config.vocab)?;
            vocab::resync_reminder(&db, &deck, &SqliteNotificationCenter::new(&db), &config.vocab)?;
            print_json(&config.vocab)?;
        }
    }
    Ok(())
}
