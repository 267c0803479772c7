use clap::Subcommand;
use pocketkit_core::breath::sync_reminder;
use pocketkit_core::notify::SqliteNotificationCenter;
use pocketkit_core::vocab::resync_reminder;
use pocketkit_core::{Config, Database};

use super::vocab::load_deck;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dotted key (e.g. "breath.reminder_hour", "news.region")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

/// Keep pending reminders in step with the settings under `key`, or with
/// every section when `key` is `None`.
fn sync_reminders(config: &Config, key: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let touches = |section: &str| key.map_or(true, |k| k.starts_with(section));
    if !touches("breath.") && !touches("vocab.") {
        return Ok(());
    }
    let db = Database::open()?;
    let center = SqliteNotificationCenter::new(&db);
    if touches("breath.") {
        sync_reminder(&center, &config.breath)?;
    }
    if touches("vocab.") {
        let deck = load_deck(&db, &config.vocab)?;
        resync_reminder(&db, &deck, &center, &config.vocab)?;
    }
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            sync_reminders(&config, Some(&key))?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            sync_reminders(&config, None)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
