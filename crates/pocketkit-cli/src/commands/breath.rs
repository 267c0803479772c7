use std::time::Duration;

use chrono::{Local, Utc};
use clap::Subcommand;
use pocketkit_core::breath::{
    self, catalog, phase_at, sync_reminder, BreathEngine, BreathPattern, BreathSession,
    BreathState, QuickPicks, TimeRange,
};
use pocketkit_core::notify::SqliteNotificationCenter;
use pocketkit_core::{Config, Database, Event};
use serde_json::json;

use super::print_json;

const ENGINE_KEY: &str = "breath_engine";

#[derive(Subcommand)]
pub enum BreathAction {
    /// List the breathing patterns
    Patterns,
    /// Show the routine catalog grouped by category
    Catalog,
    /// Print the phase shown at each remaining second
    Frames {
        pattern: BreathPattern,
        /// Remaining seconds to start from (defaults to the routine length)
        #[arg(long)]
        from: Option<u32>,
        /// Number of seconds to print (defaults to one cycle)
        #[arg(long)]
        count: Option<u32>,
    },
    /// Run a session in the foreground, printing events as they happen
    Run {
        pattern: BreathPattern,
        /// Session length in seconds (defaults to the routine length)
        #[arg(long)]
        secs: Option<u64>,
    },
    /// Start a background session
    Start {
        pattern: BreathPattern,
        /// Session length in seconds (defaults to the routine length)
        #[arg(long)]
        secs: Option<u64>,
    },
    /// Pause the current session
    Pause,
    /// Resume the current session
    Resume,
    /// Print the current session state as JSON
    Status,
    /// End the current session and record it
    Finish,
    /// Progress over a time range
    History {
        /// week, month, year or all
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },
    /// Session count and total minutes
    Stats,
    /// Quick-access routines
    Picks {
        #[command(subcommand)]
        action: PicksAction,
    },
    /// Apply the daily reminder preferences
    Reminder,
}

#[derive(Subcommand)]
pub enum PicksAction {
    List,
    Add { pattern: BreathPattern },
    Remove { pattern: BreathPattern },
}

fn load_engine(db: &Database) -> Option<BreathEngine> {
    match db.kv_get_json::<BreathEngine>(ENGINE_KEY) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::warn!("discarding unreadable session state: {e}");
            None
        }
    }
}

fn save_engine(db: &Database, engine: &BreathEngine) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set_json(ENGINE_KEY, engine)?;
    Ok(())
}

fn engine_for(pattern: BreathPattern, secs: Option<u64>) -> BreathEngine {
    match secs {
        Some(secs) => BreathEngine::with_duration(pattern, secs),
        None => BreathEngine::new(pattern.routine()),
    }
}

fn ended(session: &BreathSession) -> Event {
    Event::SessionEnded {
        session_id: session.id,
        routine_title: session.routine_title.clone(),
        duration_secs: session.duration_secs,
        at: session.date,
    }
}

fn record(db: &Database, session: &BreathSession) -> Result<(), Box<dyn std::error::Error>> {
    db.record_session(session)?;
    print_json(&ended(session))
}

/// Catch the stored engine up with the clock, apply `command` and save it.
fn step(
    command: impl FnOnce(&mut BreathEngine) -> Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let Some(mut engine) = load_engine(&db) else {
        return Err("no breathing session; start one first".into());
    };
    let mut events = engine.tick();
    events.extend(command(&mut engine));
    for event in &events {
        print_json(event)?;
    }
    print_json(&engine.snapshot())?;
    save_engine(&db, &engine)
}

pub fn run(action: BreathAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BreathAction::Patterns => {
            let patterns: Vec<_> = BreathPattern::ALL
                .iter()
                .map(|p| {
                    json!({
                        "key": p.key(),
                        "routine": p.routine().title,
                        "duration_secs": p.routine().duration_secs,
                        "cycle_secs": p.cycle_secs(),
                        "animation_secs": p.animation_secs(),
                        "gradient": p.gradient(),
                    })
                })
                .collect();
            print_json(&patterns)?;
        }
        BreathAction::Catalog => print_json(catalog())?,
        BreathAction::Frames {
            pattern,
            from,
            count,
        } => {
            let default_from = u32::try_from(pattern.routine().duration_secs).unwrap_or(u32::MAX);
            let from = from.unwrap_or(default_from);
            let count = count.unwrap_or_else(|| pattern.cycle_secs());
            let frames: Vec<_> = (0..count)
                .map_while(|i| from.checked_sub(i))
                .map(|secs| json!({ "remaining_secs": secs, "frame": phase_at(pattern, secs) }))
                .collect();
            print_json(&frames)?;
        }
        BreathAction::Run { pattern, secs } => {
            let db = Database::open()?;
            let mut engine = engine_for(pattern, secs);
            let rt = tokio::runtime::Runtime::new()?;
            let session = rt.block_on(async {
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                interval.tick().await;
                if let Some(event) = engine.start() {
                    println!("{}", serde_json::to_string(&event)?);
                }
                loop {
                    interval.tick().await;
                    for event in engine.tick() {
                        println!("{}", serde_json::to_string(&event)?);
                    }
                    if engine.state() == BreathState::Completed {
                        break;
                    }
                }
                Ok::<_, Box<dyn std::error::Error>>(engine.finish())
            })?;
            if let Some(session) = session {
                record(&db, &session)?;
            }
        }
        BreathAction::Start { pattern, secs } => {
            let db = Database::open()?;
            if let Some(mut stored) = load_engine(&db) {
                stored.tick();
                match stored.state() {
                    BreathState::Running | BreathState::Paused => {
                        return Err(format!(
                            "a {} session is already in progress; finish it first",
                            stored.pattern()
                        )
                        .into());
                    }
                    // A countdown that ran out while nobody was looking still counts.
                    BreathState::Completed => {
                        if let Some(session) = stored.finish() {
                            record(&db, &session)?;
                        }
                    }
                    BreathState::Idle => {}
                }
            }
            let mut engine = engine_for(pattern, secs);
            engine.start();
            save_engine(&db, &engine)?;
            print_json(&engine.snapshot())?;
        }
        BreathAction::Pause => step(BreathEngine::pause)?,
        BreathAction::Resume => step(BreathEngine::resume)?,
        BreathAction::Status => step(|_| None)?,
        BreathAction::Finish => {
            let db = Database::open()?;
            let Some(mut engine) = load_engine(&db) else {
                return Err("no breathing session to finish".into());
            };
            engine.tick();
            match engine.finish() {
                Some(session) => record(&db, &session)?,
                None => println!("{{\"type\": \"no_session\"}}"),
            }
            db.kv_delete(ENGINE_KEY)?;
        }
        BreathAction::History { range } => {
            let db = Database::open()?;
            let progress = breath::history::progress(&db.sessions()?, range, Utc::now(), &Local);
            print_json(&progress)?;
        }
        BreathAction::Stats => {
            let db = Database::open()?;
            print_json(&db.session_stats()?)?;
        }
        BreathAction::Picks { action } => {
            let db = Database::open()?;
            let picks = match action {
                PicksAction::List => QuickPicks::load(&db)?,
                PicksAction::Add { pattern } => QuickPicks::add(&db, pattern)?,
                PicksAction::Remove { pattern } => QuickPicks::remove(&db, pattern)?,
            };
            let titles: Vec<_> = picks
                .iter()
                .map(|p| json!({ "key": p.key(), "title": p.routine().title }))
                .collect();
            print_json(&titles)?;
        }
        BreathAction::Reminder => {
            let db = Database::open()?;
            let config = Config::load()?;
            let center = SqliteNotificationCenter::new(&db);
            match sync_reminder(&center, &config.breath)? {
                Some(reminder) => print_json(&reminder)?,
                None => println!("{{\"type\": \"reminder_disabled\"}}"),
            }
        }
    }
    Ok(())
}
