use chrono::{Local, Utc};
use clap::Subcommand;
use pocketkit_core::notify::{AppKind, NotificationCenter, SqliteNotificationCenter};
use pocketkit_core::Database;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Pending notification requests with their next fire time
    List,
    /// Drop pending requests, for one app or all of them
    Clear {
        #[arg(long)]
        app: Option<AppKind>,
    },
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let center = SqliteNotificationCenter::new(&db);
    let now = Utc::now();

    match action {
        NotifyAction::List => {
            center.prune_delivered(now)?;
            let pending: Vec<_> = center
                .pending()?
                .into_iter()
                .map(|n| {
                    let next_fire = n.trigger.next_fire(n.created_at, now, &Local);
                    json!({ "notification": n, "next_fire": next_fire })
                })
                .collect();
            print_json(&pending)?;
        }
        NotifyAction::Clear { app } => {
            let apps = match app {
                Some(app) => vec![app],
                None => vec![AppKind::Breath, AppKind::News, AppKind::Vocab],
            };
            for app in apps {
                center.remove_pending(app)?;
            }
            println!("ok");
        }
    }
    Ok(())
}
