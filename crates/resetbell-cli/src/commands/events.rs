use chrono::NaiveDateTime;
use clap::Subcommand;

use resetbell_core::clock::{CalendarClock, SystemClock};
use resetbell_core::{dedup_events, snapshot_fingerprint, EventRecord, EventSource};

use super::common::require_feed;
use crate::feed::JsonFeedSource;

#[derive(Subcommand)]
pub enum EventsAction {
    /// Fetch and list current events, soonest expiry first
    List {
        /// Event feed URL (overrides config)
        #[arg(long)]
        feed: Option<String>,
    },
    /// Print the snapshot content fingerprint
    Fingerprint {
        /// Event feed URL (overrides config)
        #[arg(long)]
        feed: Option<String>,
    },
}

pub async fn run(action: EventsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        EventsAction::List { feed } => {
            let mut records = dedup_events(fetch(feed).await?);
            records.sort_by_key(|r| r.ends_at.unwrap_or(NaiveDateTime::MAX));

            let now = SystemClock.now();
            println!("current events as of {}", now.format("%Y-%m-%d %H:%M:%S"));
            for record in &records {
                println!("- {} ({}) {}", record.name, span(record), record.url);
            }
        }
        EventsAction::Fingerprint { feed } => {
            let records = fetch(feed).await?;
            println!("{}", snapshot_fingerprint(&records));
        }
    }
    Ok(())
}

fn span(record: &EventRecord) -> String {
    if record.permanent {
        return "permanent".to_string();
    }
    match record.ends_at {
        Some(ends_at) => format!("ends {}", ends_at.format("%Y-%m-%d %H:%M")),
        None => "open-ended".to_string(),
    }
}

async fn fetch(feed: Option<String>) -> Result<Vec<EventRecord>, Box<dyn std::error::Error>> {
    let url = require_feed(feed)?;
    let records = JsonFeedSource::new(url)
        .fetch_current_events()
        .await
        .ok_or("event source returned no data")?;
    Ok(records)
}
