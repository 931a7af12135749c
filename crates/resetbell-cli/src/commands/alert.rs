use clap::Subcommand;

use super::common::{build_scheduler, require_feed, resolve_feed};

#[derive(Subcommand)]
pub enum AlertAction {
    /// Enable expiry alerts for a guild
    Register {
        #[arg(long)]
        guild: u64,
        /// Destination channel id
        #[arg(long)]
        channel: u64,
        /// Lead time in hours before expiry (clamped to 1..=240)
        #[arg(long, default_value = "24")]
        hours: u32,
        /// Event feed URL (overrides config)
        #[arg(long)]
        feed: Option<String>,
    },
    /// Disable alerts for a guild; the stored setting is kept
    Disable {
        #[arg(long)]
        guild: u64,
    },
    /// Print the stored setting and pending alert groups as JSON
    Status {
        #[arg(long)]
        guild: u64,
    },
    /// Fire one alert group immediately for diagnostics
    Test {
        #[arg(long)]
        guild: u64,
        /// Event feed URL (overrides config)
        #[arg(long)]
        feed: Option<String>,
    },
}

pub async fn run(action: AlertAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AlertAction::Register {
            guild,
            channel,
            hours,
            feed,
        } => {
            let feed = require_feed(feed)?;
            let scheduler = build_scheduler(Some(feed))?;
            let pending = scheduler.register(guild, channel, hours).await?;
            println!("alerts enabled for guild {guild}: {pending} pending group(s)");
            println!("note: a running `resetbell serve` picks this up at its next refresh");
        }
        AlertAction::Disable { guild } => {
            let scheduler = build_scheduler(resolve_feed(None)?)?;
            scheduler.disable(guild).await?;
            println!("alerts disabled for guild {guild}");
        }
        AlertAction::Status { guild } => {
            let scheduler = build_scheduler(resolve_feed(None)?)?;
            let setting = scheduler.setting(guild).await?;
            let summary = scheduler.pending_summary(guild).await;
            let status = serde_json::json!({
                "setting": setting,
                "pendingGroups": summary.len(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        AlertAction::Test { guild, feed } => {
            let feed = require_feed(feed)?;
            let scheduler = build_scheduler(Some(feed))?;
            // Rebuild first so there is something to fire in this process.
            if let Some(setting) = scheduler.setting(guild).await? {
                scheduler.apply_settings(guild, setting).await?;
            }
            scheduler.test_fire(guild).await?;
            println!("test alert fired for guild {guild}");
        }
    }
    Ok(())
}
