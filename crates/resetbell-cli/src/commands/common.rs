use std::sync::Arc;

use resetbell_core::clock::SystemClock;
use resetbell_core::{data_dir, AlertScheduler, Config, DiscordNotifier, SettingsStore};

use crate::feed::JsonFeedSource;

/// Feed URL from the command line or configuration, if either is set.
pub fn resolve_feed(override_url: Option<String>) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Some(url) = override_url {
        return Ok(Some(url));
    }
    let config = Config::load()?;
    let url = config.events.feed_url;
    Ok((!url.is_empty()).then_some(url))
}

/// Feed URL that must be present (commands that fetch event data).
pub fn require_feed(override_url: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    resolve_feed(override_url)?
        .ok_or_else(|| "no event feed configured; set events.feed_url in config.toml or pass --feed".into())
}

/// Build a scheduler from the stored configuration. A feed-less scheduler
/// still serves status and disable; any fetch reports the source unavailable.
pub fn build_scheduler(feed_url: Option<String>) -> Result<AlertScheduler, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store_dir = match &config.data_dir {
        Some(dir) => dir.join("alerts"),
        None => data_dir()?.join("alerts"),
    };
    let store = SettingsStore::open(store_dir)?;
    let source = Arc::new(JsonFeedSource::new(feed_url.unwrap_or_default()));
    let notifier = Arc::new(DiscordNotifier::with_api_base(
        config.notifier.api_base.clone(),
        config.notifier.bot_token.clone(),
    ));

    Ok(AlertScheduler::new(store, source, notifier, Arc::new(SystemClock))
        .with_refresh_hours(config.refresh.hours))
}
