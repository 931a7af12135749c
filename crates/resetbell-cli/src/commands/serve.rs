use std::sync::Arc;

use clap::Args;

use super::common::{build_scheduler, require_feed};

#[derive(Args)]
pub struct ServeArgs {
    /// Event feed URL (overrides config)
    #[arg(long)]
    feed: Option<String>,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let feed = require_feed(args.feed)?;
    let scheduler = Arc::new(build_scheduler(Some(feed))?);

    // Pending alerts are never resumed across restarts: rebuild everything
    // from persisted settings and a fresh snapshot before the loop starts.
    let refreshed = scheduler.refresh_all().await;
    tracing::info!(refreshed, "initial alert rebuild complete");

    let loop_scheduler = Arc::clone(&scheduler);
    let refresh = tokio::spawn(async move { loop_scheduler.run_refresh_loop().await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    refresh.abort();
    scheduler.shutdown().await;
    Ok(())
}
