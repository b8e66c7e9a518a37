//! Live statistics following the change feed.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::config::Settings;
use crate::output;

pub async fn execute(settings: &Settings) -> Result<()> {
    let engine = super::start_engine(settings).await?;
    let cache = engine.cache();
    let mut events = cache.subscribe();

    output::print_stats(&engine.stats(Utc::now()));
    println!();
    println!("  {}", "Watching for changes, Ctrl+C to stop".dimmed());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Watcher lagged behind refreshes"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
        println!();
        println!(
            "{} revision {}",
            "↻".cyan(),
            cache.snapshot().revision.to_string().bold()
        );
        output::print_stats(&engine.stats(Utc::now()));
    }

    engine.shutdown();
    Ok(())
}
