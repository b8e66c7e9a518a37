//! Dashboard statistics command.

use anyhow::Result;
use chrono::Utc;

use crate::config::Settings;
use crate::output;

pub async fn execute(settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;
    output::print_stats(&engine.stats(Utc::now()));
    Ok(())
}
