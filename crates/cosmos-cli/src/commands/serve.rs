//! Web server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Settings;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides cosmos.toml)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides cosmos.toml)
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./cosmos-serve.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, settings: &Settings) -> Result<()> {
    let host = args.host.unwrap_or_else(|| settings.host.clone());
    let port = args.port.unwrap_or(settings.port);
    let engine = Arc::new(super::start_engine(settings).await?);

    println!();
    println!("  {} {}", "Cosmos".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}       http://{}:{}/api", "API".green(), host, port);
    println!("  {}  ws://{}:{}/ws", "WebSocket".green(), host, port);
    println!(
        "  {}      {}",
        "Store".green(),
        if settings.memory { "in-process" } else { settings.redis_url.as_str() }
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let result = cosmos_web::run_server(engine.clone(), &host, port).await;
    engine.shutdown();
    result
}
