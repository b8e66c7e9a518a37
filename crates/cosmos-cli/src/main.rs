//! Cosmos CLI
//!
//! Terminal front end and server launcher for the live project dashboard.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands};

const DEFAULT_FILTER: &str = "cosmos=info,cosmos_core=info,cosmos_web=debug";

/// Initialize tracing, optionally mirroring to a log file.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "cosmos=debug,cosmos_core=debug,cosmos_web=debug".into()
        } else {
            DEFAULT_FILTER.into()
        }
    });

    // Command output goes to stdout; logs stay on stderr.
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or("cosmos.log".as_ref());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) if args.log => Some(
            args.log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from("cosmos-serve.log")),
        ),
        _ => None,
    };

    let _guard = init_tracing(log_file.as_deref(), cli.verbose);

    cli.execute().await
}
