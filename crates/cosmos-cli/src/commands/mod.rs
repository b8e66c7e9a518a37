//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cosmos_core::store::{BackingStore, MemoryStore, RedisStore};
use cosmos_core::Engine;
use tracing::debug;

use crate::config::{FileConfig, Overrides, Settings};

pub mod board;
pub mod project;
pub mod serve;
pub mod stats;
pub mod task;
pub mod team;
pub mod watch;

/// Cosmos - live project dashboard engine
#[derive(Parser)]
#[command(name = "cosmos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session role: admin, member or viewer
    #[arg(long, global = true, env = "COSMOS_ROLE")]
    pub role: Option<String>,

    /// Backing store URL
    #[arg(long, global = true, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Use an empty in-process store instead of Redis
    #[arg(long, global = true)]
    pub memory: bool,

    /// Path to cosmos.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project overview with per-status counts
    Projects(project::OverviewArgs),

    /// Create or delete projects
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Dashboard statistics
    Stats,

    /// Task management
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Team roster management
    #[command(subcommand)]
    Team(team::TeamCommands),

    /// Kanban board for one project or all of them
    #[command(subcommand)]
    Board(board::BoardCommands),

    /// Follow the change feed and reprint statistics on every refresh
    Watch,

    /// Start the web server
    Serve(serve::ServeArgs),
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let file = FileConfig::discover(self.config.as_deref())?;
        Settings::resolve(
            Overrides {
                redis_url: self.redis_url.clone(),
                role: self.role.clone(),
                memory: self.memory,
            },
            file,
        )
    }

    pub async fn execute(self) -> Result<()> {
        let settings = self.settings()?;
        debug!(role = %settings.role, memory = settings.memory, "Resolved settings");

        match self.command {
            Commands::Projects(args) => project::overview(args, &settings).await,
            Commands::Project(cmd) => project::execute(cmd, &settings).await,
            Commands::Stats => stats::execute(&settings).await,
            Commands::Task(cmd) => task::execute(cmd, &settings).await,
            Commands::Team(cmd) => team::execute(cmd, &settings).await,
            Commands::Board(cmd) => board::execute(cmd, &settings).await,
            Commands::Watch => watch::execute(&settings).await,
            Commands::Serve(args) => serve::execute(args, &settings).await,
        }
    }
}

/// Open the configured backing store.
pub async fn open_store(settings: &Settings) -> Result<Arc<dyn BackingStore>> {
    if settings.memory {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = RedisStore::connect(&settings.redis_url).await?;
    Ok(Arc::new(store))
}

/// Load a one-shot engine for a single command.
pub async fn load_engine(settings: &Settings) -> Result<Engine> {
    let store = open_store(settings).await?;
    Ok(Engine::load(store).await?)
}

/// Load an engine kept current by the change feed.
pub async fn start_engine(settings: &Settings) -> Result<Engine> {
    let store = open_store(settings).await?;
    Ok(Engine::start(store).await?)
}
