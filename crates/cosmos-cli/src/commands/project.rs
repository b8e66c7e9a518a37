//! Project overview and project management commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use cosmos_core::analytics::{self, StatusTab};
use cosmos_core::gateway::Notice;
use cosmos_core::project::ProjectInput;

use crate::config::Settings;
use crate::output;

#[derive(Args)]
pub struct OverviewArgs {
    /// Case-insensitive filter on the project name
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Status tab (all, todo, inprogress, done)
    #[arg(short, long, default_value = "all")]
    pub tab: StatusTab,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project (admin only)
    New(NewProjectArgs),

    /// Delete a project; its tasks are kept (admin only)
    Delete {
        /// Project ID
        id: String,
    },
}

#[derive(Args)]
pub struct NewProjectArgs {
    /// Project name
    pub name: String,

    /// Project description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
}

pub async fn overview(args: OverviewArgs, settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;
    let tallies = engine.project_tallies();
    output::print_projects(&analytics::filter_projects(&tallies, &args.search, args.tab));
    Ok(())
}

pub async fn execute(cmd: ProjectCommands, settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;
    let gateway = engine.gateway(settings.role);

    match cmd {
        ProjectCommands::New(args) => {
            let input = ProjectInput {
                name: args.name,
                description: args.description,
                deadline: args.deadline,
            };
            let result = gateway.create_project(input).await;
            output::print_notice(&Notice::from_result(&result, "Project created"));
            let project = result?;
            println!("  {}", project.id);
        }
        ProjectCommands::Delete { id } => {
            let result = gateway.delete_project(&id).await;
            output::print_notice(&Notice::from_result(&result, "Project deleted"));
            result?;
        }
    }

    Ok(())
}
