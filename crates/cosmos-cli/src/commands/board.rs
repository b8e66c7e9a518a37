//! Kanban board commands.

use anyhow::Result;
use clap::Subcommand;

use crate::config::Settings;
use crate::output;

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Display a project's board, or every project's cards when no project
    /// is given
    Show {
        /// Project ID
        project: Option<String>,
    },

    /// Drop a card onto a column, as a drag on the dashboard would
    Drop {
        /// Task ID
        task: String,

        /// Destination column (todo, inprogress, done)
        column: Option<String>,

        /// Board to drop on; the all-projects board when omitted
        #[arg(short, long)]
        project: Option<String>,
    },
}

pub async fn execute(cmd: BoardCommands, settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;

    match cmd {
        BoardCommands::Show { project } => {
            let session = engine.board(project.as_deref(), settings.role);
            output::print_board(&session.board(), session.can_drag());
        }
        BoardCommands::Drop { task, column, project } => {
            let session = engine.board(project.as_deref(), settings.role);
            let outcome = session.drop_card(&task, column.as_deref()).await;
            output::print_drop_outcome(&outcome);
            output::print_board(&session.board(), session.can_drag());
        }
    }

    Ok(())
}
