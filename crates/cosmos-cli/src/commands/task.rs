//! Task management commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use cosmos_core::gateway::Notice;
use cosmos_core::task::{TaskInput, TaskStatus};

use crate::config::Settings;
use crate::output;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks, newest first
    List {
        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Create a new task
    New(TaskArgs),

    /// Replace a task's fields
    Edit {
        /// Task ID
        id: String,

        #[command(flatten)]
        task: TaskArgs,
    },

    /// Change only a task's status
    Move {
        /// Task ID
        id: String,

        /// Target status (todo, inprogress, done)
        status: TaskStatus,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

#[derive(Args)]
pub struct TaskArgs {
    /// Owning project ID
    #[arg(short, long)]
    pub project: String,

    /// Task title
    pub title: String,

    /// Task description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Assignee name
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    /// Status (todo, inprogress, done); new tasks start in todo, edits keep
    /// the current status when omitted
    #[arg(short, long)]
    pub status: Option<TaskStatus>,
}

impl From<TaskArgs> for TaskInput {
    fn from(args: TaskArgs) -> Self {
        TaskInput {
            title: args.title,
            description: args.description,
            assignee: args.assignee,
            deadline: args.deadline,
            project_id: args.project,
            status: args.status,
        }
    }
}

pub async fn execute(cmd: TaskCommands, settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;
    let gateway = engine.gateway(settings.role);

    match cmd {
        TaskCommands::List { project } => {
            let tasks: Vec<_> = engine
                .cache()
                .tasks()
                .into_iter()
                .filter(|t| project.as_deref().map_or(true, |p| t.project_id == p))
                .collect();
            output::print_tasks_table(&tasks);
        }
        TaskCommands::New(args) => {
            let result = gateway.create_task(args.into()).await;
            output::print_notice(&Notice::from_result(&result, "Task created"));
            let task = result?;
            println!("  {}", task.id);
        }
        TaskCommands::Edit { id, task } => {
            let result = gateway.update_task(&id, task.into()).await;
            output::print_notice(&Notice::from_result(&result, "Task updated"));
            result?;
        }
        TaskCommands::Move { id, status } => {
            let result = gateway.update_task_status(&id, status).await;
            output::print_notice(&Notice::from_result(&result, "Task status updated"));
            result?;
        }
        TaskCommands::Delete { id } => {
            let result = gateway.delete_task(&id).await;
            output::print_notice(&Notice::from_result(&result, "Task deleted"));
            result?;
        }
    }

    Ok(())
}
