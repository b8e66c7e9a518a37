//! Team roster commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use cosmos_core::gateway::Notice;
use cosmos_core::team::MemberInput;

use crate::config::Settings;
use crate::output;

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List team members
    List,

    /// Add a team member
    Add(MemberArgs),

    /// Edit a team member
    Edit {
        /// Member ID
        id: String,

        #[command(flatten)]
        member: MemberArgs,
    },

    /// Remove a team member
    Remove {
        /// Member ID
        id: String,
    },
}

#[derive(Args)]
pub struct MemberArgs {
    /// Display name
    pub name: String,

    /// Job role, "Member" when omitted
    #[arg(short, long = "job")]
    pub job: Option<String>,
}

impl From<MemberArgs> for MemberInput {
    fn from(args: MemberArgs) -> Self {
        MemberInput {
            name: args.name,
            role: args.job,
        }
    }
}

pub async fn execute(cmd: TeamCommands, settings: &Settings) -> Result<()> {
    let engine = super::load_engine(settings).await?;
    let gateway = engine.gateway(settings.role);

    match cmd {
        TeamCommands::List => output::print_team(&engine.cache().team()),
        TeamCommands::Add(args) => {
            let result = gateway.create_team_member(args.into()).await;
            output::print_notice(&Notice::from_result(&result, "Team member added"));
            result?;
        }
        TeamCommands::Edit { id, member } => {
            let result = gateway.update_team_member(&id, member.into()).await;
            output::print_notice(&Notice::from_result(&result, "Team member updated"));
            result?;
        }
        TeamCommands::Remove { id } => {
            let result = gateway.delete_team_member(&id).await;
            output::print_notice(&Notice::from_result(&result, "Team member removed"));
            result?;
        }
    }

    Ok(())
}
