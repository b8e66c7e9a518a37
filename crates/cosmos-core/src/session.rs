//! Session roles and the write-permission matrix.

use serde::{Deserialize, Serialize};

use crate::error::{CosmosError, CosmosResult};

/// Access level of the running session, supplied once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Admin,
    Member,
    Viewer,
}

/// A mutation that goes through the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateTask,
    UpdateTask,
    UpdateTaskStatus,
    DeleteTask,
    CreateMember,
    UpdateMember,
    DeleteMember,
    CreateProject,
    DeleteProject,
}

impl Action {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::CreateTask => "create tasks",
            Self::UpdateTask => "edit tasks",
            Self::UpdateTaskStatus => "move tasks",
            Self::DeleteTask => "delete tasks",
            Self::CreateMember => "add team members",
            Self::UpdateMember => "edit team members",
            Self::DeleteMember => "remove team members",
            Self::CreateProject => "create projects",
            Self::DeleteProject => "delete projects",
        }
    }
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    /// The single permission rule for every write path.
    ///
    /// Viewers are read-only. Members may do everything to tasks (creation
    /// included, wherever it is triggered from) and to the team. Only
    /// admins create or delete projects.
    pub fn permits(&self, action: Action) -> bool {
        match (self, action) {
            (Self::Viewer, _) => false,
            (Self::Admin, _) => true,
            (Self::Member, Action::CreateProject | Action::DeleteProject) => false,
            (Self::Member, _) => true,
        }
    }

    /// Check `action`, producing a permission error when denied.
    pub fn authorize(&self, action: Action) -> CosmosResult<()> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(CosmosError::PermissionDenied {
                role: self.as_str().to_string(),
                action: action.describe().to_string(),
            })
        }
    }

    /// Whether the board should let cards be dragged at all.
    pub fn can_drag(&self) -> bool {
        self.permits(Action::UpdateTaskStatus)
    }
}

impl std::str::FromStr for SessionRole {
    type Err = CosmosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(CosmosError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
