//! Centralized error types for the sync engine.

use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum CosmosError {
    #[error("Permission denied: role '{role}' cannot {action}")]
    PermissionDenied { role: String, action: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Team member not found: {0}")]
    MemberNotFound(String),

    #[error("Invalid task status: '{0}' (expected todo, inprogress or done)")]
    InvalidStatus(String),

    #[error("Invalid session role: '{0}' (expected admin, member or viewer)")]
    InvalidRole(String),

    #[error("Invalid {field} timestamp: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Backing store error: {0}")]
    Store(#[from] cosmos_redis::RedisError),

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for engine operations.
pub type CosmosResult<T> = Result<T, CosmosError>;

/// Coarse failure category, used to decide how an error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The session role forbids the operation.
    Permission,
    /// A required field is missing or malformed.
    Validation,
    /// The backing store rejected or failed the call.
    Store,
}

impl CosmosError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create an unavailable-store error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::ValidationError(_)
            | Self::InvalidStatus(_)
            | Self::InvalidRole(_)
            | Self::InvalidTimestamp { .. } => ErrorKind::Validation,
            Self::TaskNotFound(_)
            | Self::ProjectNotFound(_)
            | Self::MemberNotFound(_)
            | Self::Store(_)
            | Self::Unavailable(_) => ErrorKind::Store,
        }
    }
}
