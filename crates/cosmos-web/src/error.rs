//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cosmos_core::error::ErrorKind;
use cosmos_core::gateway::Notice;
use cosmos_core::CosmosError;
use serde_json::json;

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    notice: Notice,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            notice: Notice::error(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CosmosError> for ApiError {
    fn from(err: CosmosError) -> Self {
        let status = match err.kind() {
            ErrorKind::Permission => StatusCode::FORBIDDEN,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Store => match &err {
                CosmosError::TaskNotFound(_)
                | CosmosError::ProjectNotFound(_)
                | CosmosError::MemberNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
        };
        Self {
            status,
            notice: Notice::from(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.notice.message,
            "notice": self.notice,
        });
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
