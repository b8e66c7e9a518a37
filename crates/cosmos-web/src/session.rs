//! Session role extraction.

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use cosmos_core::session::SessionRole;

use crate::error::ApiError;

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-session-role";

/// The role of the caller, required on every role-dependent route.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub SessionRole);

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ROLE_HEADER)
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "missing session role"))?;
        let raw = value
            .to_str()
            .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "session role is not valid text"))?;
        let role = raw.parse::<SessionRole>()?;
        Ok(Session(role))
    }
}
