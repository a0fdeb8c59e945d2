//! Request identity.
//!
//! Callers identify themselves with an `X-User-Id` header carrying the UUID
//! of their profile. There is no session or token layer; every handler that
//! touches user-owned data takes this extractor and the services enforce
//! ownership on top of it.

use crate::errors::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from the `X-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let raw = header
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::Unauthorized("X-User-Id must be a UUID".to_string()))?;

        Ok(AuthenticatedUser(user_id))
    }
}
