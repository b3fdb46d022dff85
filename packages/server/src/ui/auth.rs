//! Identity attached by the identity provider in front of the server.
//!
//! HTTP requests carry the authenticated user in the `x-user-id` header.
//! Requests without it are rejected with 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::UserId;

use super::handler::http::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        UserId::try_from(raw)
            .map(Self)
            .map_err(|_| ApiError::Unauthenticated)
    }
}
