//! Bearer-token authentication helper.
//!
//! Each handler resolves the token exactly once and derives a
//! [`Capability`] from the result; nothing downstream re-reads headers.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use saga::{AuthUser, IdentityService, SagaError};

use crate::error::ApiError;

/// Resolves the `Authorization: Bearer` header to an authenticated user.
pub async fn authenticate(
    identity: &impl IdentityService,
    headers: &HeaderMap,
) -> Result<AuthUser, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("missing bearer token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("malformed authorization header"))?;

    identity
        .validate(token)
        .await
        .map_err(|err| ApiError::Saga(SagaError::Dependency(err)))?
        .ok_or(ApiError::Unauthorized("invalid or expired token"))
}
