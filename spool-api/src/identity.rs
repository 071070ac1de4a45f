//! Caller identity extraction.
//!
//! The identity collaborator in front of this service authenticates the
//! caller and forwards the owner id in the `x-owner-id` header. The
//! core trusts that header and performs no credential validation.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use spool_core::OwnerId;

use crate::routes::ErrorResponse;

/// Header carrying the authenticated owner id.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Authenticated caller, extracted from [`OWNER_HEADER`].
#[derive(Debug, Clone)]
pub struct Identity(pub OwnerId);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match owner {
            Some(owner) => Ok(Self(owner.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Missing caller identity".into(),
                    code: "UNAUTHORIZED".into(),
                }),
            )),
        }
    }
}
