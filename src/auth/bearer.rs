//! Bearer token gate for protected routes.
//!
//! `require_bearer` runs before any protected handler:
//! - no `Authorization` header: 403
//! - scheme other than `Bearer` (case-insensitive) or empty credentials: 403
//! - token fails signature, algorithm or expiry checks: 403
//! - otherwise the raw token is stored in the request extensions as
//!   `BearerToken` and the request proceeds.

use super::token::{Claims, TokenError, TokenVerifier};
use crate::api::error::ApiError;
use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BearerError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedScheme,
    #[error("invalid or expired token")]
    Invalid(#[from] TokenError),
}

/// A token that passed verification, as presented by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the token again to read its claims (e.g. the subject email).
    ///
    /// # Errors
    /// Returns an error if the token no longer verifies, e.g. it expired since
    /// the middleware accepted it.
    pub fn claims(&self, verifier: &TokenVerifier) -> Result<Claims, TokenError> {
        verifier.decode(&self.0)
    }
}

/// Extract the credentials of a `Bearer` authorization header.
///
/// # Errors
/// `MissingHeader` when absent, `MalformedScheme` for a non-UTF-8 value,
/// another scheme, or empty credentials.
pub fn bearer_credentials(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(BearerError::MissingHeader)?
        .to_str()
        .map_err(|_| BearerError::MalformedScheme)?;

    let (scheme, credentials) = value
        .trim()
        .split_once(' ')
        .ok_or(BearerError::MalformedScheme)?;
    let credentials = credentials.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || credentials.is_empty() {
        return Err(BearerError::MalformedScheme);
    }

    Ok(credentials)
}

/// Run the full header-to-token check.
///
/// # Errors
/// Any `BearerError`; all of them map to 403.
pub fn authorize(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
) -> Result<BearerToken, BearerError> {
    let token = bearer_credentials(headers)?;
    verifier.decode(token)?;
    Ok(BearerToken(token.to_string()))
}

/// axum middleware; expects `Extension<Arc<TokenVerifier>>` on an outer layer.
///
/// # Errors
/// Returns `ApiError::Forbidden` when the request is not authorized.
pub async fn require_bearer(
    Extension(verifier): Extension<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = authorize(&verifier, request.headers()).map_err(|err| {
        debug!("Rejected bearer token: {err}");
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}
