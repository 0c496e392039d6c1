//! Access token issuance and verification (HMAC-signed JWT).
//!
//! Tokens carry `sub`, `iat` and `exp`. Verification enforces the signature,
//! the configured algorithm and the expiry in a single decode step, with no
//! leeway: a token is rejected once the clock reaches `exp`.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    time::{Duration, SystemTime},
};
use thiserror::Error;

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 15 * 60;
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Minimal claim set for a login token.
#[derive(Debug, Serialize)]
pub struct Subject<'a> {
    pub sub: &'a str,
}

#[derive(Serialize)]
struct Stamped<'a, C: Serialize> {
    #[serde(flatten)]
    claims: &'a C,
    iat: i64,
    exp: i64,
}

/// Signing configuration shared by the issuer and the verifier.
#[derive(Clone)]
pub struct TokenConfig {
    secret: SecretString,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            algorithm: DEFAULT_ALGORITHM,
            default_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECONDS),
        }
    }

    /// Select the signing algorithm by its JWT identifier (`HS256`, `HS384`, `HS512`).
    ///
    /// # Errors
    /// Returns an error for unknown identifiers and for non-HMAC algorithms,
    /// which cannot be used with a shared secret.
    pub fn with_algorithm(mut self, algorithm: &str) -> Result<Self, TokenError> {
        self.algorithm = parse_algorithm(algorithm)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Parse a JWT algorithm identifier, accepting only HMAC variants.
///
/// # Errors
/// Returns `TokenError::UnsupportedAlgorithm` for anything else.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, TokenError> {
    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(TokenError::UnsupportedAlgorithm(value.to_string())),
    }
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn ttl_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            algorithm: config.algorithm,
            default_ttl: config.default_ttl,
        }
    }

    /// Sign `claims` with `iat = now` and `exp = now + ttl`.
    ///
    /// `ttl` falls back to the configured default lifetime. `claims` must not
    /// carry its own `iat` or `exp`.
    ///
    /// # Errors
    /// Returns `TokenError::Encode` if the claims cannot be serialized or signed.
    pub fn issue<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        self.issue_at(claims, ttl, now_unix_seconds())
    }

    pub(crate) fn issue_at<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<Duration>,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let stamped = Stamped {
            claims,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds(ttl)),
        };

        encode(&Header::new(self.algorithm), &stamped, &self.key).map_err(TokenError::Encode)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verify signature, algorithm and expiry, then return the claims.
    ///
    /// # Errors
    /// Returns `TokenError::Expired` for an expired token and
    /// `TokenError::Invalid` for every other failure.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })?;

        // jsonwebtoken still accepts exp == now
        if claims.exp <= now_unix_seconds() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
