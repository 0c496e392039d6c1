//! Signup and login orchestration.
//!
//! Flow Overview:
//! - signup: look up the email, reject duplicates, hash the password, insert.
//!   The store's uniqueness check is authoritative; a conflict on insert is
//!   reported exactly like a pre-check hit.
//! - login: look up the email, verify the password, issue a token whose `sub`
//!   is the email. Unknown email and wrong password are the same error, and
//!   an unknown email still pays for one bcrypt verification.

use super::{
    password::PasswordHasher,
    token::{Subject, TokenError, TokenIssuer},
};
use crate::store::{CredentialStore, StoreError, UserCredential};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const TOKEN_TYPE: &str = "bearer";

const PLACEHOLDER_PASSWORD: &str = "bookstore-placeholder-password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateCredential,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("credential store failure")]
    Store(#[source] StoreError),
    #[error("password hashing failure")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::DuplicateCredential,
            other => Self::Store(other),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    placeholder_hash: Arc<OnceCell<String>>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            credentials,
            hasher,
            issuer,
            placeholder_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash compared against when the email is unknown, computed once at the
    /// configured cost.
    async fn placeholder_hash(&self) -> Result<String, AuthError> {
        let hash = self
            .placeholder_hash
            .get_or_try_init(|| async {
                let hasher = self.hasher;
                let hash =
                    tokio::task::spawn_blocking(move || hasher.hash(PLACEHOLDER_PASSWORD))
                        .await??;
                Ok::<_, AuthError>(hash)
            })
            .await?;

        Ok(hash.clone())
    }

    /// Register a new credential.
    ///
    /// # Errors
    /// `DuplicateCredential` if the email is taken; store, hashing or task
    /// failures otherwise.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if self.credentials.find_by_email(email).await?.is_some() {
            debug!("email already registered");
            return Err(AuthError::DuplicateCredential);
        }

        let hasher = self.hasher;
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        self.credentials
            .insert(&UserCredential {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        debug!("credential created");

        Ok(())
    }

    /// Verify a credential and issue an access token for it.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password; store,
    /// hashing, task or signing failures otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let credential = self.credentials.find_by_email(email).await?;

        let (password_hash, known) = match credential {
            Some(credential) => (credential.password_hash, true),
            None => (self.placeholder_hash().await?, false),
        };

        let hasher = self.hasher;
        let password = password.to_owned();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
                .await??;

        if !known {
            debug!("unknown email");
            return Err(AuthError::InvalidCredentials);
        }

        if !matches {
            debug!("password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issuer.issue(&Subject { sub: email }, None)?;

        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }
}
