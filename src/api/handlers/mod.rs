pub mod books;
pub mod health;
pub mod login;
pub mod signup;

pub use self::books::{create_book, delete_book, get_book, list_books, update_book};
pub use self::health::health;
pub use self::login::login;
pub use self::signup::signup;

// common types and functions for the handlers
use super::error::ApiError;
use crate::auth::password::MAX_PASSWORD_BYTES;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Email and password, as posted to `/signup` and `/login`.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl UserCredentials {
    /// # Errors
    /// Returns `ApiError::Validation` for a malformed email, or for a password
    /// that is empty or longer than bcrypt can hash.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !valid_email(&self.email) {
            return Err(ApiError::Validation("Invalid email".to_string()));
        }

        if self.password.is_empty() {
            return Err(ApiError::Validation("Invalid password".to_string()));
        }

        if self.password.len() > MAX_PASSWORD_BYTES {
            return Err(ApiError::Validation(format!(
                "Password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        Ok(())
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
