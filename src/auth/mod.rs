//! Authentication: password hashing, token issuance, the bearer gate and the
//! signup/login service that ties them together.

pub mod bearer;
pub mod password;
pub mod service;
pub mod token;

pub use bearer::{require_bearer, BearerToken};
pub use password::PasswordHasher;
pub use service::{AccessToken, AuthError, AuthService};
pub use token::{TokenConfig, TokenIssuer, TokenVerifier};
