//! Salted one-way password hashing.

use bcrypt::BcryptError;

/// Longest password bcrypt can hash without discarding input; its 72-byte
/// key includes a trailing NUL.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Stateless bcrypt hasher; the only knob is the work factor.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Use a custom bcrypt cost (4..=31).
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if the cost is out of range or the password is longer
    /// than `MAX_PASSWORD_BYTES`.
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        bcrypt::non_truncating_hash(password, self.cost)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A wrong password is `Ok(false)`; only a malformed hash is an error.
    ///
    /// # Errors
    /// Returns an error if `hash` is not a valid bcrypt string or the password
    /// is longer than `MAX_PASSWORD_BYTES`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, BcryptError> {
        bcrypt::non_truncating_verify(password, hash)
    }
}
