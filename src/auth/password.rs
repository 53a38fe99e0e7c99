//! Password hashing utilities

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use thiserror::Error;
use tracing::debug;

/// bcrypt only looks at this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at most {max} bytes, got {len}.", max = MAX_PASSWORD_BYTES)]
    TooLong { len: usize },

    #[error(transparent)]
    Bcrypt(#[from] BcryptError),
}

/// Hashes and checks passwords with bcrypt.
///
/// The cost factor defaults to `bcrypt::DEFAULT_COST` (12). The encoded hash
/// carries its own salt and cost, so `check` works across cost changes.
/// Passwords longer than [`MAX_PASSWORD_BYTES`] are refused rather than
/// truncated, so two passwords sharing a 72-byte prefix never collide.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                len: password.len(),
            });
        }
        Ok(hash(password, self.cost)?)
    }

    /// Verify a password against a hash. Malformed hashes and over-long
    /// passwords never match.
    pub fn check(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            debug!(len = password.len(), "Password longer than bcrypt input limit");
            return false;
        }
        match verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Password hash could not be verified");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
