//! Argon2id password hashing.
//!
//! Unlike bcrypt, argon2 does not truncate its input: every byte of the
//! password is significant. Callers bound the length at the edge with
//! [`MAX_PASSWORD_LEN`]; the hasher itself never cuts a password short.

use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::error::{AuthError, AuthResult};

/// Longest password accepted by the HTTP layer, in bytes.
pub const MAX_PASSWORD_LEN: usize = 4096;

/// PHC-encoded argon2 digest. Opaque on purpose: no `Display`, redacted `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wraps a digest loaded from storage.
    pub fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// Hashes `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> AuthResult<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AuthError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(HashedPassword(hash))
}

/// Checks `candidate` against `hashed` using the salt embedded in the digest.
/// A malformed digest is a mismatch, not an error.
pub fn verify_password(hashed: &HashedPassword, candidate: &str) -> bool {
    let parsed = match PasswordHash::new(hashed.as_str()) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "argon2 parse hash error");
            return false;
        }
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}
