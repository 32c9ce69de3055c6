use anyhow::{Context, Result};
use std::sync::Arc;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted one-way password hashing backed by bcrypt.
///
/// bcrypt compares digests in constant time, so `verify` leaks nothing about where
/// a mismatch occurs. Passwords longer than [`MAX_PASSWORD_BYTES`] are refused
/// instead of being silently cut.
#[derive(Clone)]
pub struct CredentialStore {
    cost: u32,
    decoy_digest: Arc<str>,
}

impl CredentialStore {
    pub fn new(cost: u32) -> Result<Self> {
        let decoy_digest = bcrypt::non_truncating_hash(DECOY_PASSWORD, cost)
            .context("Failed to hash password")?;
        Ok(Self {
            cost,
            decoy_digest: decoy_digest.into(),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::non_truncating_hash(plaintext, self.cost).context("Failed to hash password")
    }

    /// Verify a password against a stored digest. A malformed digest or an
    /// over-long password never matches.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match bcrypt::non_truncating_verify(plaintext, digest) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Rejecting malformed password digest: {e}");
                false
            }
        }
    }

    /// Spend the same work as a real verification when there is no account to check.
    pub fn verify_decoy(&self, plaintext: &str) {
        let _ = bcrypt::non_truncating_verify(plaintext, &self.decoy_digest);
    }
}
