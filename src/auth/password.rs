// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! bcrypt password hashing and verification.

use super::AuthError;

/// Cost used when none is configured.
pub const DEFAULT_COST: u32 = 14;

/// Range accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// Longest password bcrypt will consider, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted, adaptive password hashing.
///
/// Holds a dummy hash produced at construction so that logins for unknown
/// accounts do the same amount of work as logins with a wrong password.
#[derive(Clone)]
pub struct PasswordVerifier {
    cost: u32,
    dummy_hash: String,
}

impl PasswordVerifier {
    /// Build a verifier. Fails with `Misconfiguration` if the cost is out of range.
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Misconfiguration(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )));
        }
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)
            .map_err(|e| AuthError::Misconfiguration(format!("bcrypt self-test failed: {e}")))?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password for storage.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
    }

    /// Compare a candidate against a stored hash.
    ///
    /// A well-formed mismatch is `Ok(false)`. Only a corrupt stored hash is an
    /// error, and callers must treat it as a failure, never as a match.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> Result<bool, AuthError> {
        bcrypt::verify(candidate, stored_hash)
            .map_err(|e| AuthError::Internal(format!("stored password hash is unusable: {e}")))
    }

    /// Spend the same effort as [`verify`](Self::verify) for an account that
    /// does not exist. Always reports a mismatch.
    pub fn verify_absent(&self, candidate: &str) -> bool {
        let _ = bcrypt::verify(candidate, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> PasswordVerifier {
        PasswordVerifier::new(MIN_COST).unwrap()
    }

    #[test]
    fn hash_then_verify_matches() {
        let v = verifier();
        let hash = v.hash("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(v.verify(&hash, "correct horse").unwrap());
    }

    #[test]
    fn mismatch_is_false_not_error() {
        let v = verifier();
        let hash = v.hash("correct horse").unwrap();
        assert!(!v.verify(&hash, "battery staple").unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        let v = verifier();
        let err = v.verify("not-a-bcrypt-hash", "anything").unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn same_password_hashes_differently() {
        let v = verifier();
        assert_ne!(v.hash("pw12345678").unwrap(), v.hash("pw12345678").unwrap());
    }

    #[test]
    fn cost_out_of_range_is_misconfiguration() {
        assert!(matches!(
            PasswordVerifier::new(2),
            Err(AuthError::Misconfiguration(_))
        ));
        assert!(matches!(
            PasswordVerifier::new(40),
            Err(AuthError::Misconfiguration(_))
        ));
    }

    #[test]
    fn verify_absent_never_matches() {
        assert!(!verifier().verify_absent("anything"));
    }
}
