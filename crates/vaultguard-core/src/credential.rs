//! PIN handling with one-way hashing
//!
//! A PIN is only ever stored as an Argon2id PHC string. Verification goes
//! through the argon2 verifier, which compares derived output in constant
//! time. Nothing in this module can reproduce the original PIN.

use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::AuthError;

/// Minimum PIN length
pub const MIN_PIN_LENGTH: usize = 4;
/// Maximum PIN length
pub const MAX_PIN_LENGTH: usize = 12;

/// A PIN presented by a caller
///
/// The buffer is zeroized on drop and never printed.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(Zeroizing::new(pin.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Check PIN format (digits only, bounded length)
    pub fn is_well_formed(&self) -> bool {
        let len = self.0.len();
        (MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl From<&str> for Secret {
    fn from(pin: &str) -> Self {
        Self::new(pin)
    }
}

impl From<String> for Secret {
    fn from(pin: String) -> Self {
        Self::new(pin)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Argon2 cost parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    /// Minimal cost. Only for tests and demos.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// Produces credential digests with fixed cost parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CredentialHasher {
    params: HashParams,
}

impl CredentialHasher {
    pub fn new(params: HashParams) -> Self {
        Self { params }
    }

    /// Hasher with minimal cost, see [`HashParams::insecure_fast`]
    pub fn insecure_fast() -> Self {
        Self::new(HashParams::insecure_fast())
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| AuthError::Crypto(format!("Invalid hash parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a PIN into a salted digest
    pub fn digest(&self, secret: &Secret) -> Result<CredentialDigest, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AuthError::Crypto(format!("Failed to hash PIN: {}", e)))?
            .to_string();

        Ok(CredentialDigest { phc })
    }
}

/// Stored one-way representation of a PIN
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDigest {
    phc: String,
}

impl CredentialDigest {
    /// Check a presented PIN against this digest
    pub fn verify(&self, secret: &Secret) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(&self.phc)
            .map_err(|e| AuthError::Crypto(format!("Invalid stored hash: {}", e)))?;

        // Parameters come from the PHC string itself
        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialDigest(argon2id)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_and_verify() {
        let hasher = CredentialHasher::insecure_fast();
        let digest = hasher.digest(&Secret::from("1234")).unwrap();

        assert!(digest.verify(&Secret::from("1234")).unwrap());
        assert!(!digest.verify(&Secret::from("4321")).unwrap());
        assert!(!digest.verify(&Secret::from("")).unwrap());
    }

    #[test]
    fn test_digest_is_salted() {
        let hasher = CredentialHasher::insecure_fast();
        let a = hasher.digest(&Secret::from("1234")).unwrap();
        let b = hasher.digest(&Secret::from("1234")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_does_not_contain_pin() {
        let hasher = CredentialHasher::insecure_fast();
        let digest = hasher.digest(&Secret::from("987654")).unwrap();
        assert!(digest.phc.starts_with("$argon2id$"));
        assert!(!digest.phc.contains("987654"));
        assert_eq!(format!("{:?}", digest), "CredentialDigest(argon2id)");
    }

    #[test]
    fn test_secret_debug_redacted() {
        assert_eq!(format!("{:?}", Secret::from("1234")), "Secret(<redacted>)");
    }

    #[test]
    fn test_pin_format() {
        assert!(!Secret::from("123").is_well_formed());
        assert!(!Secret::from("1234567890123").is_well_formed());
        assert!(!Secret::from("12a4").is_well_formed());
        assert!(Secret::from("1234").is_well_formed());
        assert!(Secret::from("123456789012").is_well_formed());
    }

    #[test]
    fn test_invalid_params_surface_as_crypto_error() {
        let hasher = CredentialHasher::new(HashParams {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        let err = hasher.digest(&Secret::from("1234")).unwrap_err();
        assert!(matches!(err, AuthError::Crypto(_)));
    }
}
