//! Lockout policy for brute-force protection
//!
//! Two independent counters are tracked per account:
//!
//! - Failed credential checks (validate, deposit, withdraw). Reaching
//!   `max_failed_attempts` locks the account.
//! - Failed unlock attempts while locked. These never feed the first
//!   counter. Reaching `max_unlock_attempts` makes the lock permanent.
//!
//! `max_unlock_attempts = None` allows unbounded unlock guessing and only
//! exists for compatibility with the legacy behaviour.

use serde::{Deserialize, Serialize};

/// Default number of consecutive failures before lockout
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// Default number of wrong-PIN unlock attempts before the lock is permanent
pub const MAX_UNLOCK_ATTEMPTS: u32 = 5;

/// Lockout policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutPolicy {
    /// Consecutive failed credential checks before the account locks
    pub max_failed_attempts: u32,
    /// Wrong-PIN unlock attempts allowed while locked
    pub max_unlock_attempts: Option<u32>,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            max_unlock_attempts: Some(MAX_UNLOCK_ATTEMPTS),
        }
    }
}

impl LockoutPolicy {
    /// Strict policy (locks sooner, fewer unlock guesses)
    pub fn strict() -> Self {
        Self {
            max_failed_attempts: 2,
            max_unlock_attempts: Some(3),
        }
    }

    /// Lenient policy (more attempts allowed)
    pub fn lenient() -> Self {
        Self {
            max_failed_attempts: 5,
            max_unlock_attempts: Some(10),
        }
    }

    /// Unbounded unlock attempts
    pub fn legacy() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            max_unlock_attempts: None,
        }
    }

    /// Threshold used for locking, never below one
    fn threshold(&self) -> u32 {
        self.max_failed_attempts.max(1)
    }

    /// Check if the account should be locked
    pub fn is_locked(&self, failed_attempts: u32) -> bool {
        failed_attempts >= self.threshold()
    }

    /// Remaining credential checks before lockout
    pub fn attempts_remaining(&self, failed_attempts: u32) -> u32 {
        self.threshold().saturating_sub(failed_attempts)
    }

    /// Check if no further unlock attempts are allowed
    pub fn unlock_exhausted(&self, failed_unlock_attempts: u32) -> bool {
        match self.max_unlock_attempts {
            Some(max) => failed_unlock_attempts >= max,
            None => false,
        }
    }

    /// Human-readable description of the current lockout state
    pub fn describe(&self, failed_attempts: u32) -> String {
        if self.is_locked(failed_attempts) {
            match self.max_unlock_attempts {
                Some(max) => format!("Locked ({} unlock attempts allowed)", max),
                None => "Locked".to_string(),
            }
        } else {
            format!("{} attempts remaining", self.attempts_remaining(failed_attempts))
        }
    }
}
