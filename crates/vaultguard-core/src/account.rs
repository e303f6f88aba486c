//! Guarded account state machine
//!
//! A balance behind PIN authentication with lockout. The account has two
//! states, `Unlocked` and `Locked`. Every balance-affecting call presents
//! the PIN again; nothing is remembered between calls.
//!
//! All operations return results and never print. Rejected operations
//! leave the balance untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credential::{CredentialDigest, CredentialHasher, Secret};
use crate::error::{AuthError, TxError};
use crate::lockout::LockoutPolicy;
use crate::manifest::AccountSummary;
use crate::money::{Money, MIN_BALANCE};

/// Lock state of an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    /// Guarded operations are available
    Unlocked,
    /// Guarded operations are blocked until `unlock`
    Locked,
}

/// A monetary balance guarded by a PIN
#[derive(Debug)]
pub struct GuardedAccount {
    identifier: String,
    balance: Money,
    credential: Option<CredentialDigest>,
    failed_attempts: u32,
    failed_unlock_attempts: u32,
    locked: bool,
    policy: LockoutPolicy,
    hasher: CredentialHasher,
}

impl GuardedAccount {
    /// Create an account with the default policy and hash parameters
    pub fn new(identifier: impl Into<String>, initial_balance: Money) -> Self {
        Self::with_policy(
            identifier,
            initial_balance,
            LockoutPolicy::default(),
            CredentialHasher::default(),
        )
    }

    /// Create an account with an explicit policy and hasher
    ///
    /// Negative initial balances are clamped to the floor.
    pub fn with_policy(
        identifier: impl Into<String>,
        initial_balance: Money,
        policy: LockoutPolicy,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            balance: initial_balance.max(MIN_BALANCE),
            credential: None,
            failed_attempts: 0,
            failed_unlock_attempts: 0,
            locked: false,
            policy,
            hasher,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn state(&self) -> AccountState {
        if self.locked {
            AccountState::Locked
        } else {
            AccountState::Unlocked
        }
    }

    /// Current balance, unavailable while locked
    pub fn balance(&self) -> Result<Money, AuthError> {
        if self.locked {
            return Err(AuthError::Locked);
        }
        Ok(self.balance)
    }

    /// Balance in minor units, or `-1` while locked
    ///
    /// Compatibility shim for callers expecting a sentinel. Prefer
    /// [`GuardedAccount::balance`].
    pub fn legacy_balance(&self) -> i64 {
        match self.balance() {
            Ok(balance) => balance.minor(),
            Err(_) => -1,
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn failed_unlock_attempts(&self) -> u32 {
        self.failed_unlock_attempts
    }

    /// Credential checks left before the account locks
    pub fn attempts_remaining(&self) -> u32 {
        self.policy.attempts_remaining(self.failed_attempts)
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Display-safe snapshot
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            identifier: self.identifier.clone(),
            balance: self.balance().ok(),
            locked: self.locked,
            failed_attempts: self.failed_attempts,
            attempts_remaining: self.attempts_remaining(),
        }
    }

    /// Install or rotate the PIN
    ///
    /// The first call installs unconditionally. Later calls must present
    /// the current PIN. A mismatch here is not counted as a failed attempt.
    /// While locked, fails with `Locked` without checking the old PIN.
    pub fn set_credential(
        &mut self,
        old: Option<&Secret>,
        new: &Secret,
    ) -> Result<(), AuthError> {
        if self.locked {
            return Err(AuthError::Locked);
        }

        if let Some(current) = &self.credential {
            let matches = match old {
                Some(old) => current.verify(old)?,
                None => false,
            };
            if !matches {
                warn!(account = %self.identifier, "credential rotation rejected");
                return Err(AuthError::InvalidCredential);
            }
        }

        if !new.is_well_formed() {
            return Err(AuthError::MalformedCredential);
        }

        let rotated = self.credential.is_some();
        self.credential = Some(self.hasher.digest(new)?);

        if rotated {
            info!(account = %self.identifier, "credential rotated");
        } else {
            info!(account = %self.identifier, "credential installed");
        }
        Ok(())
    }

    /// Authenticate a PIN
    ///
    /// A success resets the failure counter. A failure increments it and
    /// locks the account when the policy threshold is reached. While
    /// locked, fails with `Locked` without consuming an attempt.
    pub fn validate(&mut self, credential: &Secret) -> Result<(), AuthError> {
        if self.locked {
            return Err(AuthError::Locked);
        }

        let digest = self.credential.as_ref().ok_or(AuthError::CredentialNotSet)?;

        if digest.verify(credential)? {
            self.failed_attempts = 0;
            Ok(())
        } else {
            self.record_failure();
            Err(AuthError::InvalidCredential)
        }
    }

    fn record_failure(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        warn!(
            account = %self.identifier,
            failed_attempts = self.failed_attempts,
            "invalid credential"
        );

        if self.policy.is_locked(self.failed_attempts) {
            self.locked = true;
            warn!(
                account = %self.identifier,
                "account locked after {} failed attempts",
                self.failed_attempts
            );
        }
    }

    /// Clear the lock with the correct PIN
    ///
    /// Wrong PINs here do not touch the failed-attempt counter. They count
    /// toward the policy's separate unlock cap instead.
    pub fn unlock(&mut self, credential: &Secret) -> Result<(), AuthError> {
        if !self.locked {
            return Err(AuthError::NotLocked);
        }

        if self.policy.unlock_exhausted(self.failed_unlock_attempts) {
            return Err(AuthError::UnlockAttemptsExhausted);
        }

        let digest = self.credential.as_ref().ok_or(AuthError::CredentialNotSet)?;

        if digest.verify(credential)? {
            self.locked = false;
            self.failed_attempts = 0;
            self.failed_unlock_attempts = 0;
            info!(account = %self.identifier, "account unlocked");
            Ok(())
        } else {
            self.failed_unlock_attempts = self.failed_unlock_attempts.saturating_add(1);
            warn!(
                account = %self.identifier,
                failed_unlock_attempts = self.failed_unlock_attempts,
                "unlock rejected"
            );
            Err(AuthError::InvalidCredential)
        }
    }

    /// Add funds after authenticating
    pub fn deposit(&mut self, amount: Money, credential: &Secret) -> Result<(), TxError> {
        self.validate(credential)?;

        if !amount.is_positive() {
            return Err(TxError::InvalidAmount);
        }

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TxError::BalanceOverflow)?;

        debug!(account = %self.identifier, %amount, "deposit");
        Ok(())
    }

    /// Remove funds after authenticating
    ///
    /// The floor is checked only after authentication succeeds.
    pub fn withdraw(&mut self, amount: Money, credential: &Secret) -> Result<(), TxError> {
        self.validate(credential)?;

        if !amount.is_positive() {
            return Err(TxError::InvalidAmount);
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .filter(|remaining| *remaining >= MIN_BALANCE)
            .ok_or(TxError::InsufficientFunds)?;

        debug!(account = %self.identifier, %amount, "withdraw");
        Ok(())
    }

    /// Receive funds without authentication
    ///
    /// Works regardless of lock state.
    pub fn credit(&mut self, amount: Money) -> Result<(), TxError> {
        if !amount.is_positive() {
            return Err(TxError::InvalidAmount);
        }

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TxError::BalanceOverflow)?;

        debug!(account = %self.identifier, %amount, "credit");
        Ok(())
    }

    /// Move funds to another account
    ///
    /// The source authorizes with its PIN; the destination is credited
    /// without one. If the credit fails the debit is reversed.
    pub fn transfer(
        &mut self,
        destination: &mut GuardedAccount,
        amount: Money,
        credential: &Secret,
    ) -> Result<(), TxError> {
        self.withdraw(amount, credential)?;

        if let Err(e) = destination.credit(amount) {
            // Restores the exact pre-withdraw value, cannot overflow
            self.balance = Money::from_minor(self.balance.minor() + amount.minor());
            warn!(
                account = %self.identifier,
                destination = %destination.identifier,
                error = %e,
                "transfer credit failed, debit reversed"
            );
            return Err(e);
        }

        info!(
            account = %self.identifier,
            destination = %destination.identifier,
            %amount,
            "transfer"
        );
        Ok(())
    }
}
