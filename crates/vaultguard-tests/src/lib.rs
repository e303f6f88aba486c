//! Shared fixtures for vaultguard integration tests

use vaultguard_core::{CredentialHasher, GuardedAccount, LockoutPolicy, Money, Secret};

/// Account with fast hashing and the given PIN already installed
pub fn account_with_pin(id: &str, balance: i64, pin: &str) -> GuardedAccount {
    let mut account = GuardedAccount::with_policy(
        id,
        Money::from_major(balance),
        LockoutPolicy::default(),
        CredentialHasher::insecure_fast(),
    );
    account
        .set_credential(None, &Secret::from(pin))
        .expect("fresh account accepts any well-formed PIN");
    account
}
