//! Account registry
//!
//! Maps identifiers to accounts for transfer addressing. Identifiers are
//! unique among live accounts.

use std::collections::HashMap;

use crate::account::GuardedAccount;
use crate::credential::Secret;
use crate::error::{RegistryError, Result};
use crate::manifest::AccountSummary;
use crate::money::Money;

/// Identifier helpers
pub struct AccountId;

impl AccountId {
    /// Generate a fresh identifier, e.g. `ACC-1f2e3d4c`
    pub fn generate(prefix: &str) -> String {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", prefix, &uuid[..8])
    }
}

/// Single-threaded registry of accounts
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: HashMap<String, GuardedAccount>,
}

impl AccountRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    pub fn open(&mut self, account: GuardedAccount) -> Result<()> {
        let id = account.identifier().to_string();
        if self.accounts.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentifier(id));
        }
        self.accounts.insert(id, account);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&GuardedAccount> {
        self.accounts.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut GuardedAccount> {
        self.accounts.get_mut(id)
    }

    /// Like [`AccountRegistry::get_mut`] but with an error for unknown ids
    pub fn account_mut(&mut self, id: &str) -> Result<&mut GuardedAccount> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownAccount(id.to_string()))
    }

    /// Remove an account, returning it
    pub fn remove(&mut self, id: &str) -> Option<GuardedAccount> {
        self.accounts.remove(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// All identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.accounts.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Summaries of all accounts, sorted by identifier
    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.identifiers()
            .iter()
            .filter_map(|id| self.accounts.get(id))
            .map(GuardedAccount::summary)
            .collect()
    }

    /// Transfer between two registered accounts
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: Money,
        credential: &Secret,
    ) -> Result<()> {
        if from == to {
            return Err(RegistryError::SameAccount(from.to_string()));
        }
        if !self.accounts.contains_key(to) {
            return Err(RegistryError::UnknownAccount(to.to_string()));
        }

        // Take the source out so both accounts can be borrowed mutably
        let mut source = self
            .accounts
            .remove(from)
            .ok_or_else(|| RegistryError::UnknownAccount(from.to_string()))?;

        let result = match self.accounts.get_mut(to) {
            Some(destination) => source
                .transfer(destination, amount, credential)
                .map_err(RegistryError::from),
            None => Err(RegistryError::UnknownAccount(to.to_string())),
        };

        self.accounts.insert(from.to_string(), source);
        result
    }
}
