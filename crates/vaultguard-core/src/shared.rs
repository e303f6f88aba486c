//! Thread-safe registry
//!
//! Each account sits behind its own mutex, so attempt counting and balance
//! changes on one account are linearizable. Transfers hold both account
//! locks for their whole duration, always acquired in identifier order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::account::GuardedAccount;
use crate::credential::Secret;
use crate::error::{RegistryError, Result};
use crate::manifest::AccountSummary;
use crate::money::Money;

type AccountHandle = Arc<Mutex<GuardedAccount>>;

/// Registry that can be shared across threads
#[derive(Clone, Debug, Default)]
pub struct SharedRegistry {
    accounts: Arc<RwLock<HashMap<String, AccountHandle>>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    pub fn open(&self, account: GuardedAccount) -> Result<()> {
        let id = account.identifier().to_string();
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| RegistryError::Poisoned("registry".into()))?;

        if accounts.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentifier(id));
        }
        accounts.insert(id, Arc::new(Mutex::new(account)));
        Ok(())
    }

    /// Remove an account that no other caller currently holds
    ///
    /// Fails with `InUse` and leaves the account registered otherwise.
    pub fn remove(&self, id: &str) -> Result<Option<GuardedAccount>> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| RegistryError::Poisoned("registry".into()))?;

        // New handles are only cloned under the read lock, so the count is stable here
        match accounts.get(id) {
            Some(handle) if Arc::strong_count(handle) > 1 => {
                return Err(RegistryError::InUse(id.to_string()));
            }
            Some(_) => {}
            None => return Ok(None),
        }

        let handle = accounts
            .remove(id)
            .ok_or_else(|| RegistryError::UnknownAccount(id.to_string()))?;
        let mutex =
            Arc::try_unwrap(handle).map_err(|_| RegistryError::InUse(id.to_string()))?;
        let account = mutex
            .into_inner()
            .map_err(|_| RegistryError::Poisoned(id.to_string()))?;
        Ok(Some(account))
    }

    pub fn len(&self) -> Result<usize> {
        self.accounts
            .read()
            .map(|a| a.len())
            .map_err(|_| RegistryError::Poisoned("registry".into()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn handle(&self, id: &str) -> Result<AccountHandle> {
        self.accounts
            .read()
            .map_err(|_| RegistryError::Poisoned("registry".into()))?
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownAccount(id.to_string()))
    }

    fn lock<'a>(id: &str, handle: &'a AccountHandle) -> Result<MutexGuard<'a, GuardedAccount>> {
        handle
            .lock()
            .map_err(|_| RegistryError::Poisoned(id.to_string()))
    }

    /// Run a closure with exclusive access to one account
    pub fn with_account<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GuardedAccount) -> T,
    ) -> Result<T> {
        let handle = self.handle(id)?;
        let mut account = Self::lock(id, &handle)?;
        Ok(f(&mut *account))
    }

    pub fn set_credential(&self, id: &str, old: Option<&Secret>, new: &Secret) -> Result<()> {
        self.with_account(id, |a| a.set_credential(old, new))?
            .map_err(RegistryError::from)
    }

    pub fn validate(&self, id: &str, credential: &Secret) -> Result<()> {
        self.with_account(id, |a| a.validate(credential))?
            .map_err(RegistryError::from)
    }

    pub fn unlock(&self, id: &str, credential: &Secret) -> Result<()> {
        self.with_account(id, |a| a.unlock(credential))?
            .map_err(RegistryError::from)
    }

    pub fn deposit(&self, id: &str, amount: Money, credential: &Secret) -> Result<()> {
        self.with_account(id, |a| a.deposit(amount, credential))?
            .map_err(RegistryError::from)
    }

    pub fn withdraw(&self, id: &str, amount: Money, credential: &Secret) -> Result<()> {
        self.with_account(id, |a| a.withdraw(amount, credential))?
            .map_err(RegistryError::from)
    }

    pub fn balance(&self, id: &str) -> Result<Money> {
        self.with_account(id, |a| a.balance())?
            .map_err(RegistryError::from)
    }

    pub fn is_locked(&self, id: &str) -> Result<bool> {
        self.with_account(id, |a| a.is_locked())
    }

    pub fn summary(&self, id: &str) -> Result<AccountSummary> {
        self.with_account(id, |a| a.summary())
    }

    /// Transfer between two accounts, atomically with respect to readers
    pub fn transfer(&self, from: &str, to: &str, amount: Money, credential: &Secret) -> Result<()> {
        if from == to {
            return Err(RegistryError::SameAccount(from.to_string()));
        }

        let source = self.handle(from)?;
        let destination = self.handle(to)?;

        if from < to {
            let mut src = Self::lock(from, &source)?;
            let mut dst = Self::lock(to, &destination)?;
            src.transfer(&mut *dst, amount, credential)?;
        } else {
            let mut dst = Self::lock(to, &destination)?;
            let mut src = Self::lock(from, &source)?;
            src.transfer(&mut *dst, amount, credential)?;
        }
        Ok(())
    }
}
