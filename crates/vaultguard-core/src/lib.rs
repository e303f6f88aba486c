//! Vaultguard Core - PIN-guarded accounts
//!
//! This crate provides a small state machine that gates balance-affecting
//! operations behind PIN verification:
//! - Argon2id credential digests with constant-time verification
//! - Failed-attempt counting and lockout
//! - Deposit, withdraw and transfer with a non-negative balance floor
//! - Single-threaded and thread-safe account registries
//!
//! # Security Model
//!
//! - PINs are never stored, only salted one-way digests
//! - Every guarded call re-presents the PIN
//! - Locked accounts reject guarded operations even with the right PIN
//! - Unlock guesses are capped separately from the lockout counter

pub mod account;
pub mod credential;
pub mod error;
pub mod lockout;
pub mod manifest;
pub mod money;
pub mod registry;
pub mod shared;

pub use account::{AccountState, GuardedAccount};
pub use credential::{
    CredentialDigest, CredentialHasher, HashParams, Secret, MAX_PIN_LENGTH, MIN_PIN_LENGTH,
};
pub use error::{AuthError, RegistryError, Result, TxError};
pub use lockout::{LockoutPolicy, MAX_FAILED_ATTEMPTS, MAX_UNLOCK_ATTEMPTS};
pub use manifest::{AccountSummary, Access, FieldSpec, FIELD_MANIFEST};
pub use money::{Money, MoneyParseError, MIN_BALANCE};
pub use registry::{AccountId, AccountRegistry};
pub use shared::SharedRegistry;
