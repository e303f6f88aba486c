//! Error types for guarded accounts

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wrong PIN presented
    #[error("Invalid credential")]
    InvalidCredential,

    /// Account is locked and must be unlocked first
    #[error("Account is locked")]
    Locked,

    /// Unlock requested on an account that is not locked
    #[error("Account is not locked")]
    NotLocked,

    /// No PIN has been installed on this account yet
    #[error("Credential not set - call set_credential first")]
    CredentialNotSet,

    /// New PIN does not meet the format rules
    #[error("PIN must be {}-{} digits", crate::MIN_PIN_LENGTH, crate::MAX_PIN_LENGTH)]
    MalformedCredential,

    /// Unlock attempt cap reached, the account stays locked
    #[error("Unlock attempts exhausted - account permanently locked")]
    UnlockAttemptsExhausted,

    /// Hashing backend failure
    #[error("Crypto error: {0}")]
    Crypto(String),
}

/// Transaction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// Amount was zero or negative
    #[error("Amount must be positive")]
    InvalidAmount,

    /// Withdrawal would take the balance below the floor
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Credit would overflow the balance representation
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Authentication failed while attempting the transaction
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// Registry-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An account with this identifier is already open
    #[error("Account already exists with ID: {0}")]
    DuplicateIdentifier(String),

    /// No account with this identifier
    #[error("Account not found: {0}")]
    UnknownAccount(String),

    /// Source and destination of a transfer are the same account
    #[error("Cannot transfer from {0} to itself")]
    SameAccount(String),

    /// Transaction rejected by the account
    #[error(transparent)]
    Tx(#[from] TxError),

    /// Another caller still holds the account
    #[error("Account in use: {0}")]
    InUse(String),

    /// A thread panicked while holding an account lock
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl From<AuthError> for RegistryError {
    fn from(e: AuthError) -> Self {
        RegistryError::Tx(TxError::Auth(e))
    }
}

impl TxError {
    /// The wrapped authentication failure, if any
    pub fn auth(&self) -> Option<&AuthError> {
        match self {
            TxError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_wraps_into_tx_error() {
        let err: TxError = AuthError::Locked.into();
        assert_eq!(err, TxError::Auth(AuthError::Locked));
        assert_eq!(err.auth(), Some(&AuthError::Locked));
        assert_eq!(TxError::InvalidAmount.auth(), None);
    }

    #[test]
    fn test_malformed_message_mentions_bounds() {
        let msg = AuthError::MalformedCredential.to_string();
        assert!(msg.contains("4-12"));
    }

    #[test]
    fn test_registry_error_from_auth() {
        let err: RegistryError = AuthError::InvalidCredential.into();
        assert_eq!(
            err,
            RegistryError::Tx(TxError::Auth(AuthError::InvalidCredential))
        );
    }
}
