//! CLI configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! [lockout]
//! max_failed_attempts = 3
//! max_unlock_attempts = 5
//! unbounded_unlock = false
//!
//! [hashing]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//!
//! [[accounts]]
//! id = "ACC1001"
//! balance = "500.00"
//! pin = "1234"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vaultguard_core::{
    CredentialHasher, HashParams, LockoutPolicy, Money, RegistryError, Secret,
    MAX_FAILED_ATTEMPTS, MAX_UNLOCK_ATTEMPTS,
};

use crate::script::ScriptRunner;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to seed account: {0}")]
    Seed(#[from] RegistryError),
}

/// Lockout section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutConfig {
    pub max_failed_attempts: u32,
    pub max_unlock_attempts: u32,
    /// Disable the unlock cap entirely
    pub unbounded_unlock: bool,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            max_unlock_attempts: MAX_UNLOCK_ATTEMPTS,
            unbounded_unlock: false,
        }
    }
}

impl From<LockoutConfig> for LockoutPolicy {
    fn from(c: LockoutConfig) -> Self {
        LockoutPolicy {
            max_failed_attempts: c.max_failed_attempts,
            max_unlock_attempts: (!c.unbounded_unlock).then_some(c.max_unlock_attempts),
        }
    }
}

/// An account opened before any script runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSeed {
    pub id: String,
    pub balance: Money,
    #[serde(default)]
    pub pin: Option<String>,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub lockout: LockoutConfig,
    pub hashing: HashParams,
    pub accounts: Vec<AccountSeed>,
}

impl CliConfig {
    /// Get the default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultguard")
            .join("config.toml")
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn policy(&self) -> LockoutPolicy {
        self.lockout.into()
    }

    pub fn hasher(&self) -> CredentialHasher {
        CredentialHasher::new(self.hashing)
    }

    /// Build a runner with the configured accounts already open
    pub fn runner(&self) -> Result<ScriptRunner, ConfigError> {
        let mut runner = ScriptRunner::new(self.policy(), self.hasher());
        for seed in &self.accounts {
            runner.open(&seed.id, seed.balance)?;
            if let Some(pin) = &seed.pin {
                let account = runner.registry_mut().account_mut(&seed.id)?;
                account
                    .set_credential(None, &Secret::from(pin.as_str()))
                    .map_err(RegistryError::from)?;
            }
        }
        Ok(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.policy(), LockoutPolicy::default());
        assert_eq!(config.hashing, HashParams::default());
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[lockout]
max_failed_attempts = 5
unbounded_unlock = true

[hashing]
memory_kib = 8
iterations = 1
parallelism = 1

[[accounts]]
id = "ACC1001"
balance = "500.00"
pin = "1234"

[[accounts]]
id = "ACC2002"
balance = "10"
"#
        )
        .unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(
            config.policy(),
            LockoutPolicy {
                max_failed_attempts: 5,
                max_unlock_attempts: None,
            }
        );
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[1].pin, None);

        let runner = config.runner().unwrap();
        let acc = runner.registry().get("ACC1001").unwrap();
        assert!(acc.has_credential());
        assert_eq!(acc.balance().unwrap(), Money::from_major(500));
        assert!(!runner.registry().get("ACC2002").unwrap().has_credential());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_or_default(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_parse_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lockout]\nmax_failed_attempts = \"three\"").unwrap();
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_duplicate_seed_rejected() {
        let config = CliConfig {
            hashing: HashParams::insecure_fast(),
            accounts: vec![
                AccountSeed {
                    id: "A".into(),
                    balance: Money::ZERO,
                    pin: None,
                },
                AccountSeed {
                    id: "A".into(),
                    balance: Money::ZERO,
                    pin: None,
                },
            ],
            ..Default::default()
        };
        assert!(matches!(
            config.runner(),
            Err(ConfigError::Seed(RegistryError::DuplicateIdentifier(_)))
        ));
    }
}
