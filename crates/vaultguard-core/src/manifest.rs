//! Display boundary for accounts
//!
//! Presentation layers consume an [`AccountSummary`] snapshot and the static
//! [`FIELD_MANIFEST`] rather than inspecting account internals.

use serde::Serialize;

use crate::money::Money;

/// Snapshot of an account safe to show to a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub identifier: String,
    /// `None` while the account is locked
    pub balance: Option<Money>,
    pub locked: bool,
    pub failed_attempts: u32,
    pub attempts_remaining: u32,
}

/// How a field may be accessed from outside the account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Access {
    /// Readable, never written after creation
    ReadOnly,
    /// Readable, changed only through guarded operations
    Guarded,
    /// Derived from other fields
    Computed,
    /// Settable, never readable
    WriteOnly,
}

/// One entry of the field manifest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub access: Access,
    pub description: &'static str,
}

/// Every account attribute and how it is exposed
pub const FIELD_MANIFEST: &[FieldSpec] = &[
    FieldSpec {
        name: "identifier",
        access: Access::ReadOnly,
        description: "Account identifier assigned at creation",
    },
    FieldSpec {
        name: "balance",
        access: Access::Guarded,
        description: "Current balance, hidden while locked",
    },
    FieldSpec {
        name: "locked",
        access: Access::ReadOnly,
        description: "Whether guarded operations are blocked",
    },
    FieldSpec {
        name: "failed_attempts",
        access: Access::ReadOnly,
        description: "Consecutive failed credential checks",
    },
    FieldSpec {
        name: "attempts_remaining",
        access: Access::Computed,
        description: "Credential checks left before lockout",
    },
    FieldSpec {
        name: "credential",
        access: Access::WriteOnly,
        description: "PIN, stored only as a one-way digest",
    },
];

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELD_MANIFEST.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_names_unique() {
        let mut names: Vec<_> = FIELD_MANIFEST.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FIELD_MANIFEST.len());
    }

    #[test]
    fn test_credential_is_write_only() {
        assert_eq!(field("credential").unwrap().access, Access::WriteOnly);
        assert!(field("pin").is_none());
    }

    #[test]
    fn test_balance_is_guarded() {
        assert_eq!(field("balance").unwrap().access, Access::Guarded);
    }

    #[test]
    fn test_summary_serializes_balance_as_string() {
        let summary = AccountSummary {
            identifier: "ACC1001".into(),
            balance: Some(Money::from_minor(39000)),
            locked: false,
            failed_attempts: 0,
            attempts_remaining: 3,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["balance"], "390.00");
        assert_eq!(json["identifier"], "ACC1001");
    }
}
