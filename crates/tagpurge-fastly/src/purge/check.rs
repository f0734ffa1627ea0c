//! Outcome of a credential check.

use serde::Serialize;
use tagpurge_core::UserRole;

/// Why a set of credentials is allowed to purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Authorization {
    /// The token carries both `purge_all` and `purge_select`.
    PurgeScopes,
    /// The token is `global` and its owner has a purging role.
    GlobalRole { role: UserRole },
}

/// Result of checking the stored credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialCheck {
    Valid { via: Authorization },
    Invalid { reason: String },
}

impl CredentialCheck {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Returns true if the credentials may purge.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Returns the failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { reason } => Some(reason),
        }
    }
}
