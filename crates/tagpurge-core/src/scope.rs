//! Fastly token scopes, user roles and purge methods.
//!
//! A token may purge when it carries both `purge_all` and `purge_select`.
//! A `global` token may purge only if the user owning it is an engineer or
//! a superuser; checking that requires a second API call, so this module
//! only answers the questions and leaves the calls to the client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single API token scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenScope {
    /// Full access to the account.
    Global,
    /// Read-only access to the account.
    GlobalRead,
    /// Purge by URL or surrogate key.
    PurgeSelect,
    /// Purge the whole service.
    PurgeAll,
    /// Any scope this crate doesn't know about.
    Other(String),
}

impl TokenScope {
    /// Returns the wire name of the scope.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::GlobalRead => "global:read",
            Self::PurgeSelect => "purge_select",
            Self::PurgeAll => "purge_all",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for TokenScope {
    fn from(s: &str) -> Self {
        match s {
            "global" => Self::Global,
            "global:read" => Self::GlobalRead,
            "purge_select" => Self::PurgeSelect,
            "purge_all" => Self::PurgeAll,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TokenScope {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<TokenScope> for String {
    fn from(scope: TokenScope) -> Self {
        scope.as_str().to_string()
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of scopes granted to a token.
///
/// # Example
///
/// ```
/// use tagpurge_core::TokenScopes;
///
/// let scopes = TokenScopes::parse("purge_select purge_all");
/// assert!(scopes.grants_purge());
/// assert!(!scopes.is_global());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenScopes(BTreeSet<TokenScope>);

impl TokenScopes {
    /// Parses a space separated scope string as returned by `/tokens/self`.
    pub fn parse(raw: &str) -> Self {
        raw.split_whitespace().map(TokenScope::from).collect()
    }

    /// Returns true if the set contains the given scope.
    pub fn contains(&self, scope: &TokenScope) -> bool {
        self.0.contains(scope)
    }

    /// Returns true if the token can purge on its own.
    pub fn grants_purge(&self) -> bool {
        self.contains(&TokenScope::PurgeAll) && self.contains(&TokenScope::PurgeSelect)
    }

    /// Returns true if the token has the `global` scope.
    pub fn is_global(&self) -> bool {
        self.contains(&TokenScope::Global)
    }

    /// Returns true if no scopes were granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the scopes in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenScope> {
        self.0.iter()
    }
}

impl FromIterator<TokenScope> for TokenScopes {
    fn from_iter<I: IntoIterator<Item = TokenScope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TokenScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(TokenScope::as_str).collect();
        f.write_str(&names.join(" "))
    }
}

/// Role of the user owning a token, as reported by `/current_user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    User,
    Billing,
    Engineer,
    Superuser,
    Other(String),
}

impl UserRole {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Billing => "billing",
            Self::Engineer => "engineer",
            Self::Superuser => "superuser",
            Self::Other(name) => name,
        }
    }

    /// Returns true if a `global` token owned by this role may purge.
    pub fn can_purge(&self) -> bool {
        matches!(self, Self::Engineer | Self::Superuser)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            "user" => Self::User,
            "billing" => Self::Billing,
            "engineer" => Self::Engineer,
            "superuser" => Self::Superuser,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How purged objects are removed from the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgeMethod {
    /// Objects are removed immediately.
    #[default]
    Instant,
    /// Objects are marked stale and revalidated on next request.
    Soft,
}

impl PurgeMethod {
    /// Returns true for soft purges.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Soft => "soft",
        }
    }
}

impl FromStr for PurgeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instant" => Ok(Self::Instant),
            "soft" => Ok(Self::Soft),
            other => Err(format!("unknown purge method '{}'", other)),
        }
    }
}

impl fmt::Display for PurgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
