//! Credential newtypes for the Fastly API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Fastly API token.
///
/// The token is sent as the `Fastly-Key` header. `Debug` and `Display`
/// never print it, so an `ApiKey` can sit inside structs that get logged.
///
/// # Example
///
/// ```
/// use tagpurge_core::ApiKey;
///
/// let key = ApiKey::new("s3cr3t");
/// assert_eq!(key.expose(), "s3cr3t");
/// assert_eq!(format!("{:?}", key), "ApiKey(****)");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Returns the raw token for use in request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no token was provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Fastly service identifier.
///
/// # Example
///
/// ```
/// use tagpurge_core::ServiceId;
///
/// let service = ServiceId::new("SU1Z0isxPaozGVKXdv0eY");
/// assert_eq!(service.as_str(), "SU1Z0isxPaozGVKXdv0eY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a new service identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no identifier was provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
