//! Cache tag to surrogate key translation.
//!
//! CMS cache tags (`node:1`, `config:system.site`, ...) are long and can
//! number in the hundreds per response, while the `Surrogate-Key` header
//! has a size limit. Each tag is therefore hashed to a short key: the
//! leading digits of the base-32 rendering of `md5(site_id ++ tag)`.
//! Collisions only cause extra purges, never missed ones.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TagpurgeError};

/// Cache tag emitted when modules or themes are (un)installed.
pub const CORE_EXTENSION_TAG: &str = "config:core.extension";

/// Default number of base-32 digits kept per hash.
pub const DEFAULT_HASH_LENGTH: usize = 4;

/// A 128 bit digest has at most 26 base-32 digits.
pub const MAX_HASH_LENGTH: usize = 26;

/// Longest surrogate key the CDN accepts, in bytes.
const MAX_KEY_BYTES: usize = 1024;

const BASE32_DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// A key sent in a `Surrogate-Key` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SurrogateKey(String);

impl SurrogateKey {
    /// Validates a caller supplied key.
    ///
    /// Keys are whitespace separated on the wire, so they must be non-empty
    /// and contain no whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use tagpurge_core::SurrogateKey;
    ///
    /// assert!(SurrogateKey::parse("product-42").is_ok());
    /// assert!(SurrogateKey::parse("").is_err());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TagpurgeError::invalid_surrogate_key(raw, "key cannot be empty"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(TagpurgeError::invalid_surrogate_key(
                raw,
                "key cannot contain whitespace",
            ));
        }
        if raw.chars().any(char::is_control) {
            return Err(TagpurgeError::invalid_surrogate_key(
                raw,
                "key cannot contain control characters",
            ));
        }
        if raw.len() > MAX_KEY_BYTES {
            return Err(TagpurgeError::invalid_surrogate_key(
                raw,
                format!("key exceeds {} bytes", MAX_KEY_BYTES),
            ));
        }
        Ok(Self(raw))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SurrogateKey {
    type Error = TagpurgeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SurrogateKey> for String {
    fn from(key: SurrogateKey) -> Self {
        key.0
    }
}

/// An ordered, duplicate free set of surrogate keys.
///
/// # Example
///
/// ```
/// use tagpurge_core::{SurrogateKey, SurrogateKeySet};
///
/// let mut keys = SurrogateKeySet::new();
/// keys.insert(SurrogateKey::parse("b").unwrap());
/// keys.insert(SurrogateKey::parse("a").unwrap());
/// keys.insert(SurrogateKey::parse("b").unwrap());
/// assert_eq!(keys.header_value(), "b a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurrogateKeySet {
    keys: Vec<SurrogateKey>,
    seen: HashSet<SurrogateKey>,
}

impl SurrogateKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, returning false if it was already present.
    pub fn insert(&mut self, key: SurrogateKey) -> bool {
        if self.seen.insert(key.clone()) {
            self.keys.push(key);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &SurrogateKey) -> bool {
        self.seen.contains(key)
    }

    /// Returns the keys in insertion order.
    pub fn as_slice(&self) -> &[SurrogateKey] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &SurrogateKey> {
        self.keys.iter()
    }

    /// Splits the set into header-sized batches.
    pub fn batches(&self, size: usize) -> impl Iterator<Item = &[SurrogateKey]> {
        self.keys.chunks(size.max(1))
    }

    /// Renders the space separated `Surrogate-Key` header value.
    pub fn header_value(&self) -> String {
        join_keys(&self.keys)
    }
}

impl FromIterator<SurrogateKey> for SurrogateKeySet {
    fn from_iter<I: IntoIterator<Item = SurrogateKey>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

impl IntoIterator for SurrogateKeySet {
    type Item = SurrogateKey;
    type IntoIter = std::vec::IntoIter<SurrogateKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

/// Joins keys into a `Surrogate-Key` header value.
pub fn join_keys(keys: &[SurrogateKey]) -> String {
    keys.iter()
        .map(SurrogateKey::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hashes cache tags into surrogate keys.
///
/// # Example
///
/// ```
/// use tagpurge_core::TagHasher;
///
/// let hasher = TagHasher::default();
/// let key = hasher.hash_tag("node:1");
/// assert_eq!(key.as_str(), "37l9");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHasher {
    length: usize,
    site_id: Option<String>,
}

impl TagHasher {
    /// Creates a hasher keeping `length` digits per hash.
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 || length > MAX_HASH_LENGTH {
            return Err(TagpurgeError::InvalidHashLength {
                length,
                max: MAX_HASH_LENGTH,
            });
        }
        Ok(Self {
            length,
            site_id: None,
        })
    }

    /// Scopes every hash to a site so several sites can share one service.
    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        let site_id = site_id.into();
        let site_id = site_id.trim();
        self.site_id = (!site_id.is_empty()).then(|| site_id.to_string());
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn site_id(&self) -> Option<&str> {
        self.site_id.as_deref()
    }

    /// Hashes a single tag.
    pub fn hash_tag(&self, tag: &str) -> SurrogateKey {
        let input = match &self.site_id {
            Some(site) => format!("{}{}", site, tag),
            None => tag.to_string(),
        };
        SurrogateKey(self.digest(&input))
    }

    /// Returns the key identifying every object of this site, if a site id
    /// is configured.
    pub fn site_key(&self) -> Option<SurrogateKey> {
        self.site_id
            .as_deref()
            .map(|site| SurrogateKey(self.digest(site)))
    }

    /// Hashes a list of tags, skipping blank ones and duplicates.
    pub fn hash_tags<I, S>(&self, tags: I) -> SurrogateKeySet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter(|tag| !tag.as_ref().trim().is_empty())
            .map(|tag| self.hash_tag(tag.as_ref()))
            .collect()
    }

    /// Builds the keys a CMS attaches to a response carrying `tags`: the
    /// site key first (when configured), then one key per tag.
    pub fn response_keys<I, S>(&self, tags: I) -> SurrogateKeySet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = SurrogateKeySet::new();
        if let Some(site_key) = self.site_key() {
            keys.insert(site_key);
        }
        for key in self.hash_tags(tags) {
            keys.insert(key);
        }
        keys
    }

    fn digest(&self, input: &str) -> String {
        let digest = md5::compute(input.as_bytes());
        let mut rendered = to_base32(u128::from_be_bytes(digest.0));
        rendered.truncate(self.length);
        rendered
    }
}

impl Default for TagHasher {
    fn default() -> Self {
        Self {
            length: DEFAULT_HASH_LENGTH,
            site_id: None,
        }
    }
}

/// Renders a number in base 32 without leading zeros.
fn to_base32(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(MAX_HASH_LENGTH);
    while value > 0 {
        digits.push(BASE32_DIGITS[(value % 32) as usize]);
        value /= 32;
    }
    digits.reverse();
    // Only ASCII digits were pushed.
    String::from_utf8(digits).unwrap_or_default()
}
