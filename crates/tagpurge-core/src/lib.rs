//! Tagpurge Core - Domain types
//!
//! This crate provides the foundational types shared by the Fastly client
//! and the hook server: credentials, token scopes, and the cache tag to
//! surrogate key translation.

pub mod error;
pub mod hashing;
pub mod scope;
pub mod types;

pub use error::{Result, TagpurgeError};
pub use hashing::{
    CORE_EXTENSION_TAG, DEFAULT_HASH_LENGTH, MAX_HASH_LENGTH, SurrogateKey, SurrogateKeySet,
    TagHasher,
};
pub use scope::{PurgeMethod, TokenScope, TokenScopes, UserRole};
pub use types::{ApiKey, ServiceId};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
