//! # Tagpurge Fastly Backend
//!
//! Fastly client for tagpurge.
//!
//! This crate validates stored API credentials against Fastly's token
//! scope model and sends purge requests gated by the validation result.
//!
//! ## Features
//!
//! - Credential validation via `/tokens/self` and `/current_user`
//! - Purge all, purge by URL and purge by surrogate key
//! - Instant or soft purging
//! - Cache tag invalidation with hashed surrogate keys
//! - Background credential revalidation with backoff
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagpurge_core::TagHasher;
//! use tagpurge_fastly::{CacheTagsInvalidator, FastlyApi, FastlyConfig, PurgeBackend};
//!
//! let config = FastlyConfig::builder()
//!     .api_key("token")
//!     .service_id("SU1Z0isxPaozGVKXdv0eY")
//!     .build()?;
//!
//! let api = Arc::new(FastlyApi::new(config)?);
//! api.validate_api_key().await;
//!
//! let invalidator = CacheTagsInvalidator::new(api, TagHasher::default());
//! invalidator.invalidate_tags(&["node:1"]).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod invalidator;
pub mod purge;
pub mod sync;

// Re-exports
pub use api::FastlyApi;
pub use config::{FastlyConfig, FastlyConfigBuilder};
pub use error::FastlyError;
pub use invalidator::{CacheTagsInvalidator, InvalidationPlan};
pub use purge::{Authorization, CredentialCheck, PurgeBackend};
pub use sync::{
    CredentialSnapshot, CredentialState, RevalidationConfig, RevalidationHandle,
    RevalidationScheduler,
};

// Re-export tagpurge_core for consumers
pub use tagpurge_core;
