//! In-flight purge coalescing.
//!
//! A CMS save often fires several hooks for the same tags at once. This
//! module tracks the surrogate keys whose purge is currently being sent
//! in a Moka cache, so concurrent requests for the same key share one CDN
//! call. A key is released as soon as its purge finishes.

pub mod dedup;

pub use dedup::{DedupConfig, DedupOutcome, PurgeDeduplicator};
