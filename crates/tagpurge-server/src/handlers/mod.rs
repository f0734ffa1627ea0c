//! HTTP handlers.
//!
//! The CMS calls these hooks instead of running the purge logic in
//! process; each one maps onto a backend or invalidator operation.

pub mod credentials;
pub mod health;
pub mod invalidate;
pub mod metrics;
pub mod purge;
pub mod status;
pub mod surrogate_keys;
