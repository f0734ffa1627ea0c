//! Metrics module for the tagpurge server.

pub mod http;
pub mod purge;
pub mod setup;

pub use setup::init_metrics;
