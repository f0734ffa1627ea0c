//! Purge backend abstraction.
//!
//! This module defines the backend trait, the credential check outcome and
//! the Fastly API response bodies.

mod check;
pub(crate) mod models;
mod traits;

pub use check::{Authorization, CredentialCheck};
pub use traits::PurgeBackend;
