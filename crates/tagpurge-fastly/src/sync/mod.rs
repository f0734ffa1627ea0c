//! Credential state and background revalidation.
//!
//! The cached "credentials are valid" flag gates every purge. The
//! scheduler keeps it fresh without a purge having to pay for the check.

mod scheduler;
mod state;

pub use scheduler::{RevalidationConfig, RevalidationHandle, RevalidationScheduler};
pub use state::{CredentialSnapshot, CredentialState};
