//! Credential validation state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

/// Caches whether the configured credentials may purge, plus the
/// diagnostics the status hook reports.
#[derive(Debug)]
pub struct CredentialState {
    /// Result of the last validation. `None` until the first one.
    valid: RwLock<Option<bool>>,
    /// When the last validation finished.
    last_checked: RwLock<Option<Instant>>,
    /// Why the last validation failed, if it did.
    last_error: RwLock<Option<String>>,
    /// Number of consecutive failed validations.
    failure_count: RwLock<u32>,
    purges_succeeded: AtomicU64,
    purges_failed: AtomicU64,
}

/// Point-in-time copy of a [`CredentialState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSnapshot {
    pub valid: Option<bool>,
    pub seconds_since_check: Option<u64>,
    pub last_error: Option<String>,
    pub failure_count: u32,
    pub purges_succeeded: u64,
    pub purges_failed: u64,
}

impl CredentialState {
    /// Creates a new, unchecked state.
    pub fn new() -> Self {
        Self {
            valid: RwLock::new(None),
            last_checked: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
            purges_succeeded: AtomicU64::new(0),
            purges_failed: AtomicU64::new(0),
        }
    }

    /// Returns the cached validation result.
    pub fn valid(&self) -> Option<bool> {
        *self.valid.read()
    }

    /// Returns true only if the last validation succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid().unwrap_or(false)
    }

    /// Returns true once any validation has run.
    pub fn is_checked(&self) -> bool {
        self.valid.read().is_some()
    }

    /// Records a successful validation.
    pub fn record_valid(&self) {
        let mut valid = self.valid.write();
        let mut last_checked = self.last_checked.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *valid = Some(true);
        *last_checked = Some(Instant::now());
        *last_error = None;
        *failure_count = 0;
    }

    /// Records a failed validation.
    pub fn record_invalid(&self, reason: impl Into<String>) {
        let mut valid = self.valid.write();
        let mut last_checked = self.last_checked.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *valid = Some(false);
        *last_checked = Some(Instant::now());
        *last_error = Some(reason.into());
        *failure_count += 1;
    }

    /// Counts a purge attempt that reached the API.
    pub fn record_purge(&self, succeeded: bool) {
        if succeeded {
            self.purges_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.purges_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the last validation error.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns the number of consecutive failed validations.
    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    /// Returns the time since the last validation.
    pub fn time_since_check(&self) -> Option<Duration> {
        self.last_checked.read().map(|t| t.elapsed())
    }

    /// Returns true if the cached result is missing or older than `ttl`.
    pub fn needs_revalidation(&self, ttl: Duration) -> bool {
        match self.time_since_check() {
            Some(elapsed) => elapsed >= ttl,
            None => true,
        }
    }

    pub fn purges_succeeded(&self) -> u64 {
        self.purges_succeeded.load(Ordering::Relaxed)
    }

    pub fn purges_failed(&self) -> u64 {
        self.purges_failed.load(Ordering::Relaxed)
    }

    /// Copies the current state for reporting.
    pub fn snapshot(&self) -> CredentialSnapshot {
        CredentialSnapshot {
            valid: self.valid(),
            seconds_since_check: self.time_since_check().map(|d| d.as_secs()),
            last_error: self.last_error(),
            failure_count: self.failure_count(),
            purges_succeeded: self.purges_succeeded(),
            purges_failed: self.purges_failed(),
        }
    }

    /// Forgets the cached result, forcing the next purge to revalidate.
    pub fn reset(&self) {
        let mut valid = self.valid.write();
        let mut last_checked = self.last_checked.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *valid = None;
        *last_checked = None;
        *last_error = None;
        *failure_count = 0;
    }
}

impl Default for CredentialState {
    fn default() -> Self {
        Self::new()
    }
}
