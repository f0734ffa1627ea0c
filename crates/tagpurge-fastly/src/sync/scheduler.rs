//! Background credential revalidation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::purge::PurgeBackend;

/// Shortest interval the scheduler accepts.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the revalidation scheduler.
#[derive(Debug, Clone)]
pub struct RevalidationConfig {
    /// Interval between validations.
    pub interval: Duration,
    /// Consecutive failures tolerated before backing off.
    pub max_failures: u32,
    /// Backoff multiplier for failures.
    pub backoff_multiplier: f64,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl Default for RevalidationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            max_failures: 3,
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(3600),
        }
    }
}

impl RevalidationConfig {
    /// Default settings with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/// Handle for controlling a running scheduler.
pub struct RevalidationHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl RevalidationHandle {
    /// Signals the scheduler to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Periodically revalidates the credentials of a backend.
pub struct RevalidationScheduler {
    backend: Arc<dyn PurgeBackend>,
    config: RevalidationConfig,
    current_backoff: Arc<Mutex<Duration>>,
}

impl RevalidationScheduler {
    /// Creates a new scheduler.
    ///
    /// Intervals below [`MIN_INTERVAL`] are raised to it.
    pub fn new(backend: Arc<dyn PurgeBackend>, mut config: RevalidationConfig) -> Self {
        if config.interval < MIN_INTERVAL {
            warn!(
                "Revalidation interval {:?} is too short, using {:?}",
                config.interval, MIN_INTERVAL
            );
            config.interval = MIN_INTERVAL;
        }
        config.max_backoff = config.max_backoff.max(config.interval);

        Self {
            backend,
            current_backoff: Arc::new(Mutex::new(config.interval)),
            config,
        }
    }

    /// Starts the background task.
    ///
    /// Returns a handle that can be used to stop the scheduler.
    pub fn start(self) -> RevalidationHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = RevalidationHandle { shutdown_tx };

        tokio::spawn(self.run(shutdown_rx));

        handle
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let initial_interval = self.config.interval;
        let mut interval_timer = interval(initial_interval);

        info!(
            backend = self.backend.name(),
            "Starting credential revalidation every {:?}", initial_interval
        );

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    self.revalidate().await;

                    let current = *self.current_backoff.lock();
                    if current != interval_timer.period() {
                        interval_timer = interval(current);
                        // interval() fires immediately; skip that tick.
                        interval_timer.tick().await;
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Revalidation scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Runs one validation and adjusts the backoff.
    pub async fn revalidate(&self) -> bool {
        debug!("Starting scheduled credential validation");

        let valid = self.backend.validate_api_key().await;
        if valid {
            self.reset_backoff();
        } else {
            self.increase_backoff();
            warn!(
                failures = self.backend.state().failure_count(),
                "Scheduled credential validation failed"
            );
        }
        valid
    }

    /// Returns the delay before the next validation.
    pub fn current_interval(&self) -> Duration {
        *self.current_backoff.lock()
    }

    fn reset_backoff(&self) {
        let mut backoff = self.current_backoff.lock();
        *backoff = self.config.interval;
    }

    fn increase_backoff(&self) {
        let mut backoff = self.current_backoff.lock();
        let failure_count = self.backend.state().failure_count();

        if failure_count >= self.config.max_failures {
            let new_backoff =
                Duration::from_secs_f64(backoff.as_secs_f64() * self.config.backoff_multiplier);
            *backoff = new_backoff.min(self.config.max_backoff);

            debug!(
                "Increased backoff to {:?} after {} failures",
                *backoff, failure_count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FastlyError;
    use crate::purge::CredentialCheck;
    use crate::sync::CredentialState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tagpurge_core::SurrogateKey;

    struct FlakyBackend {
        state: CredentialState,
        valid: AtomicBool,
        checks: AtomicU32,
    }

    impl FlakyBackend {
        fn new(valid: bool) -> Self {
            Self {
                state: CredentialState::new(),
                valid: AtomicBool::new(valid),
                checks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PurgeBackend for FlakyBackend {
        async fn check_credentials(&self) -> CredentialCheck {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.valid.load(Ordering::SeqCst) {
                self.state.record_valid();
                CredentialCheck::Valid {
                    via: crate::purge::Authorization::PurgeScopes,
                }
            } else {
                self.state.record_invalid("nope");
                CredentialCheck::invalid("nope")
            }
        }

        async fn purge_all(&self) -> Result<(), FastlyError> {
            Ok(())
        }

        async fn purge_url(&self, _url: &str) -> Result<(), FastlyError> {
            Ok(())
        }

        async fn purge_keys(&self, _keys: &[SurrogateKey]) -> Result<(), FastlyError> {
            Ok(())
        }

        fn state(&self) -> &CredentialState {
            &self.state
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_revalidation_config_default() {
        let config = RevalidationConfig::default();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.max_failures, 3);
        assert_eq!(config.backoff_multiplier, 2.0);
        assert_eq!(config.max_backoff, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_backoff_grows_after_max_failures() {
        let backend = Arc::new(FlakyBackend::new(false));
        let scheduler = RevalidationScheduler::new(
            backend.clone(),
            RevalidationConfig::with_interval(Duration::from_secs(10)),
        );

        for _ in 0..2 {
            assert!(!scheduler.revalidate().await);
        }
        assert_eq!(scheduler.current_interval(), Duration::from_secs(10));

        scheduler.revalidate().await;
        assert_eq!(scheduler.current_interval(), Duration::from_secs(20));

        scheduler.revalidate().await;
        assert_eq!(scheduler.current_interval(), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_success_resets_backoff() {
        let backend = Arc::new(FlakyBackend::new(false));
        let scheduler = RevalidationScheduler::new(
            backend.clone(),
            RevalidationConfig::with_interval(Duration::from_secs(10)),
        );

        for _ in 0..4 {
            scheduler.revalidate().await;
        }
        assert!(scheduler.current_interval() > Duration::from_secs(10));

        backend.valid.store(true, Ordering::SeqCst);
        assert!(scheduler.revalidate().await);
        assert_eq!(scheduler.current_interval(), Duration::from_secs(10));
        assert!(backend.state().is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_scheduler_validates_until_stopped() {
        let backend = Arc::new(FlakyBackend::new(true));
        let handle = RevalidationScheduler::new(
            backend.clone(),
            RevalidationConfig::with_interval(Duration::from_secs(60)),
        )
        .start();

        tokio::time::sleep(Duration::from_secs(130)).await;
        let checks = backend.checks.load(Ordering::SeqCst);
        assert!(checks >= 2, "expected at least 2 checks, got {}", checks);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let after_stop = backend.checks.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(backend.checks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let backend = Arc::new(FlakyBackend::new(true));
        let scheduler = RevalidationScheduler::new(
            backend,
            RevalidationConfig::with_interval(Duration::ZERO),
        );

        assert_eq!(scheduler.current_interval(), MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_scheduler_runs() {
        let backend = Arc::new(FlakyBackend::new(true));
        let handle = RevalidationScheduler::new(
            backend.clone(),
            RevalidationConfig::with_interval(Duration::ZERO),
        )
        .start();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.stop();

        let checks = backend.checks.load(Ordering::SeqCst);
        assert!((2..=4).contains(&checks), "unexpected check count {}", checks);
    }

    #[test]
    fn test_revalidation_handle_stop() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = RevalidationHandle { shutdown_tx };

        assert!(!*shutdown_rx.borrow());
        handle.stop();
        assert!(*shutdown_rx.borrow());
    }
}
