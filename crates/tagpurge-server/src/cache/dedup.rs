//! Surrogate keys with a purge in flight, using Moka.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tagpurge_core::SurrogateKey;

use crate::metrics::purge::record_dedup_skipped;

/// Configuracion de la coalescencia de purges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Tiempo maximo que una key queda marcada en vuelo (default: 30, 0 = deshabilitada).
    /// Solo aplica si la request que la marco se cancela antes de liberarla.
    pub ttl_seconds: u64,
    /// Maximo numero de keys en vuelo (default: 10000)
    pub max_capacity: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 30,
            max_capacity: 10_000,
        }
    }
}

impl DedupConfig {
    pub fn is_enabled(&self) -> bool {
        self.ttl_seconds > 0 && self.max_capacity > 0
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Keys reclamadas por esta request y cuantas ya estaban en vuelo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    pub fresh: Vec<SurrogateKey>,
    pub skipped: usize,
}

/// Marca las keys cuyo purge se esta enviando.
/// Thread-safe y async-friendly.
///
/// # Examples
///
/// ```no_run
/// use tagpurge_core::SurrogateKey;
/// use tagpurge_server::cache::{DedupConfig, PurgeDeduplicator};
///
/// # #[tokio::main]
/// # async fn main() {
/// let dedup = PurgeDeduplicator::new(DedupConfig::default());
/// let keys = vec![SurrogateKey::parse("37l9").unwrap()];
///
/// let outcome = dedup.claim(&keys).await;
/// // purge outcome.fresh, then always:
/// dedup.release(&outcome.fresh).await;
/// # }
/// ```
#[derive(Clone)]
pub struct PurgeDeduplicator {
    inner: Cache<SurrogateKey, ()>,
}

impl PurgeDeduplicator {
    /// Crea el cache con la configuracion dada.
    pub fn new(config: DedupConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl())
            .build();

        Self { inner }
    }

    /// Reclama las keys que nadie esta purgando; las demas se omiten.
    ///
    /// Cada key reclamada queda en vuelo hasta `release`.
    pub async fn claim(&self, keys: &[SurrogateKey]) -> DedupOutcome {
        let mut fresh = Vec::with_capacity(keys.len());
        for key in keys {
            let entry = self.inner.entry(key.clone()).or_insert(()).await;
            if entry.is_fresh() {
                fresh.push(key.clone());
            }
        }

        let skipped = keys.len() - fresh.len();
        if skipped > 0 {
            record_dedup_skipped(skipped);
            tracing::debug!(skipped, "Coalescing with purges already in flight");
        }

        DedupOutcome { fresh, skipped }
    }

    /// Libera keys reclamadas, haya salido bien el purge o no.
    pub async fn release(&self, keys: &[SurrogateKey]) {
        for key in keys {
            self.inner.invalidate(key).await;
        }
    }

    /// Numero aproximado de keys en vuelo.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<SurrogateKey> {
        raw.iter().map(|k| SurrogateKey::parse(*k).unwrap()).collect()
    }

    fn dedup(ttl_seconds: u64) -> PurgeDeduplicator {
        PurgeDeduplicator::new(DedupConfig {
            ttl_seconds,
            max_capacity: 100,
        })
    }

    #[test]
    fn test_config_enabled() {
        assert!(DedupConfig::default().is_enabled());
        assert!(
            !DedupConfig {
                ttl_seconds: 0,
                max_capacity: 10
            }
            .is_enabled()
        );
        assert!(
            !DedupConfig {
                ttl_seconds: 5,
                max_capacity: 0
            }
            .is_enabled()
        );
    }

    #[tokio::test]
    async fn test_keys_in_flight_are_skipped() {
        let dedup = dedup(60);
        dedup.claim(&keys(&["aaaa"])).await;

        let outcome = dedup.claim(&keys(&["aaaa", "bbbb"])).await;

        assert_eq!(outcome.fresh, keys(&["bbbb"]));
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_released_keys_can_be_claimed_again() {
        let dedup = dedup(60);
        let first = dedup.claim(&keys(&["aaaa"])).await;
        dedup.release(&first.fresh).await;

        let second = dedup.claim(&keys(&["aaaa"])).await;

        assert_eq!(second.fresh, keys(&["aaaa"]));
        assert_eq!(second.skipped, 0);
    }

    #[tokio::test]
    async fn test_duplicate_keys_in_one_claim() {
        let dedup = dedup(60);

        let outcome = dedup.claim(&keys(&["aaaa", "aaaa"])).await;

        assert_eq!(outcome.fresh, keys(&["aaaa"]));
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_abandoned_claim_expires() {
        let dedup = dedup(1);
        dedup.claim(&keys(&["aaaa"])).await;

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let outcome = dedup.claim(&keys(&["aaaa"])).await;

        assert_eq!(outcome.skipped, 0);
    }
}
