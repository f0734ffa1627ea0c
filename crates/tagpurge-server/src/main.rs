//! Tagpurge server binary.

use std::sync::Arc;

use anyhow::Context;
use tagpurge_fastly::{FastlyApi, PurgeBackend, RevalidationConfig, RevalidationScheduler};
use tagpurge_server::cache::PurgeDeduplicator;
use tagpurge_server::metrics::init_metrics;
use tagpurge_server::{AppState, Settings, run_server_with_state};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    let addr = settings.server.socket_addr()?;
    let hasher = settings.tags.hasher()?;

    tracing::info!("Starting tagpurge server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Fastly API: {}", settings.fastly.api_url());
    tracing::info!(
        "Purge method: {}, hash length: {}",
        settings.fastly.purge_method(),
        hasher.length()
    );

    let api = FastlyApi::new(settings.fastly.clone()).context("invalid Fastly configuration")?;
    let backend: Arc<dyn PurgeBackend> = Arc::new(api);

    if settings.fastly.is_configured() {
        backend.validate_api_key().await;
    } else {
        tracing::warn!("Fastly API key or service id missing, purges will be refused");
    }

    // Kept alive for the whole run; dropping the handle stops the scheduler.
    let _revalidation = settings.fastly.revalidate_interval().map(|interval| {
        RevalidationScheduler::new(backend.clone(), RevalidationConfig::with_interval(interval))
            .start()
    });

    let mut state = AppState::new(backend, hasher);
    if settings.dedup.is_enabled() {
        tracing::info!(
            "Coalescing concurrent purges, in-flight TTL: {}s",
            settings.dedup.ttl_seconds
        );
        state = state.with_dedup(PurgeDeduplicator::new(settings.dedup.clone()));
    }

    let prometheus_handle = init_metrics().context("failed to initialize metrics")?;

    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}
