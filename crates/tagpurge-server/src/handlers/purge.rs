//! Direct purge endpoints.

use std::future::Future;
use std::time::Instant;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tagpurge_core::SurrogateKey;
use tagpurge_fastly::FastlyError;
use tracing::instrument;

use crate::cache::DedupOutcome;
use crate::error::AppError;
use crate::metrics::purge::record_purge;
use crate::state::AppState;

/// Request body para purgar una URL.
#[derive(Debug, Deserialize)]
pub struct PurgeUrlRequest {
    pub url: String,
}

/// Request body para purgar surrogate keys.
#[derive(Debug, Deserialize)]
pub struct PurgeKeysRequest {
    pub keys: Vec<String>,
}

/// Response para operaciones de purge.
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    /// Operacion ejecutada.
    pub operation: &'static str,
    /// Keys enviadas al CDN.
    pub keys: Vec<String>,
    /// Keys omitidas porque otra request ya las esta purgando.
    pub skipped: usize,
    /// Mensaje descriptivo.
    pub message: String,
}

/// Ejecuta un purge registrando su resultado y duracion.
pub(crate) async fn timed<F>(kind: &'static str, purge: F) -> Result<(), FastlyError>
where
    F: Future<Output = Result<(), FastlyError>>,
{
    let start = Instant::now();
    let result = purge.await;
    record_purge(kind, result.is_ok(), start.elapsed());
    result
}

/// Reclama las keys que no tienen un purge en vuelo.
pub(crate) async fn claim(state: &AppState, keys: &[SurrogateKey]) -> DedupOutcome {
    match state.dedup() {
        Some(dedup) => dedup.claim(keys).await,
        None => DedupOutcome {
            fresh: keys.to_vec(),
            skipped: 0,
        },
    }
}

/// Purga keys ya reclamadas y las libera con cualquier resultado.
pub(crate) async fn purge_claimed<F>(
    state: &AppState,
    kind: &'static str,
    claimed: &[SurrogateKey],
    purge: F,
) -> Result<(), FastlyError>
where
    F: Future<Output = Result<(), FastlyError>>,
{
    let result = timed(kind, purge).await;
    if let Some(dedup) = state.dedup() {
        dedup.release(claimed).await;
    }
    result
}

/// POST /purge/all
/// Purga todo el servicio.
#[instrument(skip_all)]
pub async fn purge_all(State(state): State<AppState>) -> Result<Json<PurgeResponse>, AppError> {
    timed("all", state.backend().purge_all()).await?;

    Ok(Json(PurgeResponse {
        operation: "purge_all",
        keys: Vec::new(),
        skipped: 0,
        message: "Purged everything".to_string(),
    }))
}

/// POST /purge/url
/// Purga una URL.
#[instrument(skip_all, fields(url = %request.url))]
pub async fn purge_url(
    State(state): State<AppState>,
    Json(request): Json<PurgeUrlRequest>,
) -> Result<Json<PurgeResponse>, AppError> {
    timed("url", state.backend().purge_url(&request.url)).await?;

    Ok(Json(PurgeResponse {
        operation: "purge_url",
        keys: Vec::new(),
        skipped: 0,
        message: format!("Purged {}", request.url),
    }))
}

/// POST /purge/keys
/// Purga surrogate keys ya calculadas.
#[instrument(skip_all, fields(count = request.keys.len()))]
pub async fn purge_keys(
    State(state): State<AppState>,
    Json(request): Json<PurgeKeysRequest>,
) -> Result<Json<PurgeResponse>, AppError> {
    let keys = request
        .keys
        .into_iter()
        .map(SurrogateKey::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let DedupOutcome { fresh, skipped } = claim(&state, &keys).await;

    if !fresh.is_empty() {
        purge_claimed(&state, "keys", &fresh, state.backend().purge_keys(&fresh)).await?;
    }

    Ok(Json(PurgeResponse {
        operation: "purge_keys",
        message: format!(
            "Purged {} surrogate keys, {} already in flight",
            fresh.len(),
            skipped
        ),
        keys: fresh.iter().map(|k| k.to_string()).collect(),
        skipped,
    }))
}
