//! Diagnostics endpoint.

use axum::{Json, extract::State};
use serde::Serialize;
use tagpurge_core::PurgeMethod;
use tagpurge_fastly::CredentialSnapshot;

use crate::state::AppState;

/// Response de GET /status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Nombre del backend (siempre "fastly" en produccion).
    pub backend: String,
    /// Servicio purgado, si esta configurado.
    pub service_id: Option<String>,
    pub purge_method: PurgeMethod,
    /// Digitos por surrogate key.
    pub hash_length: usize,
    pub site_id: Option<String>,
    /// Estado cacheado de las credenciales y contadores de purges.
    pub credentials: CredentialSnapshot,
    /// Keys con un purge en vuelo, `None` si la coalescencia esta deshabilitada.
    pub dedup_entries: Option<u64>,
    pub version: &'static str,
}

/// GET /status
/// Reporta el estado sin contactar al CDN.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let backend = state.backend();
    let hasher = state.hasher();

    Json(StatusResponse {
        backend: backend.name().to_string(),
        service_id: backend.service_id().map(|id| id.to_string()),
        purge_method: backend.purge_method(),
        hash_length: hasher.length(),
        site_id: hasher.site_id().map(String::from),
        credentials: backend.state().snapshot(),
        dedup_entries: state.dedup().map(|d| d.entry_count()),
        version: env!("CARGO_PKG_VERSION"),
    })
}
