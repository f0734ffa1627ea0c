//! Credential validation endpoint.

use axum::{Json, extract::State};
use tagpurge_fastly::CredentialCheck;
use tracing::instrument;

use crate::metrics::purge::record_credential_check;
use crate::state::AppState;

/// POST /credentials/validate
/// Vuelve a validar la API key contra el CDN.
///
/// Responde 200 tambien cuando la key no es valida; el motivo va en el body.
#[instrument(skip_all)]
pub async fn validate_credentials(State(state): State<AppState>) -> Json<CredentialCheck> {
    let check = state.backend().check_credentials().await;
    record_credential_check(check.is_valid());
    Json(check)
}
