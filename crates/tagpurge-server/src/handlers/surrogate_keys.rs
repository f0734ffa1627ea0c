//! Surrogate-Key header rendering.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Request body para calcular el header de una respuesta.
#[derive(Debug, Deserialize)]
pub struct SurrogateKeysRequest {
    /// Cache tags de la pagina renderizada.
    pub tags: Vec<String>,
}

/// Header que el CMS debe adjuntar a la respuesta.
#[derive(Debug, Serialize)]
pub struct SurrogateKeysResponse {
    pub header: &'static str,
    pub value: String,
    pub keys: Vec<String>,
}

/// POST /surrogate-keys
/// Convierte los cache tags de una pagina en el valor de `Surrogate-Key`.
pub async fn surrogate_keys(
    State(state): State<AppState>,
    Json(request): Json<SurrogateKeysRequest>,
) -> Json<SurrogateKeysResponse> {
    let keys = state.hasher().response_keys(&request.tags);

    Json(SurrogateKeysResponse {
        header: "Surrogate-Key",
        value: keys.header_value(),
        keys: keys.iter().map(|k| k.to_string()).collect(),
    })
}
