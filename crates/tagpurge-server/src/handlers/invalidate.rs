//! Cache tag invalidation endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tagpurge_fastly::InvalidationPlan;
use tracing::instrument;

use super::purge::{claim, purge_claimed, timed};
use crate::error::AppError;
use crate::state::AppState;

/// Request body con los cache tags invalidados por el CMS.
#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub tags: Vec<String>,
}

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Plan ejecutado: nothing, purge_all, purge_site o purge_keys.
    pub plan: &'static str,
    /// Surrogate keys purgadas por esta request.
    pub keys: Vec<String>,
    /// Keys que otra request ya estaba purgando.
    pub skipped: usize,
}

/// POST /invalidate
/// Invalida cache tags: todo si cambio una extension, si no las keys.
///
/// Solo los planes por keys se coalescen; purge all y purge site siempre
/// se envian.
#[instrument(skip_all, fields(tags = request.tags.len()))]
pub async fn invalidate_tags(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let plan = state.invalidator().plan(&request.tags);

    let (plan, skipped) = match plan {
        InvalidationPlan::PurgeKeys(keys) => {
            let outcome = claim(&state, keys.as_slice()).await;
            if outcome.fresh.is_empty() {
                (InvalidationPlan::Nothing, outcome.skipped)
            } else {
                let plan = InvalidationPlan::PurgeKeys(outcome.fresh.iter().cloned().collect());
                purge_claimed(
                    &state,
                    plan.kind(),
                    &outcome.fresh,
                    state.invalidator().execute(&plan),
                )
                .await?;
                (plan, outcome.skipped)
            }
        },
        InvalidationPlan::Nothing => (plan, 0),
        plan => {
            timed(plan.kind(), state.invalidator().execute(&plan)).await?;
            (plan, 0)
        },
    };

    tracing::info!(
        plan = plan.kind(),
        keys = plan.keys().len(),
        skipped,
        "Cache tags invalidated"
    );

    Ok(Json(InvalidateResponse {
        plan: plan.kind(),
        keys: plan.keys().iter().map(|k| k.to_string()).collect(),
        skipped,
    }))
}
