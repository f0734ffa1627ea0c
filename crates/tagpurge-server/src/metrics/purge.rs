//! Purge metrics recording.

use std::time::Duration;

use metrics::{counter, histogram};

/// Registra las metricas de purge.
pub fn register_purge_metrics() {
    metrics::describe_counter!(
        "tagpurge_purges_total",
        "Purge requests by kind and outcome"
    );
    metrics::describe_histogram!(
        "tagpurge_purge_duration_seconds",
        "Time spent on purge calls to the CDN"
    );
    metrics::describe_counter!(
        "tagpurge_dedup_skipped_keys_total",
        "Surrogate keys skipped because their purge was already in flight"
    );
    metrics::describe_counter!(
        "tagpurge_credential_checks_total",
        "Credential validations by outcome"
    );
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// Registra un purge y su duracion.
pub fn record_purge(kind: &'static str, success: bool, duration: Duration) {
    counter!(
        "tagpurge_purges_total",
        "kind" => kind,
        "outcome" => outcome(success)
    )
    .increment(1);

    histogram!("tagpurge_purge_duration_seconds", "kind" => kind).record(duration.as_secs_f64());
}

/// Registra keys omitidas por tener un purge en vuelo.
pub fn record_dedup_skipped(count: usize) {
    counter!("tagpurge_dedup_skipped_keys_total").increment(count as u64);
}

/// Registra una validacion de credenciales.
pub fn record_credential_check(valid: bool) {
    counter!(
        "tagpurge_credential_checks_total",
        "outcome" => if valid { "valid" } else { "invalid" }
    )
    .increment(1);
}
