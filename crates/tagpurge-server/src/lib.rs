//! # Tagpurge Server
//!
//! HTTP hooks a CMS calls to keep Fastly in sync with its cache tags.
//!
//! ## Routes
//!
//! - `GET /health`, `GET /status`, `GET /metrics`
//! - `POST /credentials/validate`
//! - `POST /invalidate` with `{"tags": [...]}`
//! - `POST /surrogate-keys` with `{"tags": [...]}`
//! - `POST /purge/all`, `POST /purge/url`, `POST /purge/keys`

pub mod cache;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router_with_state, run_server_with_state};
pub use settings::{Settings, SettingsError};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
