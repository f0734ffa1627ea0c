//! Middleware stack para el servidor HTTP.
//!
//! Middleware de Tower que se aplican a todas las requests:
//! - `RequestIdLayer`: genera o propaga X-Request-Id y lo deja en las extensions
//! - `LoggingLayer`: logging estructurado de requests

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
