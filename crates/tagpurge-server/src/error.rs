use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tagpurge_core::TagpurgeError;
use tagpurge_fastly::FastlyError;

#[derive(Debug)]
pub enum AppError {
    /// Parametros invalidos
    BadRequest(String),

    /// Credenciales que no pueden purgar
    Forbidden(String),

    /// El CDN rechazo o no confirmo el purge
    BadGateway(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<FastlyError> for AppError {
    fn from(err: FastlyError) -> Self {
        match err {
            FastlyError::InvalidCredentials => AppError::Forbidden(err.to_string()),
            FastlyError::NotConfigured(_) | FastlyError::InvalidConfig(_) => {
                AppError::Internal(err.to_string())
            },
            e if e.is_bad_input() => AppError::BadRequest(e.to_string()),
            e => AppError::BadGateway(e.to_string()),
        }
    }
}

impl From<TagpurgeError> for AppError {
    fn from(err: TagpurgeError) -> Self {
        if err.is_bad_input() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "Bad Gateway", msg),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
