use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use sedp_core::Error as CoreError;
use sedp_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Body or query string that could not be decoded.
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },

    #[error("missing or invalid token")]
    Unauthorized,

    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Core(e) => match e {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                CoreError::DuplicateRegistration { .. } => {
                    (StatusCode::CONFLICT, "duplicate_registration")
                }
                CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                CoreError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
                CoreError::Authentication => (StatusCode::UNAUTHORIZED, "authentication_error"),
                CoreError::Storage(_) | CoreError::Encode { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
                }
            },
            Self::Malformed { status, .. } => (*status, "validation_error"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Syntax and shape errors are both client mistakes; keep 415 for a
        // missing content type.
        let status = match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::Malformed {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        // Storage details stay in the log, not in the response.
        let message = if status.is_server_error() {
            error!("{}", self);
            "Something went wrong, please try again".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Run a synchronous core call off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> sedp_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
