//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use switchyard_domain::error::SwitchyardError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SwitchyardError`] to an HTTP response with appropriate status code.
pub struct ApiError(SwitchyardError);

impl From<SwitchyardError> for ApiError {
    fn from(err: SwitchyardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SwitchyardError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SwitchyardError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            SwitchyardError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
