use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use compare::CompareError;
use perceptual::PerceptualError;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Comparison error: {0}")]
    Compare(CompareError),

    #[error("Perceptual error: {0}")]
    Perceptual(#[from] PerceptualError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_)
            | ServerError::Validation(_)
            | ServerError::Perceptual(PerceptualError::InvalidHex(_)) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Perceptual(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Compare(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::Compare(_) => "COMPARE_ERROR",
            ServerError::Perceptual(_) => "PERCEPTUAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

// Validation problems are the caller's fault; everything else from the
// comparison layer is ours.
impl From<CompareError> for ServerError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::Validation(msg) => ServerError::Validation(msg),
            other => ServerError::Compare(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_validation_maps_to_400() {
        let err: ServerError = CompareError::Validation("too many".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn fingerprint_invariant_maps_to_500() {
        let err: ServerError = CompareError::Fingerprint(PerceptualError::LengthMismatch {
            left: 64,
            right: 256,
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn perceptual_errors_split_by_cause() {
        let hex: ServerError = PerceptualError::InvalidHex("zz".into()).into();
        assert_eq!(hex.status_code(), StatusCode::BAD_REQUEST);

        let mismatch: ServerError = PerceptualError::LengthMismatch {
            left: 64,
            right: 256,
        }
        .into();
        assert_eq!(mismatch.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
