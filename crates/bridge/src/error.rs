//! Unified error handling for the webhook endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::router::RouteError;

/// HTTP-facing error for the webhook endpoint.
///
/// Only produced before the acknowledgement; after that, handler failures are
/// reported to the user in Slack instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed signature verification.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Body is neither form-encoded nor JSON.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::Unauthorized(reason) => Self::Unauthorized(reason.to_string()),
            RouteError::UnsupportedMediaType(raw) => Self::UnsupportedMediaType(raw),
            RouteError::Malformed(detail) => Self::BadRequest(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Webhook request rejected");

        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Verification details stay in the logs.
        let message = match &self {
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::UnsupportedMediaType(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::RejectReason;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_route_error_conversion() {
        assert!(matches!(
            AppError::from(RouteError::Unauthorized(RejectReason::Mismatch)),
            AppError::Unauthorized(reason) if reason == "signature mismatch"
        ));
        assert!(matches!(
            AppError::from(RouteError::Malformed("eof".to_string())),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::UnsupportedMediaType("text/plain".to_string())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}
