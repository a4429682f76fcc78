use axum::http::StatusCode;
use thiserror::Error;

/// Common trait for errors that are reported to HTTP clients
pub trait AppError: std::error::Error + Send + Sync + 'static {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Get the message placed in the `error` field of the envelope
    fn user_message(&self) -> String;

    /// Get a stable identifier for logs
    fn error_code(&self) -> &'static str;
}

/// Implements IntoResponse with the `{"status":"error","error":...}` envelope
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                use crate::errors::AppError;
                use axum::response::Json;

                let status = self.status_code();
                if status.is_server_error() {
                    tracing::error!("{} [{}]: {}", status, self.error_code(), self);
                } else {
                    tracing::warn!("{} [{}]: {}", status, self.error_code(), self);
                }

                let body = Json(crate::models::ApiResponse::<()>::error(self.user_message()));
                (status, body).into_response()
            }
        }
    };
}

pub(crate) use impl_into_response;

/// Errors raised by the HTTP transport before or after the core runs
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unsupported file type: {content_type}")]
    UnsupportedFileType { content_type: String },

    #[error("Endpoint not found")]
    NotFound,

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Internal server error: {message}")]
    InternalServerError { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalServerError { message: message.into() }
    }
}

impl AppError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedFileType { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest { message } => message.clone(),
            ApiError::UnsupportedFileType { content_type } => {
                format!("Unsupported file type: {}", content_type)
            }
            ApiError::NotFound => "Endpoint not found".to_string(),
            ApiError::PayloadTooLarge { message } => message.clone(),
            ApiError::InternalServerError { .. } => "Internal server error".to_string(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl_into_response!(ApiError);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use serde_json::Value;

    async fn body_json(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let (status, body) = body_json(ApiError::bad_request("Report text is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Report text is required");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_json(ApiError::internal("join error: task panicked")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_unsupported_type_message() {
        let error = ApiError::UnsupportedFileType { content_type: "application/zip".to_string() };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.user_message(), "Unsupported file type: application/zip");
    }
}
