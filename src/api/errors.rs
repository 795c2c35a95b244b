use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Error envelope: `{"success": false, "error": <string | string[]>}`.
/// One message serializes as a bare string, several as an array.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: Value,
}

impl ErrorResponse {
    fn single(message: impl Into<String>) -> Self {
        Self { success: false, error: Value::String(message.into()) }
    }

    fn from_messages(mut messages: Vec<String>) -> Self {
        let error = if messages.len() == 1 {
            Value::String(messages.remove(0))
        } else {
            Value::Array(messages.into_iter().map(Value::String).collect())
        };
        Self { success: false, error }
    }
}

#[derive(Debug)]
pub(crate) enum ApiError {
    /// Accumulated query/body validation failures; always at least one message.
    Validation(Vec<String>),
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(messages) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::from_messages(messages)))
                    .into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::single(message))).into_response()
            }
            ApiError::Unauthorized(message) => {
                let mut response =
                    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::single(message)))
                        .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse::single(message))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::single(message))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::single(message))).into_response()
            }
            ApiError::TooManyRequests(message) => {
                (StatusCode::TOO_MANY_REQUESTS, Json(ErrorResponse::single(message)))
                    .into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::single(message)))
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_message_serializes_as_bare_string() {
        let body = ErrorResponse::from_messages(vec!["search is empty".to_string()]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], serde_json::json!("search is empty"));
    }

    #[test]
    fn multiple_messages_serialize_as_array() {
        let body = ErrorResponse::from_messages(vec![
            "search is empty".to_string(),
            "bogus is an invalid parameter".to_string(),
        ]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["error"],
            serde_json::json!(["search is empty", "bogus is an invalid parameter"])
        );
    }
}
