use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::notify::Notice;
use super::transport::TransportError;

/// Error object the server puts under `error` in the envelope.
/// Accepts both `{"error": "text"}` and `{"error": {"message": ..., "details": [...]}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ServerErrorRepr")]
pub struct ServerError {
    pub message: String,
    pub code: Option<String>,
    pub details: Vec<ErrorDetail>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServerErrorRepr {
    Text(String),
    Full {
        #[serde(default)]
        message: String,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        details: Vec<ErrorDetail>,
    },
}

impl From<ServerErrorRepr> for ServerError {
    fn from(repr: ServerErrorRepr) -> Self {
        match repr {
            ServerErrorRepr::Text(message) => ServerError::new(message),
            ServerErrorRepr::Full {
                message,
                code,
                details,
            } => ServerError {
                message,
                code,
                details,
            },
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ErrorDetailRepr")]
pub struct ErrorDetail {
    pub field: Option<String>,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetailRepr {
    Text(String),
    Full {
        #[serde(default, alias = "path", alias = "param")]
        field: Option<String>,
        #[serde(default, alias = "msg")]
        message: String,
    },
}

impl From<ErrorDetailRepr> for ErrorDetail {
    fn from(repr: ErrorDetailRepr) -> Self {
        match repr {
            ErrorDetailRepr::Text(message) => ErrorDetail {
                field: None,
                message,
            },
            ErrorDetailRepr::Full { field, message } => ErrorDetail { field, message },
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ServerError>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session may have expired")]
    Unauthorized(Option<ServerError>),

    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Validation failed: {}", describe(.error, "bad request"))]
    Validation {
        status: u16,
        error: Option<ServerError>,
        /// Raw response body, for diagnostics only
        body: String,
    },

    #[error("Access denied: {}", describe(.0, "forbidden"))]
    AccessDenied(Option<ServerError>),

    #[error("Resource not found: {}", describe(.0, "no such resource"))]
    NotFound(Option<ServerError>),

    #[error("Conflict: {}", describe(.0, "resource already exists"))]
    Conflict(Option<ServerError>),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {}", describe(.error, "internal error"))]
    Server {
        status: u16,
        error: Option<ServerError>,
    },

    #[error("Status {status}: {body}")]
    Status {
        status: u16,
        error: Option<ServerError>,
        body: String,
    },

    #[error("Request rejected: {}", .0.message)]
    Rejected(ServerError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for ApiError {
    /// Only failures to reach the server count as network errors. A request
    /// that could not be built is a local problem.
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Request(msg) => ApiError::InvalidRequest(msg),
            TransportError::Body(msg) => ApiError::InvalidResponse(msg),
            other => ApiError::Network(other.to_string()),
        }
    }
}

fn describe(error: &Option<ServerError>, fallback: &str) -> String {
    match error {
        Some(e) if !e.message.is_empty() => e.message.clone(),
        _ => fallback.to_string(),
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the server's error object out of an error response body.
    fn parse_error_body(body: &str) -> Option<ServerError> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .error
            .or_else(|| parsed.message.map(ServerError::new))
            .filter(|e| !e.message.is_empty() || !e.details.is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let error = Self::parse_error_body(body);
        match status.as_u16() {
            400 | 422 => ApiError::Validation {
                status: status.as_u16(),
                error,
                body: Self::truncate_body(body),
            },
            401 => ApiError::Unauthorized(error),
            403 => ApiError::AccessDenied(error),
            404 => ApiError::NotFound(error),
            409 => ApiError::Conflict(error),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Server {
                status: status.as_u16(),
                error,
            },
            code => ApiError::Status {
                status: code,
                error,
                body: Self::truncate_body(body),
            },
        }
    }

    fn server_error(&self) -> Option<&ServerError> {
        match self {
            ApiError::Rejected(e) => Some(e),
            ApiError::Unauthorized(e)
            | ApiError::AccessDenied(e)
            | ApiError::NotFound(e)
            | ApiError::Conflict(e)
            | ApiError::Server { error: e, .. }
            | ApiError::Validation { error: e, .. }
            | ApiError::Status { error: e, .. } => e.as_ref(),
            _ => None,
        }
    }

    /// The server-supplied message, when the response carried one.
    pub fn server_message(&self) -> Option<&str> {
        self.server_error()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
    }

    /// Field-level details, preserved for validation failures.
    pub fn details(&self) -> &[ErrorDetail] {
        self.server_error().map(|e| e.details.as_slice()).unwrap_or(&[])
    }

    pub fn status(&self) -> Option<StatusCode> {
        let code = match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::AccessDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::RateLimited => 429,
            ApiError::Validation { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Status { status, .. } => *status,
            _ => return None,
        };
        StatusCode::from_u16(code).ok()
    }

    /// Notice category shown to the user for this failure, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ApiError::Server { .. } => Some(Notice::ServerError),
            ApiError::NotFound(_) => Some(Notice::NotFound),
            ApiError::AccessDenied(_) => Some(Notice::Forbidden),
            ApiError::Network(_) => Some(Notice::Network),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_categories() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(None)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "{}"),
            ApiError::NotFound(None)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "short and stout"),
            ApiError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn test_validation_keeps_details() {
        let body = r#"{"success":false,"error":{"message":"Validation failed","details":[{"path":"email","msg":"Email is required"},"Password too short"]}}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.server_message(), Some("Validation failed"));
        let details = err.details();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field.as_deref(), Some("email"));
        assert_eq!(details[0].message, "Email is required");
        assert_eq!(details[1].field, None);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_plain_string_error_and_top_level_message() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"error":"Sellers only"}"#);
        assert_eq!(err.server_message(), Some("Sellers only"));
        assert_eq!(err.to_string(), "Access denied: Sellers only");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"Product not found"}"#);
        assert_eq!(err.server_message(), Some("Product not found"));
    }

    #[test]
    fn test_non_json_body() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "Server error (500): internal error");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "Validation failed: bad request");

        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "<html>Bad Request</html>");
        assert_eq!(err.server_message(), None);
        assert!(err.details().is_empty());
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(matches!(
            err,
            ApiError::Validation { ref body, .. } if body == "<html>Bad Request</html>"
        ));
    }

    #[test]
    fn test_notice_mapping() {
        assert_eq!(
            ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "").notice(),
            Some(Notice::ServerError)
        );
        assert_eq!(
            ApiError::from_status(StatusCode::NOT_FOUND, "").notice(),
            Some(Notice::NotFound)
        );
        assert_eq!(
            ApiError::from_status(StatusCode::FORBIDDEN, "").notice(),
            Some(Notice::Forbidden)
        );
        assert_eq!(
            ApiError::Network("connection refused".into()).notice(),
            Some(Notice::Network)
        );
        assert_eq!(ApiError::from_status(StatusCode::BAD_REQUEST, "").notice(), None);
        assert_eq!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").notice(), None);
        assert_eq!(ApiError::SessionExpired.notice(), None);
    }

    #[test]
    fn test_transport_error_mapping() {
        let err = ApiError::from(TransportError::Request("builder error: invalid mime".into()));
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(err.notice(), None);

        let err = ApiError::from(TransportError::Body("connection reset".into()));
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(err.notice(), None);

        assert_eq!(ApiError::from(TransportError::Timeout).notice(), Some(Notice::Network));
        assert_eq!(
            ApiError::from(TransportError::Connect("refused".into())).notice(),
            Some(Notice::Network)
        );
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
