//! The `{ success, data, error }` response envelope and the two-shape
//! outcome wrapper built on top of it.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::error::{ApiError, ServerError};

/// Message used when a failure carries no server-supplied text.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ServerError>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response envelope: {}", e)))
    }

    /// Unwrap `data`, turning `success: false` into [`ApiError::Rejected`].
    /// A missing `data` is accepted only when `T` can be built from `null`
    /// (`()`, `Option<_>`, `Value`).
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            let error = self
                .error
                .or_else(|| self.message.map(ServerError::new))
                .unwrap_or_else(|| ServerError::new(DEFAULT_ERROR_MESSAGE));
            return Err(ApiError::Rejected(error));
        }

        match self.data {
            Some(data) => Ok(data),
            None => serde_json::from_value(Value::Null)
                .map_err(|_| ApiError::InvalidResponse("Response envelope has no data".to_string())),
        }
    }
}

/// Result of a wrapped call: exactly one of `{success: true, data}` or
/// `{success: false, error}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> ApiOutcome<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiOutcome::Success(data),
            Err(err) => ApiOutcome::Failure(
                err.server_message()
                    .unwrap_or(DEFAULT_ERROR_MESSAGE)
                    .to_string(),
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiOutcome::Success(data) => Some(data),
            ApiOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiOutcome::Success(_) => None,
            ApiOutcome::Failure(message) => Some(message),
        }
    }
}

impl<T: Serialize> Serialize for ApiOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiOutcome", 2)?;
        match self {
            ApiOutcome::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ApiOutcome::Failure(message) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", message)?;
            }
        }
        state.end()
    }
}

/// Await `call` and fold its result into an [`ApiOutcome`].
pub async fn api_call<T, F>(call: F) -> ApiOutcome<T>
where
    F: Future<Output = Result<T, ApiError>>,
{
    ApiOutcome::from_result(call.await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Products {
        products: Vec<String>,
    }

    #[test]
    fn test_envelope_success_with_data() {
        let body = r#"{"success":true,"data":{"products":["a","b"]}}"#;
        let data = Envelope::<Products>::decode(body).unwrap().into_result().unwrap();
        assert_eq!(data.products, vec!["a", "b"]);
    }

    #[test]
    fn test_envelope_success_without_data() {
        let body = r#"{"success":true,"message":"Deleted"}"#;
        Envelope::<()>::decode(body).unwrap().into_result().unwrap();

        let missing = Envelope::<Products>::decode(body).unwrap().into_result();
        assert!(matches!(missing, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_envelope_rejected() {
        let body = r#"{"success":false,"error":{"message":"Out of stock"}}"#;
        let err = Envelope::<Products>::decode(body).unwrap().into_result().unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(err.server_message(), Some("Out of stock"));
    }

    #[test]
    fn test_envelope_not_json() {
        assert!(matches!(
            Envelope::<Products>::decode("<html>"),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_outcome_shapes() {
        let ok: ApiOutcome<Value> = ApiOutcome::Success(json!({"products": []}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "data": {"products": []}})
        );

        let failed: ApiOutcome<Value> = ApiOutcome::Failure("Out of stock".to_string());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "error": "Out of stock"})
        );
    }

    #[tokio::test]
    async fn test_api_call_extracts_message_or_falls_back() {
        let outcome: ApiOutcome<()> = api_call(async {
            Err(ApiError::Validation {
                status: 400,
                error: Some(ServerError::new("Email is required")),
                body: String::new(),
            })
        })
        .await;
        assert_eq!(outcome.error(), Some("Email is required"));

        let outcome: ApiOutcome<()> =
            api_call(async { Err(ApiError::Network("connection refused".into())) }).await;
        assert_eq!(outcome.error(), Some(DEFAULT_ERROR_MESSAGE));

        let outcome = api_call(async { Ok::<_, ApiError>(42) }).await;
        assert_eq!(outcome.data(), Some(&42));
        assert!(outcome.is_success());
    }
}
