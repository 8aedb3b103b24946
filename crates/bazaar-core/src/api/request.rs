//! Description of an outgoing API request.
//!
//! Requests are plain data so the client can replay one after a token
//! refresh, and so transports other than reqwest can be plugged in.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// Request payload. Kept in owned form so a request can be sent twice.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime: mime.into(),
                bytes,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL (e.g. `/products`).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append query parameters from any struct that serializes to a flat map.
    /// `None` fields are skipped.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ApiError> {
        self.query.extend(query_pairs(query)?);
        Ok(self)
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Opt this request out of refresh-and-retry. Used for the credential
    /// endpoints, where a 401 means bad credentials rather than an expired
    /// session.
    pub fn without_refresh(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(_)))
    }

    /// Set `Authorization: Bearer <token>`. Header names are case-insensitive
    /// in the map, so lowercase lookups see the same entry.
    pub fn set_bearer(&mut self, token: &str) -> Result<(), ApiError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("Token is not a valid header value".to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Whether `token` can be sent as a bearer header value.
    pub fn is_usable_token(token: &str) -> bool {
        HeaderValue::from_str(&format!("Bearer {}", token)).is_ok()
    }

    /// The bearer token currently attached, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(query)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode query: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(ApiError::InvalidRequest(
            "Query parameters must serialize to a map".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
        category: Option<String>,
        min_price: Option<f64>,
        page: u32,
    }

    #[test]
    fn test_query_skips_none_fields() {
        let request = ApiRequest::get("/products")
            .query(&Filter {
                category: Some("abc".to_string()),
                min_price: None,
                page: 2,
            })
            .unwrap();

        assert!(request.query.contains(&("category".to_string(), "abc".to_string())));
        assert!(request.query.contains(&("page".to_string(), "2".to_string())));
        assert!(!request.query.iter().any(|(k, _)| k == "minPrice"));
    }

    #[test]
    fn test_query_rejects_non_map() {
        let result = ApiRequest::get("/products").query(&vec![1, 2, 3]);
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_set_bearer_visible_under_lowercase_name() {
        let mut request = ApiRequest::get("/cart");
        request.set_bearer("abc123").unwrap();

        assert_eq!(request.bearer_token(), Some("abc123"));
        assert_eq!(
            request.headers.get("authorization").unwrap().to_str().unwrap(),
            "Bearer abc123"
        );
    }

    #[test]
    fn test_set_bearer_rejects_control_characters() {
        let mut request = ApiRequest::get("/cart");
        assert!(request.set_bearer("bad\ntoken").is_err());
        assert!(request.bearer_token().is_none());
        assert!(!ApiRequest::is_usable_token("bad\ntoken"));
        assert!(ApiRequest::is_usable_token("eyJhbGciOi.abc"));
    }

    #[test]
    fn test_without_refresh_marks_retried() {
        let request = ApiRequest::post("/auth/login").without_refresh();
        assert!(request.is_retried());
        assert!(!ApiRequest::post("/auth/login").is_retried());
    }
}
