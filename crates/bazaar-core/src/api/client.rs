//! API client for the marketplace REST API.
//!
//! `ApiClient` is the single choke point for outbound traffic. Per request:
//!
//! 1. default headers are merged and the stored access token is attached
//! 2. a 401 on a request that has not been retried triggers one refresh
//!    exchange and one replay of the original request
//! 3. any other failure raises a notice and is returned as an `ApiError`

use std::sync::Arc;

use anyhow::Result;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::envelope::Envelope;
use super::notify::{Notifier, QuietNotifier, TracingNotifier};
use super::request::{ApiRequest, FormPart};
use super::transport::{RawResponse, ReqwestTransport, Transport, TransportError};
use super::ApiError;
use crate::auth::{Session, SessionEvent, TokenPair};
use crate::config::ClientConfig;

/// Refresh exchange endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    #[serde(alias = "token")]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Marketplace API client.
/// Clone is cheap - all state is shared behind `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    pub fn with_transport(
        config: ClientConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            session,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replace the notifier that receives failure notices.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// A clone sharing the session and transport that raises no notices.
    pub fn quietly(&self) -> Self {
        self.clone().with_notifier(Arc::new(QuietNotifier))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Send a request through the interceptor pipeline and return the raw
    /// 2xx response.
    pub async fn send(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        self.apply_default_headers(&mut request);
        // The token as stored, even when it could not be attached
        let stored_token = self.session.access_token();
        self.attach_credentials(&mut request, stored_token.as_deref());
        let url = self.config.endpoint(&request.path);

        debug!(method = %request.method, path = %request.path, authenticated = request.bearer_token().is_some(), "Sending request");
        let outcome = self.transport.send(&url, &request).await;

        match outcome {
            Ok(response)
                if response.status == StatusCode::UNAUTHORIZED && !request.is_retried() =>
            {
                request.mark_retried();
                let token = self.recover_session(stored_token.as_deref()).await?;
                request.set_bearer(&token)?;

                debug!(path = %request.path, "Retrying request with refreshed token");
                let retried = self.transport.send(&url, &request).await;
                self.settle(&request, retried)
            }
            other => self.settle(&request, other),
        }
    }

    fn apply_default_headers(&self, request: &mut ApiRequest) {
        for (name, value) in self.config.default_headers.iter() {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }
        // The transport sets the multipart boundary itself
        if request.is_multipart() {
            request.headers.remove(CONTENT_TYPE);
        }
    }

    /// Attach `token` as the bearer. Never fails: an unusable token leaves
    /// the request unauthenticated.
    fn attach_credentials(&self, request: &mut ApiRequest, token: Option<&str>) {
        let Some(token) = token else {
            return;
        };
        if let Err(e) = request.set_bearer(token) {
            warn!(error = %e, "Stored access token is unusable, sending unauthenticated");
        }
    }

    /// Turn a final transport outcome into the caller's result, raising a
    /// notice for categorized failures.
    fn settle(
        &self,
        request: &ApiRequest,
        outcome: Result<RawResponse, TransportError>,
    ) -> Result<RawResponse, ApiError> {
        let error = match outcome {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) => ApiError::from_status(response.status, &response.body),
            Err(e) => ApiError::from(e),
        };

        debug!(method = %request.method, path = %request.path, error = %error, "Request failed");
        if let Some(notice) = error.notice() {
            self.notifier.notify(notice);
        }
        Err(error)
    }

    /// Obtain a fresh access token after a 401.
    ///
    /// Only one refresh runs at a time. A caller that waited on the lock and
    /// finds the token already rotated reuses it instead of refreshing again.
    /// `stored_token` is the access token read for the failed request.
    async fn recover_session(&self, stored_token: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.session.refresh_guard().await;

        let current = self.session.access_token();
        if let Some(ref current) = current {
            if Some(current.as_str()) != stored_token && ApiRequest::is_usable_token(current) {
                debug!("Access token already rotated by a concurrent refresh");
                return Ok(current.clone());
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            if stored_token.is_some() && current.is_none() {
                // Ended while this request waited; Expired has already fired
                debug!("Session already ended by a concurrent request");
                return Err(ApiError::SessionExpired);
            }
            info!("No refresh token stored, ending session");
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.session.store_tokens(&pair) {
                    warn!(error = %e, "Failed to persist refreshed tokens");
                }
                self.session.emit(SessionEvent::Refreshed);
                info!("Access token refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.expire_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Call the refresh endpoint directly on the transport, bypassing the
    /// interceptor so a failing refresh can never recurse.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let mut request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh_token })?
            .without_refresh();
        self.apply_default_headers(&mut request);
        let url = self.config.endpoint(REFRESH_PATH);

        let response = self
            .transport
            .send(&url, &request)
            .await
            .map_err(ApiError::from)?;

        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }

        let data = Envelope::<RefreshData>::decode(&response.body)?.into_result()?;
        if data.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Refresh response has no access token".to_string(),
            ));
        }
        if !ApiRequest::is_usable_token(&data.access_token) {
            return Err(ApiError::InvalidResponse(
                "Refresh response token is not a valid header value".to_string(),
            ));
        }

        Ok(TokenPair {
            access_token: data.access_token,
            refresh_token: data.refresh_token.filter(|t| !t.is_empty()),
        })
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        self.session.emit(SessionEvent::Expired);
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    /// Send a request and decode the `data` field of the envelope.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Envelope::<T>::decode(&response.body)?.into_result()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(ApiRequest::get(path).query(query)?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::delete(path)).await
    }

    /// Multipart POST, used for media uploads.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        self.request(ApiRequest::post(path).multipart(parts)).await
    }
}
