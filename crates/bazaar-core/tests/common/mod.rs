//! Shared fixtures: a scripted in-memory transport and a notifier that
//! records what it was told.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bazaar_core::api::{
    ApiRequest, Notice, Notifier, RawResponse, RequestBody, Transport, TransportError,
};
use bazaar_core::auth::TokenPair;
use bazaar_core::{ApiClient, ClientConfig, Session};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://api.test/api/v1";

pub type Reply = Result<RawResponse, TransportError>;

type Handler = Box<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

/// What the transport saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<Value>,
    pub multipart: bool,
}

pub struct ScriptedTransport {
    handler: Handler,
    recorded: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    /// Answer every request with `handler`.
    pub fn new(handler: impl Fn(&ApiRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            recorded: Mutex::new(Vec::new()),
        })
    }

    /// Answer requests with `replies` in order.
    pub fn queue(replies: Vec<Reply>) -> Arc<Self> {
        let replies = Mutex::new(VecDeque::from(replies));
        Self::new(move |request| {
            replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request to {}", request.path))
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.recorded.lock().unwrap().push(record(url, request));
        (self.handler)(request)
    }
}

pub fn record(url: &str, request: &ApiRequest) -> Recorded {
    Recorded {
        method: request.method.clone(),
        url: url.to_string(),
        path: request.path.clone(),
        query: request.query.clone(),
        bearer: request.bearer_token().map(str::to_string),
        body: match &request.body {
            Some(RequestBody::Json(value)) => Some(value.clone()),
            _ => None,
        },
        multipart: request.is_multipart(),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub session: Arc<Session>,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness(transport: Arc<ScriptedTransport>) -> Harness {
    let session = Arc::new(Session::in_memory());
    let notifier = Arc::new(RecordingNotifier::default());
    let client = ApiClient::with_transport(
        ClientConfig::new(BASE_URL),
        session.clone(),
        transport.clone(),
    )
    .with_notifier(notifier.clone());

    Harness {
        client,
        session,
        transport,
        notifier,
    }
}

pub fn sign_in(session: &Session, access: &str, refresh: Option<&str>) {
    session
        .store_tokens(&TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
        })
        .unwrap();
}

pub fn ok(data: Value) -> Reply {
    Ok(RawResponse::json(
        StatusCode::OK,
        &json!({ "success": true, "data": data }),
    ))
}

pub fn fail(status: u16, message: &str) -> Reply {
    Ok(RawResponse::json(
        StatusCode::from_u16(status).unwrap(),
        &json!({ "success": false, "error": { "message": message } }),
    ))
}

pub fn unauthorized() -> Reply {
    fail(401, "Token expired")
}

pub fn refreshed(access: &str, refresh: &str) -> Reply {
    ok(json!({ "accessToken": access, "refreshToken": refresh }))
}

pub fn connection_refused() -> Reply {
    Err(TransportError::Connect("connection refused".to_string()))
}
