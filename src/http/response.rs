//! Response handling and assembly.
//!
//! # Responsibilities
//! - Give middleware and actions a shared handle to stage response headers
//! - Turn a pipeline payload or an error reply into status, headers, payload
//! - Render the body through an answer renderer
//!
//! # Design Decisions
//! - A payload object with non-null `data` is an envelope; anything else is
//!   the data itself
//! - Header precedence: content type default < staged headers < payload headers
//! - Invalid status codes or header pairs never abort the response

use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Body;
use axum::http::header::{IntoHeaderName, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use serde_json::{Map, Value};

use crate::pipeline::action::{ErrorReply, Renderer};

/// Status used when an action does not pick one.
pub const DEFAULT_SUCCESS_CODE: u16 = 200;

/// Per-request handle for staging response headers.
///
/// Clones share the same state, so detached actions can still write to it,
/// although anything they stage after the response is sent is dropped.
#[derive(Debug, Clone, Default)]
pub struct Response {
    headers: Arc<Mutex<HeaderMap>>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        self.lock().insert(name, value);
    }

    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        self.lock().get(name).cloned()
    }

    /// Snapshot of the staged headers.
    pub fn headers(&self) -> HeaderMap {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HeaderMap> {
        self.headers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Everything needed to write a response, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: u16,
    pub headers: Vec<(String, String)>,
    pub data: Value,
    pub errors: Vec<String>,
    pub meta: Value,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            code: DEFAULT_SUCCESS_CODE,
            headers: Vec::new(),
            data: Value::Array(Vec::new()),
            errors: Vec::new(),
            meta: Value::Object(Map::new()),
        }
    }
}

impl Envelope {
    /// Shape a terminal pipeline payload.
    pub fn success(payload: Value) -> Self {
        let mut envelope = Envelope::default();

        let mut fields = match payload {
            Value::Object(fields) if fields.get("data").is_some_and(|d| !d.is_null()) => fields,
            other => {
                envelope.data = other;
                return envelope;
            }
        };

        match fields.get("code") {
            None | Some(Value::Null) => {}
            Some(code) => match code.as_u64() {
                Some(code) => envelope.code = u16::try_from(code).unwrap_or(u16::MAX),
                None => tracing::warn!(
                    code = %code,
                    "Ignoring non-integer status code, answering {}",
                    DEFAULT_SUCCESS_CODE
                ),
            },
        }
        if let Some(Value::Object(headers)) = fields.remove("headers") {
            envelope.headers = headers
                .into_iter()
                .map(|(name, value)| match value {
                    Value::String(text) => (name, text),
                    other => (name, other.to_string()),
                })
                .collect();
        }
        if let (Some(Value::Object(extra)), Value::Object(meta)) =
            (fields.remove("meta"), &mut envelope.meta)
        {
            meta.extend(extra);
        }
        envelope.data = fields.remove("data").unwrap_or(Value::Null);
        envelope
    }

    /// Shape an error reply, keeping the meta gathered so far.
    pub fn failure(reply: ErrorReply, meta: Value) -> Self {
        Self {
            code: reply.code,
            errors: reply.errors,
            meta,
            ..Envelope::default()
        }
    }

    /// Write the final HTTP response.
    pub fn into_http(
        self,
        content_type: &HeaderValue,
        staged: HeaderMap,
        renderer: &Renderer,
    ) -> HttpResponse {
        let status = StatusCode::from_u16(self.code).unwrap_or_else(|_| {
            tracing::warn!(code = self.code, "Invalid status code, answering 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.clone());
        for (name, value) in staged.iter() {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid response header"),
            }
        }

        let body = match renderer(&self.data, &self.errors, &self.meta) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Answer renderer failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };

        let mut response = HttpResponse::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
