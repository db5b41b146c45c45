//! Request preprocessing.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Keep the raw URL, split path from query string
//! - Buffer the body and expose it as text
//! - Carry route params and middleware extensions to the actions
//!
//! # Design Decisions
//! - The body is read fully before any middleware runs
//! - Query parsing is flat: no percent-decoding, last duplicate wins
//! - A body read failure rejects the whole preparation

use std::any::Any;
use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{self, Extensions, HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::capabilities::Storage;
use crate::error::PistachioError;
use crate::routing::Params;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const QUERY_SEPARATOR: char = '?';
const PAIR_SEPARATOR: char = '&';
const KEY_VALUE_SEPARATOR: char = '=';

/// Flat query mapping. A pair without `=` maps to `None`.
pub type Query = BTreeMap<String, Option<String>>;

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Buffered request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No bytes arrived. Reads as an empty JSON object.
    #[default]
    Empty,
    Text(String),
}

impl Serialize for RequestBody {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestBody::Empty => serde_json::Map::new().serialize(serializer),
            RequestBody::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl RequestBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Text(text) => Some(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Deserialize the body as JSON; an empty body reads as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            RequestBody::Empty => serde_json::from_str("{}"),
            RequestBody::Text(text) => serde_json::from_str(text),
        }
    }
}

/// Request record handed to middleware and actions.
#[derive(Debug, Default)]
pub struct Request {
    pub id: Option<String>,
    pub method: Method,
    pub headers: HeaderMap,
    /// Path and query as received.
    pub raw_url: String,
    /// Path only.
    pub url: String,
    pub query: Query,
    pub body: RequestBody,
    pub params: Params,
    /// Values attached by middleware.
    pub extensions: Extensions,
    storage: Option<Storage>,
}

impl Request {
    /// Build a request from its raw URL, splitting off the query string.
    pub fn new(method: Method, raw_url: impl Into<String>) -> Self {
        let raw_url = raw_url.into();
        let (url, query) = parse_url(&raw_url);
        Self {
            id: None,
            method,
            headers: HeaderMap::new(),
            raw_url,
            url,
            query,
            body: RequestBody::Empty,
            params: Params::new(),
            extensions: Extensions::new(),
            storage: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Text(body)
        };
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Query value for `key`; `None` when absent or given without `=`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(|v| v.as_deref())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn attach_storage(&mut self, storage: Option<Storage>) {
        self.storage = storage;
    }

    /// The configured storage collaborator, if it is a `T`.
    pub fn storage<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.storage.as_ref().and_then(|s| s.downcast_ref::<T>())
    }
}

/// Turn an inbound HTTP request into a [`Request`], reading the whole body.
pub async fn prepare(
    request: http::Request<Body>,
    max_body_size: usize,
) -> Result<Request, PistachioError> {
    let (parts, body) = request.into_parts();

    let raw_url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let bytes = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| PistachioError::Body(e.to_string()))?;

    let id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut prepared = Request::new(parts.method, raw_url)
        .with_body(String::from_utf8_lossy(&bytes).into_owned());
    prepared.id = id;
    prepared.headers = parts.headers;
    prepared.extensions = parts.extensions;
    Ok(prepared)
}

/// Split a raw URL into its path and flat query mapping.
///
/// Only the text between the first and second `?` is parsed, and only the
/// text between the first and second `=` of a pair becomes its value.
pub fn parse_url(raw_url: &str) -> (String, Query) {
    let mut query = Query::new();
    if !raw_url.contains(QUERY_SEPARATOR) {
        return (raw_url.to_string(), query);
    }

    let mut parts = raw_url.split(QUERY_SEPARATOR);
    let url = parts.next().unwrap_or_default().to_string();
    let query_string = parts.next().unwrap_or_default();

    for pair in query_string.split(PAIR_SEPARATOR) {
        let mut key_value = pair.split(KEY_VALUE_SEPARATOR);
        let key = key_value.next().unwrap_or_default().to_string();
        let value = key_value.next().map(str::to_string);
        query.insert(key, value);
    }
    (url, query)
}
