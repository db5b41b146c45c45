//! Actions and the registries that name them.
//!
//! # Design Decisions
//! - An action reports a tagged [`Outcome`] rather than overloading booleans
//! - Actions own their inputs (`Arc<Request>`, a cloned [`Response`] handle)
//!   so leftover actions can be detached onto their own tasks
//! - Registries are plain name → capability maps, frozen at construction

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{Map, Value};

use crate::error::PistachioError;
use crate::http::request::Request;
use crate::http::response::Response;

/// What an action tells the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Hand over to the next action.
    Continue,
    /// Stop the chain with `BadRequest`.
    Abort,
    /// Terminal payload. Remaining actions run detached.
    Done(Value),
}

impl From<bool> for Outcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            Outcome::Continue
        } else {
            Outcome::Abort
        }
    }
}

impl From<Value> for Outcome {
    fn from(payload: Value) -> Self {
        Outcome::Done(payload)
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Outcome::Done(reply.into_value())
    }
}

/// Payload envelope understood by the response assembler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub data: Value,
    pub code: Option<u16>,
    pub headers: BTreeMap<String, String>,
    pub meta: Option<Value>,
}

impl Reply {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn meta(mut self, meta: impl Into<Value>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// `{ data, code?, headers?, meta? }`
    pub fn into_value(self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("data".into(), self.data);
        if let Some(code) = self.code {
            envelope.insert("code".into(), code.into());
        }
        if !self.headers.is_empty() {
            let headers = self
                .headers
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            envelope.insert("headers".into(), Value::Object(headers));
        }
        if let Some(meta) = self.meta {
            envelope.insert("meta".into(), meta);
        }
        Value::Object(envelope)
    }
}

pub type ActionFuture = BoxFuture<'static, Result<Outcome, PistachioError>>;

/// A named unit of request handling.
pub type Action = Arc<dyn Fn(Arc<Request>, Response) -> ActionFuture + Send + Sync>;

/// Wrap an async closure as an [`Action`].
pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn(Arc<Request>, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outcome, PistachioError>> + Send + 'static,
{
    Arc::new(move |req: Arc<Request>, res: Response| f(req, res).boxed())
}

/// Wrap a synchronous closure as an [`Action`].
pub fn sync_action<F>(f: F) -> Action
where
    F: Fn(&Request, &Response) -> Result<Outcome, PistachioError> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |req: Arc<Request>, res: Response| {
        let f = Arc::clone(&f);
        async move { f(&req, &res) }.boxed()
    })
}

/// `{ code, errors }` produced by an error action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    pub code: u16,
    pub errors: Vec<String>,
}

impl ErrorReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            errors: vec![message.into()],
        }
    }
}

/// Maps a caught error to a status code and error list.
/// Receives the request, the response handle for staging headers, and the
/// response meta gathered so far.
pub type ErrorAction = Arc<dyn Fn(&Request, &Response, &Value) -> ErrorReply + Send + Sync>;

/// Serializes `(data, errors, meta)` into a response body.
pub type Renderer =
    Arc<dyn Fn(&Value, &[String], &Value) -> Result<String, PistachioError> + Send + Sync>;

/// Name → capability map.
#[derive(Clone)]
pub struct Registry<T> {
    entries: HashMap<String, T>,
}

pub type ActionRegistry = Registry<Action>;
pub type ErrorActionRegistry = Registry<ErrorAction>;
pub type RendererRegistry = Registry<Renderer>;

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `value` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, value: T) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` win over entries of `self`.
    pub fn extend(&mut self, other: Registry<T>) {
        self.entries.extend(other.entries);
    }
}

impl<T: Clone> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}
