//! Error taxonomy for the request pipeline.
//!
//! # Design Decisions
//! - Every error carries an identifier that doubles as an Error Route Table key
//! - Errors raised by actions and middleware are identified by their message
//! - Identifiers without a registered error route fall back to `BadGateway`

use std::borrow::Cow;

use crate::config::loader::ConfigError;

/// Identifier of the "no actions produced output" error.
pub const NOT_IMPLEMENTED: &str = "NotImplemented";

/// Identifier of the "an action aborted the chain" error.
pub const BAD_REQUEST: &str = "BadRequest";

/// Identifier used when an error has no registered error route.
pub const BAD_GATEWAY: &str = "BadGateway";

/// Identifier of failures inside the server itself.
pub const INTERNAL_ERROR: &str = "InternalError";

/// Errors produced while serving a request or running the server.
#[derive(Debug, thiserror::Error)]
pub enum PistachioError {
    /// No action resolved for the route, or the chain ran out of actions.
    #[error("NotImplemented")]
    NotImplemented,

    /// An action explicitly aborted the chain.
    #[error("BadRequest")]
    BadRequest,

    /// An error raised by an action or middleware, identified by its message.
    #[error("{0}")]
    Raised(String),

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// A middleware settled without handing the request back.
    #[error("middleware {0} did not hand the request back")]
    RequestLost(usize),

    /// The answer renderer could not serialize the response.
    #[error("failed to render response: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PistachioError {
    /// Raise an error identified by `identifier`, e.g. `"Unauthorized"`.
    pub fn raise(identifier: impl Into<String>) -> Self {
        PistachioError::Raised(identifier.into())
    }

    /// Key under which the Error Route Table is consulted for this error.
    pub fn identifier(&self) -> Cow<'_, str> {
        match self {
            PistachioError::NotImplemented => Cow::Borrowed(NOT_IMPLEMENTED),
            PistachioError::BadRequest | PistachioError::Body(_) => Cow::Borrowed(BAD_REQUEST),
            PistachioError::Raised(message) => Cow::Borrowed(message.as_str()),
            PistachioError::RequestLost(_) => Cow::Borrowed(INTERNAL_ERROR),
            other => Cow::Owned(other.to_string()),
        }
    }
}
