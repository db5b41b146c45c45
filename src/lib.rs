//! Pistachio: a configuration-driven HTTP application server.
//!
//! Requests are routed by path pattern to named actions registered as
//! [`Capabilities`]; results are shaped into a `{ data, errors, meta }`
//! envelope by pluggable answer renderers.

pub mod capabilities;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;

pub use capabilities::Capabilities;
pub use config::schema::PistachioConfig;
pub use error::PistachioError;
pub use http::{Pistachio, Request, Response, RunningServer};
pub use lifecycle::Shutdown;
pub use pipeline::{action, sync_action, Outcome, Reply};
