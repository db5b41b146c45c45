//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (read body, split query, build Request)
//!     → [middleware chain, route lookup, action pipeline]
//!     → response.rs (envelope, headers, answer renderer)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, Request, RequestBody, X_REQUEST_ID};
pub use response::{Envelope, Response};
pub use server::{Pistachio, RunningServer};
