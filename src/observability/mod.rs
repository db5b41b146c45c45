//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request ID in spans)
//!     → logger capability (listen notice, caught errors)
//!
//! Consumers:
//!     → tracing-subscriber fmt layer (stdout)
//!     → any injected Logger implementation
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the tower-http trace span
//! - The logger capability is separate from tracing so hosts can route
//!   server notices elsewhere

pub mod logging;

pub use logging::{Logger, TracingLogger};
