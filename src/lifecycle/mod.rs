//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (http::server):
//!     Merge config → Validate → Freeze core → Bind → "listen on port N"
//!
//! Shutdown (shutdown.rs):
//!     stop() or Ctrl+C → Stop accepting → Drain in-flight requests → Callback
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before binding
//! - Detached background actions are not drained on shutdown

pub mod shutdown;

pub use shutdown::Shutdown;
