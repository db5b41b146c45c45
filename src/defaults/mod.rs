//! Default tables and capabilities merged under caller overrides.
//!
//! # Data Flow
//! ```text
//! actions.rs  → allHealth / allInfo / allMap
//! errors.rs   → HTTP error catalog (error actions + error routes)
//! answers.rs  → seonApi JSON envelope renderer
//!     → Capabilities::new() registers them
//!     → PistachioConfig::with_defaults() lays caller tables over them
//! ```

pub mod actions;
pub mod answers;
pub mod errors;

use crate::routing::{HandlerSpec, MethodHandler, RouteTable};

/// `/health`, `/info` and `/map`, answered for any method.
pub fn routes() -> RouteTable<HandlerSpec> {
    RouteTable::new()
        .with("/health", HandlerSpec::any(MethodHandler::from(actions::ALL_HEALTH)))
        .with("/info", HandlerSpec::any(MethodHandler::from(actions::ALL_INFO)))
        .with("/map", HandlerSpec::any(MethodHandler::from(actions::ALL_MAP)))
}

/// `default` → `seonApi`.
pub fn answers() -> RouteTable<String> {
    RouteTable::new().with(answers::DEFAULT_ANSWER, answers::SEON_API.to_string())
}
