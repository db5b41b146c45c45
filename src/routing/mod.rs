//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → matcher.rs (literal lookup, then token-wise pattern match)
//!     → Return: handler spec (or none) + captured params
//!
//! Table assembly (at construction):
//!     default tables
//!     → table.rs (merge caller overrides, keep order)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables built once, immutable at runtime
//! - The same matcher serves routes and answer renderers
//! - Deterministic: same table and path always give the same match

pub mod matcher;
pub mod table;

pub use matcher::{find_route, match_pattern, Params, RouteMatch};
pub use table::{HandlerSpec, MethodHandler, RouteTable, CATCH_ALL};
