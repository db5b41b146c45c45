//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Prepared request
//!     → middleware.rs (ordered chain, `next` signal)
//!     → resolver.rs (handler spec + method → ordered actions)
//!     → executor.rs (first payload wins, leftovers detached)
//!     → Return: payload or PistachioError
//! ```
//!
//! # Design Decisions
//! - Actions report a tagged Outcome: Continue, Abort or Done(payload)
//! - Registries are resolved by name once per request, never mutated
//! - Stages run strictly in sequence within one request task

pub mod action;
pub mod executor;
pub mod middleware;
pub mod resolver;

pub use action::{
    action, sync_action, Action, ActionRegistry, ErrorAction, ErrorActionRegistry, ErrorReply,
    Outcome, Renderer, RendererRegistry, Reply,
};
pub use executor::execute;
pub use middleware::{from_fn, run_chain, Middleware, MiddlewareFuture, Next, Rejection};
pub use resolver::{resolve, ResolvedAction};
