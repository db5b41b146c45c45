//! Built-in answer renderers.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::PistachioError;
use crate::pipeline::action::{Renderer, RendererRegistry};

/// Name of the JSON envelope renderer.
pub const SEON_API: &str = "seonApi";

/// Answer-table key used when no pattern matches.
pub const DEFAULT_ANSWER: &str = "default";

#[derive(Serialize)]
struct SeonEnvelope<'a> {
    data: &'a Value,
    errors: &'a [String],
    meta: &'a Value,
}

/// Render `{ data, errors, meta }` as JSON.
pub fn seon_api(data: &Value, errors: &[String], meta: &Value) -> Result<String, PistachioError> {
    Ok(serde_json::to_string(&SeonEnvelope { data, errors, meta })?)
}

/// The renderer used when the answer table names nothing usable.
pub fn fallback() -> Renderer {
    Arc::new(seon_api)
}

pub fn renderers() -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    registry.register(SEON_API, fallback());
    registry
}
