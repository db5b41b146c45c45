//! Built-in service actions.

use serde_json::json;

use crate::pipeline::action::{sync_action, ActionRegistry, Outcome, Reply};
use crate::http::response::DEFAULT_SUCCESS_CODE;

pub const ALL_HEALTH: &str = "allHealth";
pub const ALL_INFO: &str = "allInfo";
pub const ALL_MAP: &str = "allMap";

fn message(text: &'static str) -> Outcome {
    Reply::new(json!([{ "message": text }]))
        .code(DEFAULT_SUCCESS_CODE)
        .into()
}

pub fn actions() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(ALL_HEALTH, sync_action(|_, _| Ok(message("HEALTH"))));
    registry.register(ALL_INFO, sync_action(|_, _| Ok(message("INFO"))));
    registry.register(ALL_MAP, sync_action(|_, _| Ok(message("MAP"))));
    registry
}
