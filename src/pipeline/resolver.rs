//! Handler spec → ordered action list.
//!
//! # Design Decisions
//! - An unknown action name stays in the list as an unresolved entry, so a
//!   route naming a missing action fails with `NotImplemented` when reached
//! - A `ByMethod` catch-all shadows every method-specific entry
//! - No matching method entry yields an empty list

use std::fmt;

use axum::http::Method;

use crate::pipeline::action::{Action, ActionRegistry};
use crate::routing::{HandlerSpec, MethodHandler, CATCH_ALL};

/// One step of a resolved chain.
#[derive(Clone)]
pub struct ResolvedAction {
    pub name: String,
    /// `None` when the registry has no such action.
    pub action: Option<Action>,
}

impl ResolvedAction {
    pub fn is_resolved(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Resolve the actions serving `method` under `spec`.
pub fn resolve(
    spec: Option<&HandlerSpec>,
    method: &Method,
    registry: &ActionRegistry,
) -> Vec<ResolvedAction> {
    let names: &[String] = match spec {
        Some(HandlerSpec::Single(name)) => std::slice::from_ref(name),
        Some(HandlerSpec::List(names)) => names,
        Some(HandlerSpec::ByMethod(map)) => {
            let method = method.as_str().to_lowercase();
            match map.get(CATCH_ALL).or_else(|| map.get(&method)) {
                Some(handler) => MethodHandler::names(handler),
                None => &[],
            }
        }
        None => &[],
    };

    names
        .iter()
        .map(|name| ResolvedAction {
            name: name.clone(),
            action: registry.get(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::action::{sync_action, Outcome};

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        for name in ["list", "create", "auth", "any"] {
            registry.register(name, sync_action(|_, _| Ok(Outcome::Continue)));
        }
        registry
    }

    fn names(resolved: &[ResolvedAction]) -> Vec<(&str, bool)> {
        resolved
            .iter()
            .map(|r| (r.name.as_str(), r.is_resolved()))
            .collect()
    }

    #[test]
    fn test_single() {
        let spec = HandlerSpec::single("list");
        let resolved = resolve(Some(&spec), &Method::GET, &registry());
        assert_eq!(names(&resolved), vec![("list", true)]);
    }

    #[test]
    fn test_unknown_single_is_unresolved_not_empty() {
        let spec = HandlerSpec::single("missing");
        let resolved = resolve(Some(&spec), &Method::GET, &registry());
        assert_eq!(names(&resolved), vec![("missing", false)]);
    }

    #[test]
    fn test_list_resolves_each_element() {
        let spec = HandlerSpec::list(["auth", "missing", "create"]);
        let resolved = resolve(Some(&spec), &Method::POST, &registry());
        assert_eq!(
            names(&resolved),
            vec![("auth", true), ("missing", false), ("create", true)]
        );
    }

    #[test]
    fn test_by_method_lowercases() {
        let spec = HandlerSpec::single("")
            .on("get", "list".into())
            .on("post", MethodHandler::List(vec!["auth".into(), "create".into()]));
        let registry = registry();

        assert_eq!(
            names(&resolve(Some(&spec), &Method::GET, &registry)),
            vec![("list", true)]
        );
        assert_eq!(
            names(&resolve(Some(&spec), &Method::POST, &registry)),
            vec![("auth", true), ("create", true)]
        );
    }

    #[test]
    fn test_catch_all_shadows_methods() {
        let spec = HandlerSpec::single("")
            .on("get", "list".into())
            .on(CATCH_ALL, "any".into());
        let resolved = resolve(Some(&spec), &Method::GET, &registry());
        assert_eq!(names(&resolved), vec![("any", true)]);
    }

    #[test]
    fn test_missing_method_is_empty() {
        let spec = HandlerSpec::single("").on("get", "list".into());
        assert!(resolve(Some(&spec), &Method::DELETE, &registry()).is_empty());
    }

    #[test]
    fn test_no_spec_is_empty() {
        assert!(resolve(None, &Method::GET, &registry()).is_empty());
    }
}
