//! Capabilities injected into the server at construction.
//!
//! The server never discovers collaborators at runtime: everything it calls
//! (actions, error actions, renderers, middleware, logger) or hands to
//! actions (storage) is registered here up front.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::defaults;
use crate::observability::Logger;
use crate::pipeline::{
    Action, ActionRegistry, ErrorAction, ErrorActionRegistry, Middleware, Renderer,
    RendererRegistry,
};

/// A storage collaborator reachable by name. The server only passes it along.
pub type Storage = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub struct Capabilities {
    /// `None` means a [`crate::observability::TracingLogger`] built from config.
    pub logger: Option<Arc<dyn Logger>>,
    pub actions: ActionRegistry,
    pub error_actions: ErrorActionRegistry,
    pub renderers: RendererRegistry,
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub storage: HashMap<String, Storage>,
}

impl Capabilities {
    /// Built-in actions, the error catalog and the `seonApi` renderer.
    pub fn new() -> Self {
        Self {
            logger: None,
            actions: defaults::actions::actions(),
            error_actions: defaults::errors::error_actions(),
            renderers: defaults::answers::renderers(),
            middleware: Vec::new(),
            storage: HashMap::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.register(name, action);
        self
    }

    pub fn with_error_action(mut self, name: impl Into<String>, action: ErrorAction) -> Self {
        self.error_actions.register(name, action);
        self
    }

    pub fn with_renderer(mut self, name: impl Into<String>, renderer: Renderer) -> Self {
        self.renderers.register(name, renderer);
        self
    }

    /// Append to the middleware chain.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn with_storage<T: Any + Send + Sync>(mut self, name: impl Into<String>, storage: T) -> Self {
        self.storage.insert(name.into(), Arc::new(storage));
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut storage: Vec<_> = self.storage.keys().collect();
        storage.sort();
        f.debug_struct("Capabilities")
            .field("custom_logger", &self.logger.is_some())
            .field("actions", &self.actions)
            .field("error_actions", &self.error_actions)
            .field("renderers", &self.renderers)
            .field("middleware", &self.middleware.len())
            .field("storage", &storage)
            .finish()
    }
}
