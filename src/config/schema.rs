//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::routing::{HandlerSpec, RouteTable};

/// Root configuration for the server.
///
/// Tables hold caller overrides; [`PistachioConfig::with_defaults`] lays them
/// over the built-in tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PistachioConfig {
    /// Port to listen on.
    pub port: u16,

    /// Default `Content-Type` of every response.
    pub content_type: String,

    /// Path pattern → handler spec.
    pub routes: RouteTable<HandlerSpec>,

    /// Error identifier → error action name.
    pub errors: BTreeMap<String, String>,

    /// Path pattern → answer renderer name, with a `default` entry.
    pub answers: RouteTable<String>,

    /// Options handed to the default logger.
    pub logger: LoggerOptions,

    /// Name of the storage collaborator attached to requests.
    pub db_name: Option<String>,

    pub limits: LimitsConfig,

    pub observability: ObservabilityConfig,
}

impl Default for PistachioConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            content_type: "application/json".to_string(),
            routes: RouteTable::new(),
            errors: BTreeMap::new(),
            answers: RouteTable::new(),
            logger: LoggerOptions::default(),
            db_name: None,
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl PistachioConfig {
    /// Merge the configured tables over the built-in ones.
    pub fn with_defaults(mut self) -> Self {
        self.routes = defaults::routes().merge(self.routes);
        self.answers = defaults::answers().merge(self.answers);

        let mut errors: BTreeMap<String, String> = defaults::errors::error_routes().collect();
        errors.extend(self.errors);
        self.errors = errors;
        self
    }
}

/// Options for the default logger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Value of the `logger` field on every event.
    pub name: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            name: "Pistachio".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
