//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (merge over built-in tables)
//!     → validation.rs (semantic checks)
//!     → PistachioConfig (validated, immutable)
//!     → shared via Arc with every request task
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LimitsConfig, LoggerOptions, ObservabilityConfig, PistachioConfig};
pub use validation::{validate_config, ValidationError};
