//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route patterns and handler specs are well formed
//! - Check the answer table can always fall back
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PistachioConfig → Result<(), Vec<ValidationError>>
//! - Runs on the merged config, before the server is built
//! - Unknown action names are not errors; they resolve to `NotImplemented`

use std::fmt;

use axum::http::HeaderValue;

use crate::config::schema::PistachioConfig;
use crate::defaults::answers::DEFAULT_ANSWER;
use crate::routing::HandlerSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyContentType,
    InvalidContentType(String),
    ZeroBodyLimit,
    RelativePattern(String),
    EmptyActionName(String),
    UppercaseMethod { pattern: String, method: String },
    MissingDefaultAnswer,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyContentType => write!(f, "content_type must not be empty"),
            ValidationError::InvalidContentType(c) => {
                write!(f, "content_type '{}' is not a valid header value", c)
            }
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_size must be > 0"),
            ValidationError::RelativePattern(p) => write!(f, "route '{}' must start with '/'", p),
            ValidationError::EmptyActionName(p) => write!(f, "route '{}' names an empty action", p),
            ValidationError::UppercaseMethod { pattern, method } => {
                write!(f, "route '{}' method key '{}' must be lowercase", pattern, method)
            }
            ValidationError::MissingDefaultAnswer => {
                write!(f, "answers must define a '{}' renderer", DEFAULT_ANSWER)
            }
        }
    }
}

pub fn validate_config(config: &PistachioConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.content_type.trim().is_empty() {
        errors.push(ValidationError::EmptyContentType);
    } else if HeaderValue::from_str(&config.content_type).is_err() {
        errors.push(ValidationError::InvalidContentType(config.content_type.clone()));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for (pattern, spec) in config.routes.iter() {
        if !pattern.starts_with('/') {
            errors.push(ValidationError::RelativePattern(pattern.to_string()));
        }
        if spec.action_names().iter().any(|name| name.trim().is_empty()) {
            errors.push(ValidationError::EmptyActionName(pattern.to_string()));
        }
        if let HandlerSpec::ByMethod(map) = spec {
            for method in map.keys().filter(|m| **m != m.to_lowercase()) {
                errors.push(ValidationError::UppercaseMethod {
                    pattern: pattern.to_string(),
                    method: method.clone(),
                });
            }
        }
    }

    if config.answers.get(DEFAULT_ANSWER).is_none() {
        errors.push(ValidationError::MissingDefaultAnswer);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
