//! Route matching logic.
//!
//! # Responsibilities
//! - Exact lookup of the request path among the table's literal keys
//! - Token-wise pattern matching with `:name` captures
//!
//! # Design Decisions
//! - Literal keys are all checked before any pattern is tried
//! - Token counts must be equal; single-token paths (including `/`) never
//!   match a pattern
//! - Patterns are tried in table order and the last match wins, so tables
//!   should avoid overlapping patterns
//! - No regex, no specificity ranking

use std::collections::HashMap;

use crate::routing::table::RouteTable;

/// Separator between path tokens.
pub const TOKEN_SEPARATOR: char = '/';

/// Prefix marking a named capture in a pattern token.
pub const PARAM_PREFIX: char = ':';

/// Path segments captured by a pattern, keyed by capture name.
pub type Params = HashMap<String, String>;

/// Outcome of a table lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a, T> {
    pub handler: Option<&'a T>,
    pub params: Params,
}

/// Find the value serving `path` in `table`.
pub fn find_route<'a, T>(path: &str, table: &'a RouteTable<T>) -> RouteMatch<'a, T> {
    if let Some(handler) = table.get(path) {
        return RouteMatch {
            handler: Some(handler),
            params: Params::new(),
        };
    }

    let mut found = RouteMatch {
        handler: None,
        params: Params::new(),
    };
    for (pattern, handler) in table.iter() {
        if let Some(params) = match_pattern(path, pattern) {
            found = RouteMatch {
                handler: Some(handler),
                params,
            };
        }
    }
    found
}

/// Compare `path` with a single pattern, returning the captures on success.
pub fn match_pattern(path: &str, pattern: &str) -> Option<Params> {
    let path_tokens = tokens(path);
    let pattern_tokens = tokens(pattern);

    if path_tokens.len() <= 1 || path_tokens.len() != pattern_tokens.len() {
        return None;
    }

    let mut params = Params::new();
    for (path_token, pattern_token) in path_tokens.iter().zip(&pattern_tokens) {
        if path_token == pattern_token {
            continue;
        }
        match pattern_token.strip_prefix(PARAM_PREFIX) {
            Some(name) => {
                params.insert(name.to_string(), (*path_token).to_string());
            }
            None => return None,
        }
    }
    Some(params)
}

// The leading segment is dropped unconditionally, it is empty for absolute paths.
fn tokens(path: &str) -> Vec<&str> {
    path.split(TOKEN_SEPARATOR).skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        RouteTable::new()
            .with("/users/:id", "user")
            .with("/users/me", "me")
            .with("/health", "health")
            .with("/", "root")
    }

    #[test]
    fn test_literal_match_wins_over_patterns() {
        let table = table();
        let found = find_route("/users/me", &table);
        assert_eq!(found.handler, Some(&"me"));
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_named_capture() {
        let table = table();
        let found = find_route("/users/42", &table);
        assert_eq!(found.handler, Some(&"user"));
        assert_eq!(found.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_bare_slash_matches_no_pattern() {
        assert_eq!(match_pattern("/", "/:anything"), None);
        assert_eq!(match_pattern("/health", "/:anything"), None);

        let patterns_only = RouteTable::new().with("/:anything", "catch");
        assert_eq!(find_route("/", &patterns_only).handler, None);
    }

    #[test]
    fn test_literal_root_still_matches() {
        let table = table();
        assert_eq!(find_route("/", &table).handler, Some(&"root"));
    }

    #[test]
    fn test_token_count_must_match() {
        assert_eq!(match_pattern("/users/1/posts", "/users/:id"), None);
        assert_eq!(match_pattern("/users", "/users/:id"), None);
    }

    #[test]
    fn test_last_matching_pattern_wins() {
        let table = RouteTable::new()
            .with("/a/:x", "first")
            .with("/:y/b", "second");
        let found = find_route("/a/b", &table);
        assert_eq!(found.handler, Some(&"second"));
        assert_eq!(found.params.get("y").map(String::as_str), Some("a"));
        assert!(!found.params.contains_key("x"));
    }

    #[test]
    fn test_no_match() {
        let table = table();
        let found = find_route("/missing/route/here", &table);
        assert_eq!(found.handler, None);
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_multiple_captures() {
        let params = match_pattern("/users/7/posts/9", "/users/:user/posts/:post").unwrap();
        assert_eq!(params.get("user").map(String::as_str), Some("7"));
        assert_eq!(params.get("post").map(String::as_str), Some("9"));
    }
}
