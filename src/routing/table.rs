//! Ordered route tables and handler specs.
//!
//! # Design Decisions
//! - Tables keep insertion order; matching depends on it
//! - Inserting an existing pattern replaces its value in place
//! - Serialized as a plain map so config files read naturally

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Handler-spec key applied regardless of the request method.
pub const CATCH_ALL: &str = "all";

/// Ordered mapping from path pattern to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert a pattern. An existing pattern keeps its position.
    pub fn insert(&mut self, pattern: impl Into<String>, value: T) {
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((pattern, value)),
        }
    }

    /// Builder form of [`RouteTable::insert`].
    pub fn with(mut self, pattern: impl Into<String>, value: T) -> Self {
        self.insert(pattern, value);
        self
    }

    /// Literal lookup, no pattern matching.
    pub fn get(&self, pattern: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lay `overrides` over `self`, like spreading one object over another.
    pub fn merge(mut self, overrides: RouteTable<T>) -> Self {
        for (pattern, value) in overrides.entries {
            self.insert(pattern, value);
        }
        self
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for RouteTable<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut table = RouteTable::new();
        for (pattern, value) in iter {
            table.insert(pattern, value);
        }
        table
    }
}

impl<T: Serialize> Serialize for RouteTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (pattern, value) in &self.entries {
            map.serialize_entry(pattern, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RouteTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for TableVisitor<T> {
            type Value = RouteTable<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path patterns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = RouteTable::new();
                while let Some((pattern, value)) = access.next_entry::<String, T>()? {
                    table.insert(pattern, value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}

/// Action names bound to one method (or to the catch-all).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MethodHandler {
    Single(String),
    List(Vec<String>),
}

impl MethodHandler {
    /// Action names in execution order.
    pub fn names(&self) -> &[String] {
        match self {
            MethodHandler::Single(name) => std::slice::from_ref(name),
            MethodHandler::List(names) => names,
        }
    }
}

/// Which action(s) serve a route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HandlerSpec {
    Single(String),
    List(Vec<String>),
    /// Keyed by lowercase method, with [`CATCH_ALL`] taking precedence.
    ByMethod(BTreeMap<String, MethodHandler>),
}

impl HandlerSpec {
    pub fn single(name: impl Into<String>) -> Self {
        HandlerSpec::Single(name.into())
    }

    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HandlerSpec::List(names.into_iter().map(Into::into).collect())
    }

    /// Spec served for any method.
    pub fn any(handler: MethodHandler) -> Self {
        HandlerSpec::ByMethod(BTreeMap::from([(CATCH_ALL.to_string(), handler)]))
    }

    /// Add a method entry, turning a non-map spec into an empty map first.
    pub fn on(self, method: &str, handler: MethodHandler) -> Self {
        let mut map = match self {
            HandlerSpec::ByMethod(map) => map,
            _ => BTreeMap::new(),
        };
        map.insert(method.to_lowercase(), handler);
        HandlerSpec::ByMethod(map)
    }

    /// Every action name the spec mentions, for validation.
    pub fn action_names(&self) -> Vec<&str> {
        match self {
            HandlerSpec::Single(name) => vec![name.as_str()],
            HandlerSpec::List(names) => names.iter().map(String::as_str).collect(),
            HandlerSpec::ByMethod(map) => map
                .values()
                .flat_map(|h| h.names().iter().map(String::as_str))
                .collect(),
        }
    }
}

impl From<&str> for MethodHandler {
    fn from(name: &str) -> Self {
        MethodHandler::Single(name.to_string())
    }
}

impl From<&str> for HandlerSpec {
    fn from(name: &str) -> Self {
        HandlerSpec::single(name)
    }
}
