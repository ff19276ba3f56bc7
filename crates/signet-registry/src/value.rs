//! Configuration value variants accepted from untyped sources.
//!
//! Providers are configured from loosely-typed maps (YAML, environment
//! overrides). `OptionValue` gives those maps a closed set of shapes so
//! option setters can reject mismatched kinds with a useful message
//! instead of panicking on an unexpected type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Untyped configuration map handed to the registry.
///
/// Keys are option names as declared by the provider; values are whatever
/// the configuration source supplied.
pub type ConfigMap = BTreeMap<String, OptionValue>;

/// A single configuration value from an untyped source.
///
/// The untagged representation lets YAML scalars and mappings deserialize
/// directly: `true` becomes `Bool`, `8200` becomes `Integer`, quoted and
/// unquoted strings become `String`, and nested mappings become `Map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Nested map of option values.
    Map(ConfigMap),
}

impl OptionValue {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the nested map, if this is a map.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of this value's kind, for error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}
