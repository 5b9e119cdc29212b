//! Naming conventions
//!
//! Default names for auto-named schema elements. Explicit name overrides on
//! intent markers always bypass these helpers.

use crate::error::GeneratorError;
use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Casing applied to auto-derived type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamingStrategy {
    /// `BookReview`
    #[default]
    PascalCase,
    /// `bookReview`
    CamelCase,
    /// `book_review`
    SnakeCase,
}

impl NamingStrategy {
    /// Apply this strategy to a simple (unqualified) name
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::PascalCase => name.to_upper_camel_case(),
            NamingStrategy::CamelCase => name.to_lower_camel_case(),
            NamingStrategy::SnakeCase => name.to_snake_case(),
        }
    }
}

impl FromStr for NamingStrategy {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept PASCAL_CASE, pascal-case, PascalCase, ...
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pascalcase" | "pascal" => Ok(NamingStrategy::PascalCase),
            "camelcase" | "camel" => Ok(NamingStrategy::CamelCase),
            "snakecase" | "snake" => Ok(NamingStrategy::SnakeCase),
            _ => Err(GeneratorError::Configuration(format!(
                "unknown naming strategy '{}' (expected PASCAL_CASE, CAMEL_CASE or SNAKE_CASE)",
                s
            ))),
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NamingStrategy::PascalCase => "PASCAL_CASE",
            NamingStrategy::CamelCase => "CAMEL_CASE",
            NamingStrategy::SnakeCase => "SNAKE_CASE",
        };
        f.write_str(s)
    }
}

/// Strip the namespace from a fully-qualified name
///
/// Nested-type separators (`$`) are treated like package separators.
pub fn simple_name(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

/// Namespace portion of a fully-qualified name, empty for unqualified names
pub fn package_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => "",
    }
}

/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lowercase the first character
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Getter prefix carried by an accessor name, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetterPrefix {
    /// `getTitle`
    Get,
    /// `isAvailable`
    Is,
}

/// Split an accessor name into its getter prefix and property part
///
/// The character after the prefix must be uppercase, so `getaway` and
/// `island` are not getters.
pub fn getter_parts(method_name: &str) -> Option<(GetterPrefix, &str)> {
    let (prefix, rest) = if let Some(rest) = method_name.strip_prefix("get") {
        (GetterPrefix::Get, rest)
    } else if let Some(rest) = method_name.strip_prefix("is") {
        (GetterPrefix::Is, rest)
    } else {
        return None;
    };

    match rest.chars().next() {
        Some(c) if c.is_uppercase() => Some((prefix, rest)),
        _ => None,
    }
}

/// Property name for an accessor: `getTitle` -> `title`, `isAvailable` -> `available`
///
/// Names that are not getter-shaped are returned unchanged.
pub fn property_name(method_name: &str) -> String {
    match getter_parts(method_name) {
        Some((_, rest)) => decapitalize(rest),
        None => method_name.to_string(),
    }
}
