//! Scalar tables and literal coercion
//!
//! Contains:
//! - The fixed built-in scalar table (language type name -> GraphQL scalar)
//! - The default custom scalar mappings (date/time/UUID)
//! - Literal parsing for default values, per scalar representation

use crate::error::GeneratorError;
use crate::ir::{ScalarType, TypeDefinition, Value};
use crate::naming;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// The five GraphQL built-in scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltinScalar {
    /// `String`
    String,
    /// `Int`
    Int,
    /// `Float`
    Float,
    /// `Boolean`
    Boolean,
    /// `ID`
    Id,
}

impl BuiltinScalar {
    /// All built-in scalars
    pub const ALL: [BuiltinScalar; 5] = [
        BuiltinScalar::String,
        BuiltinScalar::Int,
        BuiltinScalar::Float,
        BuiltinScalar::Boolean,
        BuiltinScalar::Id,
    ];

    /// GraphQL name
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinScalar::String => "String",
            BuiltinScalar::Int => "Int",
            BuiltinScalar::Float => "Float",
            BuiltinScalar::Boolean => "Boolean",
            BuiltinScalar::Id => "ID",
        }
    }

    /// Parse a GraphQL scalar name
    pub fn from_name(name: &str) -> Option<Self> {
        BuiltinScalar::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Value representation of the scalar
    pub fn representation(&self) -> Representation {
        match self {
            BuiltinScalar::String | BuiltinScalar::Id => Representation::Text,
            BuiltinScalar::Int => Representation::Integer,
            BuiltinScalar::Float => Representation::Float,
            BuiltinScalar::Boolean => Representation::Boolean,
        }
    }

    /// Scalar type definition
    pub fn definition(&self) -> ScalarType {
        ScalarType {
            name: self.name().to_string(),
            description: None,
            representation: self.representation(),
            builtin: Some(*self),
        }
    }
}

/// Underlying representation a scalar parses literals into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Representation {
    /// Arbitrary text
    Text,
    /// 32-bit signed integer
    Integer,
    /// Double-precision float
    Float,
    /// Boolean
    Boolean,
    /// Decimal number kept as text
    Decimal,
    /// ISO-8601 date-time
    DateTime,
    /// ISO-8601 date
    Date,
    /// ISO-8601 time
    Time,
    /// RFC 4122 UUID
    Uuid,
}

impl Representation {
    /// Guess the representation from a language type identity
    pub fn infer(identity: &str) -> Self {
        match naming::simple_name(identity) {
            "LocalDateTime" | "OffsetDateTime" | "ZonedDateTime" | "Instant" | "DateTime"
            | "NaiveDateTime" => Representation::DateTime,
            "LocalDate" | "Date" | "NaiveDate" => Representation::Date,
            "LocalTime" | "Time" | "NaiveTime" => Representation::Time,
            "UUID" | "Uuid" => Representation::Uuid,
            "BigDecimal" | "Decimal" => Representation::Decimal,
            _ => Representation::Text,
        }
    }
}

/// Fully-qualified library types and language primitives
static QUALIFIED_SCALARS: Lazy<HashMap<&'static str, BuiltinScalar>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for name in [
        "java.lang.String",
        "java.lang.Character",
        "java.lang.CharSequence",
        "char",
        "str",
        "string",
    ] {
        table.insert(name, BuiltinScalar::String);
    }
    for name in [
        "java.lang.Integer", "java.lang.Long", "java.lang.Short", "java.lang.Byte", "int", "long",
        "short", "byte", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64",
    ] {
        table.insert(name, BuiltinScalar::Int);
    }
    for name in ["java.lang.Float", "java.lang.Double", "java.math.BigDecimal", "float", "double", "f32", "f64"] {
        table.insert(name, BuiltinScalar::Float);
    }
    for name in ["java.lang.Boolean", "boolean", "bool"] {
        table.insert(name, BuiltinScalar::Boolean);
    }
    table.insert("java.math.BigInteger", BuiltinScalar::Id);
    table
});

/// Unqualified spellings of the same types
static SIMPLE_SCALARS: Lazy<HashMap<&'static str, BuiltinScalar>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for name in ["String", "Character", "CharSequence"] {
        table.insert(name, BuiltinScalar::String);
    }
    for name in ["Integer", "Long", "Short", "Byte", "Int"] {
        table.insert(name, BuiltinScalar::Int);
    }
    for name in ["Float", "Double", "BigDecimal"] {
        table.insert(name, BuiltinScalar::Float);
    }
    table.insert("Boolean", BuiltinScalar::Boolean);
    for name in ["BigInteger", "ID"] {
        table.insert(name, BuiltinScalar::Id);
    }
    table
});

/// Built-in scalar for a fully-qualified library type or a primitive
pub fn builtin_for(identity: &str) -> Option<BuiltinScalar> {
    QUALIFIED_SCALARS.get(identity).copied()
}

/// Built-in scalar for the simple name of a type identity
///
/// Only meaningful for identities that are not scanned declarations.
pub fn builtin_for_simple_name(identity: &str) -> Option<BuiltinScalar> {
    SIMPLE_SCALARS.get(naming::simple_name(identity)).copied()
}

/// Custom scalar mappings every resolver starts with
pub fn default_mappings() -> Vec<(&'static str, &'static str)> {
    vec![
        ("java.time.LocalDateTime", "DateTime"),
        ("java.time.LocalDate", "Date"),
        ("java.time.LocalTime", "Time"),
        ("java.util.UUID", "ID"),
    ]
}

/// Description attached to generated custom scalars
pub fn custom_scalar_description(identity: &str) -> String {
    format!("Custom scalar type for {}", naming::simple_name(identity))
}

impl ScalarType {
    /// Parse an input literal into a value of this scalar
    pub fn parse_literal(&self, literal: &str) -> Result<Value, GeneratorError> {
        let reject = |reason: String| GeneratorError::ScalarCoercion {
            scalar: self.name.clone(),
            literal: literal.to_string(),
            reason,
        };
        let trimmed = literal.trim();

        match self.representation {
            Representation::Text => Ok(Value::String(literal.to_string())),
            Representation::Integer => trimmed
                .parse::<i32>()
                .map(|i| Value::Int(i64::from(i)))
                .map_err(|e| reject(e.to_string())),
            Representation::Float => match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                Ok(_) => Err(reject("not a finite number".to_string())),
                Err(e) => Err(reject(e.to_string())),
            },
            Representation::Boolean => match trimmed {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(reject("expected true or false".to_string())),
            },
            Representation::Decimal => match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::String(trimmed.to_string())),
                Ok(_) => Err(reject("not a finite number".to_string())),
                Err(e) => Err(reject(e.to_string())),
            },
            Representation::DateTime => DateTime::parse_from_rfc3339(trimmed)
                .map(|dt| Value::String(dt.to_rfc3339()))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
                })
                .map_err(|e| reject(e.to_string())),
            Representation::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|d| Value::String(d.to_string()))
                .map_err(|e| reject(e.to_string())),
            Representation::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
                .map(|t| Value::String(t.to_string()))
                .map_err(|e| reject(e.to_string())),
            Representation::Uuid => uuid::Uuid::parse_str(trimmed)
                .map(|u| Value::String(u.hyphenated().to_string()))
                .map_err(|e| reject(e.to_string())),
        }
    }

    /// Output form of a value: custom scalars stringify
    pub fn serialize(&self, value: &Value) -> String {
        match value {
            Value::String(s) | Value::Enum(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Parse a default-value literal against a definition
///
/// Lists accept either `[a, b]` or a single element; enums accept one of
/// their declared values.
pub fn parse_default(
    definition: &TypeDefinition,
    list_depth: usize,
    literal: &str,
) -> Result<Value, GeneratorError> {
    if list_depth > 0 {
        let trimmed = literal.trim();
        return match trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) if inner.trim().is_empty() => Ok(Value::List(Vec::new())),
            Some(inner) => inner
                .split(',')
                .map(|item| parse_default(definition, list_depth - 1, unquote(item.trim())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            None => Ok(Value::List(vec![parse_default(
                definition,
                list_depth - 1,
                literal,
            )?])),
        };
    }

    match definition {
        TypeDefinition::Scalar(scalar) => scalar.parse_literal(literal),
        TypeDefinition::Enum(e) => {
            let trimmed = literal.trim();
            if e.values.iter().any(|v| v.name == trimmed) {
                Ok(Value::Enum(trimmed.to_string()))
            } else {
                Err(GeneratorError::ScalarCoercion {
                    scalar: e.name.clone(),
                    literal: literal.to_string(),
                    reason: "not a declared enum value".to_string(),
                })
            }
        }
        other => Err(GeneratorError::ScalarCoercion {
            scalar: other.name().to_string(),
            literal: literal.to_string(),
            reason: "default values are only parsed for scalars and enums".to_string(),
        }),
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
