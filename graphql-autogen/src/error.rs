//! Error types for schema generation
//!
//! This module contains the error type shared by every resolver, the schema
//! assembler and the descriptor loaders.

use std::path::PathBuf;

/// Error type for schema generation
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No resolution rule applies to a type descriptor
    #[error("unresolvable type: {0}")]
    UnresolvableType(String),

    /// A scalar failed to parse a literal
    #[error("cannot coerce {literal:?} to scalar {scalar}: {reason}")]
    ScalarCoercion {
        /// Scalar type name
        scalar: String,
        /// The rejected literal
        literal: String,
        /// Why the literal was rejected
        reason: String,
    },

    /// Two distinct descriptors resolve to the same type name
    #[error("type name {name} is claimed by both {existing} and {incoming}")]
    NamingCollision {
        /// The contested GraphQL type name
        name: String,
        /// Identity that registered the name first
        existing: String,
        /// Identity that tried to register it again
        incoming: String,
    },

    /// A union member does not carry the object intent marker
    #[error("union {union} member {member} is not an object type")]
    UnionMemberNotAnnotated {
        /// Union type name
        union: String,
        /// Identity of the rejected member
        member: String,
    },

    /// Invalid configuration, detected before any resolution
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A type identity was re-entered while it was still being resolved
    #[error("cyclic type resolution: {0}")]
    CyclicType(String),

    /// A type was used where GraphQL forbids its kind
    #[error("type {type_name} cannot be used as {position}")]
    IncompatibleType {
        /// GraphQL type name
        type_name: String,
        /// Position the type was used in (e.g. "an output field")
        position: &'static str,
    },

    /// Failed to parse a descriptor or configuration document
    #[error("parse error: {0}")]
    Parse(String),

    /// Failed to read an input file
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Compilation recovered from issues and fail-on-error was requested
    #[error("schema generated with {0} recovered issue(s)")]
    RecoveredIssues(usize),

    /// The assembled schema fails the GraphQL type-system checks
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl From<async_graphql::dynamic::SchemaError> for GeneratorError {
    fn from(e: async_graphql::dynamic::SchemaError) -> Self {
        GeneratorError::InvalidSchema(e.to_string())
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        GeneratorError::Parse(e.to_string())
    }
}
