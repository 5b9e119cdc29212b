//! graphql-autogen
//!
//! Compiles a pre-scanned description of a domain model into a GraphQL
//! schema. A scanner produces the [`DescriptorSet`]: types, fields, methods
//! and parameters with their intent markers. The [`SchemaCompiler`] resolves
//! them into:
//! - object, interface, union, enum, scalar and input types
//! - Query, Mutation and Subscription root fields from controllers
//! - Relay-style connections for paginated members
//! - data-loader records for batch-loaded relationships
//!
//! ```no_run
//! use graphql_autogen::{CompilerConfig, DescriptorSet, SchemaCompiler};
//!
//! # fn main() -> Result<(), graphql_autogen::GeneratorError> {
//! let descriptors = DescriptorSet::from_json(r#"{"types": []}"#)?;
//! let compiler = SchemaCompiler::new(CompilerConfig::for_packages(["com.example"]))?;
//! let compiled = compiler.compile(&descriptors)?;
//! println!("{}", compiled.to_sdl()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod docs;
pub mod error;
pub mod graphql;
pub mod ir;
pub mod markers;
pub mod naming;
pub mod scalar;
pub mod scanner;
pub mod sdl;

#[cfg(test)]
mod fixtures;

pub use config::CompilerConfig;
pub use descriptor::DescriptorSet;
pub use diagnostics::Diagnostic;
pub use error::GeneratorError;
pub use graphql::{CompiledSchema, SchemaCompiler};
pub use naming::NamingStrategy;
pub use scanner::{JsonScanner, ScanScope, Scanner};
