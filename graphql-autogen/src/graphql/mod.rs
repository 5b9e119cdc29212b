//! GraphQL schema generation
//!
//! This module turns descriptors into schema definitions.
//! It creates:
//! - Schema types from type declarations (types)
//! - Fields from attributes and accessors (object)
//! - Query/Mutation/Subscription fields from controllers (resolver)
//! - Relay connections for paginated members (connection)
//! - DataLoader records for N+1 prevention (dataloader)
//!
//! [`SchemaCompiler`] drives all of them for one run.

pub mod connection;
pub mod dataloader;
pub mod object;
pub mod resolver;
pub mod schema;
pub mod types;

pub use connection::{PaginationGenerator, PaginationSpec};
pub use dataloader::{DataLoaderGenerator, DataLoaderSpec};
pub use object::FieldResolver;
pub use resolver::{OperationDefinition, OperationKind, OperationResolver};
pub use schema::{CompiledSchema, SchemaCompiler};
pub use types::{ResolvedType, TypeResolver};
