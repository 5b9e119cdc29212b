//! Schema assembly
//!
//! Runs every resolver over one descriptor set and merges their output into
//! a single [`Schema`]:
//! - root types: every in-scope declaration with a type intent marker
//! - operations: the marked methods of in-scope controllers
//! - fields: attached to each object, interface and input type the type
//!   resolver created, including types only reached through other fields
//! - pagination wrappers and data-loader records for marked members
//!
//! Failures resolving a root type, a naming collision, or an assembled
//! schema that fails GraphQL validation abort the compilation. Everything
//! else is recorded as a diagnostic.

use super::connection::{PaginationGenerator, PaginationSpec};
use super::dataloader::{DataLoaderGenerator, DataLoaderSpec};
use super::object::{self, FieldResolver};
use super::resolver::{AUTH_DIRECTIVE, OperationKind, OperationResolver, auth_directive_definition};
use super::types::{ResolvedDefinition, TypeResolver};
use crate::config::CompilerConfig;
use crate::descriptor::{DescriptorSet, TypeDescriptor};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::GeneratorError;
use crate::ir::{FieldDefinition, ObjectType, Schema, TypeDefinition, TypeRef};
use crate::scalar::BuiltinScalar;
use crate::scanner::ScanScope;
use crate::sdl;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Field synthesized on an otherwise empty Query root
pub const PLACEHOLDER_FIELD: &str = "_empty";

/// Output of one compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSchema {
    /// The schema graph
    pub schema: Schema,
    /// Pagination applied to fields and operations
    pub pagination: Vec<PaginationSpec>,
    /// Batch-loading records
    pub data_loaders: Vec<DataLoaderSpec>,
    /// Issues recovered during compilation
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledSchema {
    /// Render the schema as SDL
    pub fn to_sdl(&self) -> Result<String, GeneratorError> {
        sdl::print_schema(&self.schema)
    }

    /// Apply the fail-on-error policy
    pub fn check(&self, fail_on_error: bool) -> Result<(), GeneratorError> {
        if fail_on_error && !self.diagnostics.is_empty() {
            return Err(GeneratorError::RecoveredIssues(self.diagnostics.len()));
        }
        Ok(())
    }

    /// Combine two independently compiled shards
    ///
    /// Identical definitions are shared; a name defined differently by the
    /// two shards is a naming collision. The merged schema is validated.
    pub fn merge(self, other: CompiledSchema) -> Result<CompiledSchema, GeneratorError> {
        let mut types = self.schema.types;
        for (name, definition) in other.schema.types {
            match types.get(&name) {
                Some(existing) if *existing == definition => {}
                Some(_) => {
                    return Err(GeneratorError::NamingCollision {
                        name,
                        existing: "first shard".to_string(),
                        incoming: "second shard".to_string(),
                    });
                }
                None => {
                    types.insert(name, definition);
                }
            }
        }

        let mut directives = self.schema.directives;
        for directive in other.schema.directives {
            if directives.iter().all(|d| d.name != directive.name) {
                directives.push(directive);
            }
        }

        let query = merge_root("Query", Some(self.schema.query), Some(other.schema.query))?;
        let mutation = merge_root("Mutation", self.schema.mutation, other.schema.mutation)?;
        let subscription = merge_root("Subscription", self.schema.subscription, other.schema.subscription)?;

        let mut pagination = self.pagination;
        pagination.extend(other.pagination);
        let mut data_loaders = self.data_loaders;
        data_loaders.extend(other.data_loaders);
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(other.diagnostics);

        let schema = Schema {
            query: query_root(query.map(|q| q.fields).unwrap_or_default()),
            mutation,
            subscription,
            directives,
            types,
        };
        sdl::build_schema(&schema)?;

        Ok(CompiledSchema {
            schema,
            pagination,
            data_loaders,
            diagnostics,
        })
    }
}

/// Compiles descriptor sets into schemas
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    config: CompilerConfig,
}

impl SchemaCompiler {
    /// Create a compiler, rejecting invalid configurations up front
    pub fn new(config: CompilerConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The compiler configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a descriptor set
    ///
    /// Fails when a root type cannot be resolved, when two types claim one
    /// name, or when the assembled schema is not a valid GraphQL schema.
    pub fn compile(&self, descriptors: &DescriptorSet) -> Result<CompiledSchema, GeneratorError> {
        info!(declarations = descriptors.len(), "compiling schema");

        let diagnostics = Diagnostics::new();
        let (schema, pagination, data_loaders) = {
            let types = TypeResolver::new(descriptors, &diagnostics, self.config.naming_strategy)
                .with_docs(self.config.include_docs);
            let mut assembler = Assembler::new(&self.config, descriptors, &types);
            let schema = assembler.assemble()?;
            (schema, assembler.pagination, assembler.data_loaders)
        };
        sdl::build_schema(&schema)?;

        let compiled = CompiledSchema {
            schema,
            pagination,
            data_loaders,
            diagnostics: diagnostics.into_vec(),
        };
        info!(
            types = compiled.schema.types.len(),
            queries = compiled.schema.query.fields.len(),
            diagnostics = compiled.diagnostics.len(),
            "compiled schema"
        );
        Ok(compiled)
    }
}

/// Per-run assembly state
struct Assembler<'a> {
    config: &'a CompilerConfig,
    descriptors: &'a DescriptorSet,
    types: &'a TypeResolver<'a>,
    fields: FieldResolver<'a>,
    operations: OperationResolver<'a>,
    paginator: PaginationGenerator<'a>,
    loaders: DataLoaderGenerator<'a>,
    pagination: Vec<PaginationSpec>,
    data_loaders: Vec<DataLoaderSpec>,
}

impl<'a> Assembler<'a> {
    fn new(config: &'a CompilerConfig, descriptors: &'a DescriptorSet, types: &'a TypeResolver<'a>) -> Self {
        Self {
            config,
            descriptors,
            types,
            fields: FieldResolver::new(types, config.include_inherited_fields),
            operations: OperationResolver::new(types),
            paginator: PaginationGenerator::new(types),
            loaders: DataLoaderGenerator::new(types),
            pagination: Vec::new(),
            data_loaders: Vec::new(),
        }
    }

    fn assemble(&mut self) -> Result<Schema, GeneratorError> {
        for (identity, scalar_name) in &self.config.type_mappings {
            self.types.register_mapping(identity.clone(), scalar_name.clone());
        }

        let scope = ScanScope::from_config(self.config);
        let descriptors = self.descriptors;
        let in_scope: Vec<&TypeDescriptor> = descriptors.iter().filter(|d| scope.includes(&d.name)).collect();

        // Root types are fatal when they fail
        for descriptor in &in_scope {
            if self.is_root_type(descriptor) {
                self.types.resolve_descriptor(descriptor)?;
            }
        }

        let mut roots = RootFields::default();
        for controller in in_scope.iter().filter(|d| d.markers.controller().is_some()) {
            self.collect_operations(controller, &mut roots);
        }

        let mut types = self.complete_types();
        self.merge_pagination_types(&mut types)?;

        let query = query_root(roots.query);
        let mutation = non_empty_root(OperationKind::Mutation, roots.mutation);
        let subscription = non_empty_root(OperationKind::Subscription, roots.subscription);

        for root in std::iter::once(&query).chain(mutation.as_ref()).chain(subscription.as_ref()) {
            if types.contains_key(&root.name) {
                return Err(GeneratorError::NamingCollision {
                    name: root.name.clone(),
                    existing: "root operation type".to_string(),
                    incoming: self.owner_of(&root.name),
                });
            }
        }

        let mut schema = Schema {
            query,
            mutation,
            subscription,
            directives: Vec::new(),
            types,
        };
        if uses_directive(&schema, AUTH_DIRECTIVE) {
            schema.directives.push(auth_directive_definition());
        }

        for (location, missing) in schema.dangling_references() {
            self.types
                .diagnostics()
                .warn(location, format!("references undefined type {}", missing));
        }
        Ok(schema)
    }

    fn is_root_type(&self, descriptor: &TypeDescriptor) -> bool {
        let markers = &descriptor.markers;
        markers.object().is_some()
            || markers.interface().is_some()
            || markers.union().is_some()
            || markers.enumeration().is_some()
            || markers.scalar().is_some()
            || (self.config.generate_inputs && markers.input().is_some())
    }

    fn collect_operations(&mut self, controller: &TypeDescriptor, roots: &mut RootFields) {
        let kinds = [OperationKind::Query, OperationKind::Mutation, OperationKind::Subscription];
        for method in &controller.methods {
            for kind in kinds {
                let resolved = match kind {
                    OperationKind::Query => self.operations.resolve_query(controller, method),
                    OperationKind::Mutation => self.operations.resolve_mutation(controller, method),
                    OperationKind::Subscription => self.operations.resolve_subscription(controller, method),
                };
                let Some(operation) = resolved else {
                    continue;
                };

                let mut field = operation.field;
                if self.config.generate_pagination {
                    if let Some(spec) = self.paginator.generate_for_method(controller, method) {
                        field = self.paginator.generate_paginated_field(&spec, &field);
                        self.pagination.push(spec);
                    }
                }
                roots.add(kind, field, &format!("{}.{}", controller.name, method.name), self.types);
            }
        }
    }

    /// Attach fields to every created type until no new types appear
    fn complete_types(&mut self) -> IndexMap<String, TypeDefinition> {
        let mut completed = IndexMap::new();
        let mut next = 0;
        while next < self.types.definition_count() {
            let batch = self.types.definitions();
            for resolved in &batch[next..] {
                let definition = self.complete(resolved);
                completed.insert(definition.name().to_string(), definition);
            }
            debug!(completed = batch.len() - next, "completed type batch");
            next = batch.len();
        }
        completed
    }

    fn complete(&mut self, resolved: &ResolvedDefinition) -> TypeDefinition {
        let descriptors = self.descriptors;
        let descriptor = resolved.descriptor.as_deref().and_then(|identity| descriptors.get(identity));
        let Some(descriptor) = descriptor else {
            return resolved.definition.as_ref().clone();
        };

        match resolved.definition.as_ref() {
            TypeDefinition::Object(object) => {
                let mut object = object.clone();
                object.fields = self.output_fields(descriptor);
                if self.config.generate_data_loaders {
                    let loaders = self.loaders.generate_data_loaders(descriptor);
                    self.data_loaders.extend(loaders);
                }
                TypeDefinition::Object(object)
            }
            TypeDefinition::Interface(interface) => {
                let mut interface = interface.clone();
                interface.fields = self.output_fields(descriptor);
                TypeDefinition::Interface(interface)
            }
            TypeDefinition::InputObject(input) => {
                let mut input = input.clone();
                input.fields = self.fields.resolve_input_fields(descriptor);
                TypeDefinition::InputObject(input)
            }
            other => other.clone(),
        }
    }

    /// Resolved fields with pagination applied to paginated members
    fn output_fields(&mut self, descriptor: &TypeDescriptor) -> Vec<FieldDefinition> {
        let mut fields = self.fields.resolve_fields(descriptor);
        if !self.config.generate_pagination {
            return fields;
        }

        // Same declarations the field resolver reads, so interface members
        // paginate identically on every implementation
        let mut paginated = HashSet::new();
        for declaring in self.fields.declarations(descriptor) {
            for member in declaring.members() {
                if !self.paginator.should_generate_pagination(member) {
                    continue;
                }
                let name = object::field_name(member);
                if paginated.contains(&name) {
                    continue;
                }
                let Some(position) = fields.iter().position(|f| f.name == name) else {
                    continue;
                };
                if let Some(spec) = self.paginator.generate_for_member(declaring, member) {
                    fields[position] = self.paginator.generate_paginated_field(&spec, &fields[position]);
                    self.pagination.push(spec);
                    paginated.insert(name);
                }
            }
        }
        fields
    }

    fn merge_pagination_types(&self, types: &mut IndexMap<String, TypeDefinition>) -> Result<(), GeneratorError> {
        for generated in self.paginator.generated_types() {
            let name = generated.name().to_string();
            match types.get(&name) {
                Some(existing) if *existing == generated => {}
                Some(_) => {
                    return Err(GeneratorError::NamingCollision {
                        existing: self.owner_of(&name),
                        incoming: "generated pagination type".to_string(),
                        name,
                    });
                }
                None => {
                    types.insert(name, generated);
                }
            }
        }
        Ok(())
    }

    /// Identity of the declaration that produced a type name
    fn owner_of(&self, name: &str) -> String {
        self.types
            .definitions()
            .into_iter()
            .find(|r| r.definition.name() == name)
            .and_then(|r| r.descriptor)
            .unwrap_or_else(|| name.to_string())
    }
}

/// Root fields collected so far, first name wins
#[derive(Default)]
struct RootFields {
    query: Vec<FieldDefinition>,
    mutation: Vec<FieldDefinition>,
    subscription: Vec<FieldDefinition>,
}

impl RootFields {
    fn add(&mut self, kind: OperationKind, field: FieldDefinition, location: &str, types: &TypeResolver<'_>) {
        let fields = match kind {
            OperationKind::Query => &mut self.query,
            OperationKind::Mutation => &mut self.mutation,
            OperationKind::Subscription => &mut self.subscription,
        };
        if fields.iter().any(|f| f.name == field.name) {
            types.diagnostics().warn(
                location,
                format!("duplicate {} field {}; keeping the first definition", kind, field.name),
            );
            return;
        }
        fields.push(field);
    }
}

/// The Query root, with a placeholder field when there are no queries
fn query_root(fields: Vec<FieldDefinition>) -> ObjectType {
    let mut query = ObjectType::new(OperationKind::Query.root_name());
    query.fields = fields;
    if query.fields.is_empty() {
        query.fields.push(
            FieldDefinition::new(PLACEHOLDER_FIELD, TypeRef::named(BuiltinScalar::String.name()))
                .with_description("Placeholder field: no queries are defined"),
        );
    }
    query
}

fn non_empty_root(kind: OperationKind, fields: Vec<FieldDefinition>) -> Option<ObjectType> {
    if fields.is_empty() {
        return None;
    }
    let mut root = ObjectType::new(kind.root_name());
    root.fields = fields;
    Some(root)
}

fn merge_root(
    name: &str,
    left: Option<ObjectType>,
    right: Option<ObjectType>,
) -> Result<Option<ObjectType>, GeneratorError> {
    let mut fields: Vec<FieldDefinition> = Vec::new();
    let incoming = left.into_iter().chain(right).flat_map(|root| root.fields);
    for field in incoming.filter(|f| f.name != PLACEHOLDER_FIELD) {
        match fields.iter().find(|f| f.name == field.name) {
            Some(existing) if *existing == field => {}
            Some(_) => {
                return Err(GeneratorError::NamingCollision {
                    name: format!("{}.{}", name, field.name),
                    existing: "first shard".to_string(),
                    incoming: "second shard".to_string(),
                });
            }
            None => fields.push(field),
        }
    }

    if fields.is_empty() {
        return Ok(None);
    }
    let mut root = ObjectType::new(name);
    root.fields = fields;
    Ok(Some(root))
}

fn uses_directive(schema: &Schema, directive: &str) -> bool {
    let object_fields = schema.types.values().flat_map(|t| match t {
        TypeDefinition::Object(o) => o.fields.as_slice(),
        TypeDefinition::Interface(i) => i.fields.as_slice(),
        _ => &[],
    });
    schema
        .roots()
        .flat_map(|root| root.fields.iter())
        .chain(object_fields)
        .any(|field| field.directives.iter().any(|d| d.name == directive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, MethodDescriptor, TypeKind, TypeSignature};
    use crate::fixtures;
    use crate::markers::{ControllerMarker, Marker, PaginationMarker, TypeMarker};

    fn compile_library(config: CompilerConfig) -> CompiledSchema {
        SchemaCompiler::new(config)
            .unwrap()
            .compile(&fixtures::library())
            .unwrap()
    }

    fn library_config() -> CompilerConfig {
        CompilerConfig::for_packages(["com.example.library"])
    }

    fn object<'s>(compiled: &'s CompiledSchema, name: &str) -> &'s ObjectType {
        match compiled.schema.get(name) {
            Some(TypeDefinition::Object(o)) => o,
            other => panic!("expected object {}, got {:?}", name, other),
        }
    }

    fn names(fields: &[FieldDefinition]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = SchemaCompiler::new(CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_library_roots() {
        let compiled = compile_library(library_config());
        let schema = &compiled.schema;

        assert_eq!(names(&schema.query.fields), vec!["books", "book", "search", "authorList", "author"]);
        assert_eq!(names(&schema.mutation.as_ref().unwrap().fields), vec!["createBook", "deleteBook"]);
        assert_eq!(names(&schema.subscription.as_ref().unwrap().fields), vec!["bookAdded"]);

        // The paginated query returns a connection
        assert_eq!(schema.query.field("books").unwrap().ty.to_string(), "BookConnection");
        assert_eq!(schema.directives.len(), 1);
    }

    #[test]
    fn test_library_types() {
        let compiled = compile_library(library_config());
        let schema = &compiled.schema;

        for name in [
            "Book", "Author", "Node", "Auditable", "BookStatus", "SearchResult", "BookFilterInput",
            "CreateBookInput", "Date", "DateTime", "PageInfo", "BookConnection", "BookEdge",
        ] {
            assert!(schema.get(name).is_some(), "missing type {}", name);
        }
        assert!(schema.get("Review").is_none());
        assert!(schema.get("Isbn").is_none());

        let book = object(&compiled, "Book");
        assert_eq!(book.interfaces, vec!["Node", "Auditable"]);
        assert!(book.field("createdAt").is_some());

        let author = object(&compiled, "Author");
        let books = author.field("books").unwrap();
        assert_eq!(books.ty.to_string(), "BookConnection");
        assert_eq!(books.arguments.len(), 4);

        // Recovered: the unmarked union member and the bad date default
        assert_eq!(compiled.diagnostics.len(), 2);
        assert_eq!(compiled.pagination.len(), 2);
        assert_eq!(compiled.data_loaders.len(), 2);
    }

    #[test]
    fn test_pagination_disabled() {
        let mut config = library_config();
        config.generate_pagination = false;
        config.generate_data_loaders = false;
        let compiled = compile_library(config);

        assert!(compiled.schema.get("PageInfo").is_none());
        assert_eq!(object(&compiled, "Author").field("books").unwrap().ty.to_string(), "[Book]");
        assert!(compiled.pagination.is_empty());
        assert!(compiled.data_loaders.is_empty());
    }

    fn books() -> TypeSignature {
        TypeSignature::list_of(TypeSignature::class(fixtures::BOOK))
    }

    fn paginated() -> Marker {
        Marker::Pagination(PaginationMarker::default())
    }

    fn compile_with(extra: Vec<TypeDescriptor>) -> CompiledSchema {
        let mut set = fixtures::library();
        for descriptor in extra {
            set.insert(descriptor);
        }
        SchemaCompiler::new(library_config()).unwrap().compile(&set).unwrap()
    }

    #[test]
    fn test_interface_pagination_reaches_implementations() {
        let shelf = TypeDescriptor::new("com.example.library.model.Shelf", TypeKind::Interface)
            .with_marker(Marker::Interface(TypeMarker::default()))
            .with_method(MethodDescriptor::new("getBooks", books()).with_marker(paginated()));
        let room = TypeDescriptor::new("com.example.library.model.Room", TypeKind::Class)
            .with_marker(Marker::Object(TypeMarker::default()))
            .with_interface("com.example.library.model.Shelf");
        let compiled = compile_with(vec![shelf, room]);

        let Some(TypeDefinition::Interface(shelf)) = compiled.schema.get("Shelf") else {
            panic!("Shelf is not an interface");
        };
        assert_eq!(shelf.fields[0].ty.to_string(), "BookConnection");
        let room = object(&compiled, "Room");
        assert_eq!(room.interfaces, vec!["Shelf"]);
        assert_eq!(room.field("books").unwrap().ty.to_string(), "BookConnection");
        assert_eq!(room.field("books").unwrap().arguments, shelf.fields[0].arguments);
    }

    #[test]
    fn test_field_paginated_once() {
        let room = TypeDescriptor::new("com.example.library.model.Room", TypeKind::Class)
            .with_marker(Marker::Object(TypeMarker::default()))
            .with_field(FieldDescriptor::new("books", books()).with_marker(paginated()))
            .with_method(MethodDescriptor::new("getBooks", books()).with_marker(paginated()));
        let compiled = compile_with(vec![room]);

        let room_specs = compiled
            .pagination
            .iter()
            .filter(|spec| spec.owner == "com.example.library.model.Room")
            .count();
        assert_eq!(room_specs, 1);
        assert_eq!(object(&compiled, "Room").field("books").unwrap().ty.to_string(), "BookConnection");
    }

    #[test]
    fn test_inputs_only_when_reached() {
        let mut config = library_config();
        config.generate_inputs = false;
        let compiled = compile_library(config);

        assert!(compiled.schema.get("BookFilterInput").is_none());
        // Still reached through the createBook argument
        assert!(compiled.schema.get("CreateBookInput").is_some());
    }

    #[test]
    fn test_empty_query_gets_placeholder() {
        let set = DescriptorSet::new(vec![fixtures::book_status()]);
        let compiled = SchemaCompiler::new(library_config()).unwrap().compile(&set).unwrap();

        assert_eq!(names(&compiled.schema.query.fields), vec![PLACEHOLDER_FIELD]);
        assert!(compiled.schema.mutation.is_none());
        assert!(compiled.schema.subscription.is_none());
        assert!(compiled.schema.directives.is_empty());
    }

    #[test]
    fn test_out_of_scope_roots_are_skipped() {
        let compiled = compile_library(CompilerConfig::for_packages(["com.example.library.model"]));
        assert_eq!(names(&compiled.schema.query.fields), vec![PLACEHOLDER_FIELD]);
        assert!(compiled.schema.get("Book").is_some());
    }

    #[test]
    fn test_root_collision_is_fatal() {
        let mut set = fixtures::library();
        set.insert(
            TypeDescriptor::new("com.example.library.legacy.Book", TypeKind::Class)
                .with_marker(Marker::Object(TypeMarker::default())),
        );
        let err = SchemaCompiler::new(library_config())
            .unwrap()
            .compile(&set)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::NamingCollision { .. }));
    }

    #[test]
    fn test_duplicate_operation_keeps_first() {
        let controller = |name: &str| {
            TypeDescriptor::new(name, TypeKind::Class)
                .with_marker(Marker::Controller(ControllerMarker::default()))
                .with_method(MethodDescriptor::new("ping", fixtures::string()).with_marker(fixtures::query()))
        };
        let set = DescriptorSet::new(vec![controller("com.a.First"), controller("com.a.Second")]);
        let compiled = SchemaCompiler::new(CompilerConfig::for_packages(["com.a"]))
            .unwrap()
            .compile(&set)
            .unwrap();

        assert_eq!(names(&compiled.schema.query.fields), vec!["ping"]);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].location, "com.a.Second.ping");
    }

    #[test]
    fn test_check_fail_on_error() {
        let compiled = compile_library(library_config());
        assert!(compiled.check(false).is_ok());
        assert!(matches!(compiled.check(true), Err(GeneratorError::RecoveredIssues(2))));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let first = compile_library(library_config()).to_sdl().unwrap();
        let second = compile_library(library_config()).to_sdl().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_shards() {
        let shard = |name: &str, operation: &str| {
            let set = DescriptorSet::new(vec![
                fixtures::book_status(),
                TypeDescriptor::new(format!("com.a.{}", name), TypeKind::Class)
                    .with_marker(Marker::Controller(ControllerMarker::default()))
                    .with_method(
                        MethodDescriptor::new(operation, TypeSignature::enumeration(fixtures::BOOK_STATUS))
                            .with_marker(fixtures::query()),
                    ),
            ]);
            let config = CompilerConfig::for_packages(["com.a", "com.example"]);
            SchemaCompiler::new(config).unwrap().compile(&set).unwrap()
        };

        let merged = shard("Left", "status").merge(shard("Right", "defaultStatus")).unwrap();
        assert_eq!(names(&merged.schema.query.fields), vec!["status", "defaultStatus"]);
        assert!(merged.schema.get("BookStatus").is_some());

        let shared = shard("Left", "status").merge(shard("Right", "status")).unwrap();
        assert_eq!(names(&shared.schema.query.fields), vec!["status"]);
    }

    #[test]
    fn test_merge_rejects_differing_types() {
        let left = SchemaCompiler::new(library_config())
            .unwrap()
            .compile(&DescriptorSet::new(vec![fixtures::book_status()]))
            .unwrap();

        let mut other_status = fixtures::book_status();
        other_status.enum_values.truncate(1);
        let right = SchemaCompiler::new(library_config())
            .unwrap()
            .compile(&DescriptorSet::new(vec![other_status]))
            .unwrap();

        let err = left.merge(right).unwrap_err();
        assert!(matches!(err, GeneratorError::NamingCollision { ref name, .. } if name == "BookStatus"));
    }
}
