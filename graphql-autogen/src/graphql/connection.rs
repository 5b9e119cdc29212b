//! Pagination types and arguments
//!
//! Generates:
//! - PageInfo type (once per generator)
//! - Node Edge types (BookEdge, AuthorEdge, etc.)
//! - Node Connection types (BookConnection, AuthorConnection, etc.)
//! - The argument set of each pagination strategy
//!
//! Connection and edge types are cached by name, so every member paginating
//! the same node with the same naming shares one definition.

use super::types::TypeResolver;
use crate::descriptor::{FieldDescriptor, Member, MemberOrigin, MethodDescriptor, TypeDescriptor};
use crate::error::GeneratorError;
use crate::ir::{FieldDefinition, InputValueDefinition, ObjectType, TypeDefinition, TypeRef, Value};
use crate::markers::{CursorStrategy, PaginationMarker, PaginationStrategy, non_blank};
use crate::scalar::BuiltinScalar;
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Name of the shared page info type
pub const PAGE_INFO: &str = "PageInfo";

/// Pagination settings for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationSpec {
    /// Identity of the declaring type
    pub owner: String,
    /// Raw member name
    pub member: String,
    /// Attribute or accessor
    pub origin: MemberOrigin,
    /// Pagination strategy
    pub strategy: PaginationStrategy,
    /// Identity of the paginated element type
    pub node_type: String,
    /// Schema name of the paginated element type
    pub node_type_name: String,
    /// Connection type name
    pub connection_name: String,
    /// Edge type name
    pub edge_name: String,
    /// Default page size, never above `max_page_size`
    pub page_size: u32,
    /// Upper bound for the page size
    pub max_page_size: u32,
    /// Emit `totalCount`
    pub include_total_count: bool,
    /// Emit `edges`
    pub include_edges: bool,
    /// Emit `pageInfo`
    pub include_page_info: bool,
    /// Cursor encoding
    pub cursor_strategy: CursorStrategy,
    /// Extra string arguments
    pub custom_arguments: Vec<String>,
    /// Append a `filter` argument
    pub generate_filters: bool,
    /// Append sort arguments
    pub generate_sorting: bool,
}

/// Builds pagination specs, wrapper types and arguments
pub struct PaginationGenerator<'a> {
    types: &'a TypeResolver<'a>,
    connections: RefCell<IndexMap<String, Rc<ObjectType>>>,
    edges: RefCell<IndexMap<String, Rc<ObjectType>>>,
    page_info: OnceCell<Rc<ObjectType>>,
}

impl<'a> PaginationGenerator<'a> {
    /// Create a generator with empty caches
    pub fn new(types: &'a TypeResolver<'a>) -> Self {
        Self {
            types,
            connections: RefCell::new(IndexMap::new()),
            edges: RefCell::new(IndexMap::new()),
            page_info: OnceCell::new(),
        }
    }

    /// Specs for every paginated method, then every paginated attribute
    pub fn generate_pagination_configurations(&self, owner: &TypeDescriptor) -> Vec<PaginationSpec> {
        let methods = owner.methods.iter().map(Member::Method);
        let fields = owner.fields.iter().map(Member::Field);
        let specs: Vec<_> = methods
            .chain(fields)
            .filter_map(|member| self.generate_for_member(owner, member))
            .collect();
        debug!(owner = %owner.name, count = specs.len(), "generated pagination specs");
        specs
    }

    /// Spec for a paginated method
    pub fn generate_for_method(&self, owner: &TypeDescriptor, method: &MethodDescriptor) -> Option<PaginationSpec> {
        self.generate_for_member(owner, Member::Method(method))
    }

    /// Spec for a paginated attribute
    pub fn generate_for_field(&self, owner: &TypeDescriptor, field: &FieldDescriptor) -> Option<PaginationSpec> {
        self.generate_for_member(owner, Member::Field(field))
    }

    /// Spec for a member; `None` when it is not paginated or its node type
    /// cannot be determined
    pub fn generate_for_member(&self, owner: &TypeDescriptor, member: Member<'_>) -> Option<PaginationSpec> {
        if !self.should_generate_pagination(member) {
            return None;
        }
        let marker = member.markers().pagination()?;

        match self.build_spec(owner, member, marker) {
            Ok(spec) => Some(spec),
            Err(e) => {
                self.types
                    .diagnostics()
                    .report(format!("{}.{}", owner.name, member.name()), &e);
                None
            }
        }
    }

    /// Whether the member carries an enabled pagination marker
    pub fn should_generate_pagination(&self, member: Member<'_>) -> bool {
        let markers = member.markers();
        !markers.ignored() && markers.pagination().is_some()
    }

    fn build_spec(
        &self,
        owner: &TypeDescriptor,
        member: Member<'_>,
        marker: &PaginationMarker,
    ) -> Result<PaginationSpec, GeneratorError> {
        let declared = member.declared_type();
        let node = declared.element().ok_or_else(|| {
            GeneratorError::UnresolvableType(format!("element type of paginated {}", declared))
        })?;
        let node_type_name = self.types.resolve(node)?.name().to_string();

        let mut page_size = marker.page_size;
        if page_size > marker.max_page_size {
            self.types.diagnostics().warn(
                format!("{}.{}", owner.name, member.name()),
                format!(
                    "page size {} exceeds max page size {}; clamped",
                    page_size, marker.max_page_size
                ),
            );
            page_size = marker.max_page_size;
        }

        Ok(PaginationSpec {
            owner: owner.name.clone(),
            member: member.name().to_string(),
            origin: member.origin(),
            strategy: marker.strategy,
            node_type: node.identity(),
            connection_name: non_blank(&marker.connection_name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}Connection", node_type_name)),
            edge_name: non_blank(&marker.edge_name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}Edge", node_type_name)),
            node_type_name,
            page_size,
            max_page_size: marker.max_page_size,
            include_total_count: marker.include_total_count,
            include_edges: marker.include_edges,
            include_page_info: marker.include_page_info,
            cursor_strategy: marker.cursor_strategy,
            custom_arguments: marker.custom_arguments.clone(),
            generate_filters: marker.generate_filters,
            generate_sorting: marker.generate_sorting,
        })
    }

    /// Connection type of a spec, cached by connection name
    pub fn generate_connection_type(&self, spec: &PaginationSpec) -> Rc<ObjectType> {
        if let Some(cached) = self.connections.borrow().get(&spec.connection_name) {
            return Rc::clone(cached);
        }

        let mut connection = ObjectType::new(&spec.connection_name);
        connection.description = Some(format!("A connection to a list of {} items", spec.node_type_name));

        if spec.include_edges {
            let edge = self.generate_edge_type(spec);
            connection.fields.push(
                FieldDefinition::new("edges", TypeRef::named(&edge.name).non_null().list())
                    .with_description("A list of edges"),
            );
        }
        if spec.include_page_info {
            self.generate_page_info_type();
            connection.fields.push(
                FieldDefinition::new("pageInfo", TypeRef::named(PAGE_INFO).non_null())
                    .with_description("Information to aid in pagination"),
            );
        }
        if spec.include_total_count {
            connection.fields.push(
                FieldDefinition::new("totalCount", TypeRef::named(BuiltinScalar::Int.name()))
                    .with_description("The total number of items available"),
            );
        }

        debug!(connection = %connection.name, "generated connection type");
        let connection = Rc::new(connection);
        self.connections
            .borrow_mut()
            .insert(spec.connection_name.clone(), Rc::clone(&connection));
        connection
    }

    /// Edge type of a spec, cached by edge name
    pub fn generate_edge_type(&self, spec: &PaginationSpec) -> Rc<ObjectType> {
        if let Some(cached) = self.edges.borrow().get(&spec.edge_name) {
            return Rc::clone(cached);
        }

        let mut edge = ObjectType::new(&spec.edge_name);
        edge.description = Some(format!(
            "An edge in a connection from an object to another object of type {}",
            spec.node_type_name
        ));
        edge.fields = vec![
            FieldDefinition::new("node", TypeRef::named(&spec.node_type_name))
                .with_description("The item at the end of the edge"),
            FieldDefinition::new("cursor", TypeRef::named(BuiltinScalar::String.name()).non_null())
                .with_description("A cursor for use in pagination"),
        ];

        let edge = Rc::new(edge);
        self.edges
            .borrow_mut()
            .insert(spec.edge_name.clone(), Rc::clone(&edge));
        edge
    }

    /// The shared page info type
    pub fn generate_page_info_type(&self) -> Rc<ObjectType> {
        let page_info = self.page_info.get_or_init(|| {
            let boolean = || TypeRef::named(BuiltinScalar::Boolean.name()).non_null();
            let string = || TypeRef::named(BuiltinScalar::String.name());

            let mut page_info = ObjectType::new(PAGE_INFO);
            page_info.description = Some("Information about pagination in a connection".to_string());
            page_info.fields = vec![
                FieldDefinition::new("hasNextPage", boolean())
                    .with_description("When paginating forwards, are there more items?"),
                FieldDefinition::new("hasPreviousPage", boolean())
                    .with_description("When paginating backwards, are there more items?"),
                FieldDefinition::new("startCursor", string())
                    .with_description("When paginating backwards, the cursor to continue"),
                FieldDefinition::new("endCursor", string())
                    .with_description("When paginating forwards, the cursor to continue"),
            ];
            Rc::new(page_info)
        });
        Rc::clone(page_info)
    }

    /// Strategy arguments, then custom, filter and sort arguments
    pub fn generate_pagination_arguments(&self, spec: &PaginationSpec) -> Vec<InputValueDefinition> {
        let int = || TypeRef::named(BuiltinScalar::Int.name());
        let string = || TypeRef::named(BuiltinScalar::String.name());

        let mut arguments = match spec.strategy {
            PaginationStrategy::RelayCursor => vec![
                InputValueDefinition::new("first", int())
                    .with_description("Returns the first n elements from the list"),
                InputValueDefinition::new("after", string())
                    .with_description("Returns the elements in the list that come after the specified cursor"),
                InputValueDefinition::new("last", int())
                    .with_description("Returns the last n elements from the list"),
                InputValueDefinition::new("before", string())
                    .with_description("Returns the elements in the list that come before the specified cursor"),
            ],
            PaginationStrategy::OffsetBased => vec![
                InputValueDefinition::new("limit", int())
                    .with_description("Maximum number of items to return")
                    .with_default(Value::Int(i64::from(spec.page_size))),
                InputValueDefinition::new("offset", int())
                    .with_description("Number of items to skip")
                    .with_default(Value::Int(0)),
            ],
            PaginationStrategy::PageBased => {
                let mut page = vec![
                    InputValueDefinition::new("page", int())
                        .with_description("Page number (1-based)")
                        .with_default(Value::Int(1)),
                    InputValueDefinition::new("size", int())
                        .with_description("Number of items per page")
                        .with_default(Value::Int(i64::from(spec.page_size))),
                ];
                if spec.generate_sorting {
                    page.extend(sort_arguments());
                }
                page
            }
            PaginationStrategy::Custom => Vec::new(),
        };

        let mut trailing: Vec<InputValueDefinition> = spec
            .custom_arguments
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| InputValueDefinition::new(name.trim(), string()))
            .collect();
        if spec.generate_filters {
            trailing.push(InputValueDefinition::new("filter", string()).with_description("Filter criteria"));
        }
        if spec.generate_sorting {
            trailing.extend(sort_arguments());
        }

        for argument in trailing {
            if arguments.iter().all(|a| a.name != argument.name) {
                arguments.push(argument);
            }
        }
        arguments
    }

    /// Apply a spec to a resolved field
    ///
    /// Pagination arguments are appended unless an argument of the same name
    /// already exists. Relay cursor pagination also replaces the result with
    /// the connection type, keeping the field's non-null wrapper.
    pub fn generate_paginated_field(&self, spec: &PaginationSpec, field: &FieldDefinition) -> FieldDefinition {
        let mut paginated = field.clone();
        for argument in self.generate_pagination_arguments(spec) {
            if paginated.argument(&argument.name).is_none() {
                paginated.arguments.push(argument);
            }
        }

        if spec.strategy == PaginationStrategy::RelayCursor {
            let connection = self.generate_connection_type(spec);
            let ty = TypeRef::named(&connection.name);
            paginated.ty = if field.ty.is_non_null() { ty.non_null() } else { ty };
        }
        paginated
    }

    /// Every generated type: page info, connections, then edges
    pub fn generated_types(&self) -> Vec<TypeDefinition> {
        let page_info = self.page_info.get().map(|p| TypeDefinition::Object(p.as_ref().clone()));
        let connections = self.connections.borrow();
        let edges = self.edges.borrow();

        page_info
            .into_iter()
            .chain(connections.values().map(|c| TypeDefinition::Object(c.as_ref().clone())))
            .chain(edges.values().map(|e| TypeDefinition::Object(e.as_ref().clone())))
            .collect()
    }
}

fn sort_arguments() -> [InputValueDefinition; 2] {
    let string = || TypeRef::named(BuiltinScalar::String.name());
    [
        InputValueDefinition::new("sortBy", string()).with_description("Field to sort by"),
        InputValueDefinition::new("sortDirection", string())
            .with_description("Sort direction (ASC or DESC)")
            .with_default(Value::String("ASC".to_string())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorSet, TypeKind, TypeSignature};
    use crate::diagnostics::Diagnostics;
    use crate::fixtures;
    use crate::markers::Marker;
    use crate::naming::NamingStrategy;

    fn arg_names(arguments: &[InputValueDefinition]) -> Vec<&str> {
        arguments.iter().map(|a| a.name.as_str()).collect()
    }

    fn paginated_method(marker: PaginationMarker) -> MethodDescriptor {
        MethodDescriptor::new("getBooks", TypeSignature::list_of(TypeSignature::class(fixtures::BOOK)))
            .with_parameter(crate::descriptor::ParameterDescriptor::new(
                "first",
                TypeSignature::class("java.lang.Integer"),
            ))
            .with_parameter(crate::descriptor::ParameterDescriptor::new("after", fixtures::string()))
            .with_marker(Marker::Pagination(marker))
    }

    #[test]
    fn test_relay_defaults() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let owner = set.get(fixtures::AUTHOR).unwrap();
        let method = paginated_method(PaginationMarker::default());
        let spec = generator.generate_for_method(owner, &method).unwrap();

        assert_eq!(spec.node_type_name, "Book");
        assert_eq!(spec.connection_name, "BookConnection");
        assert_eq!(spec.edge_name, "BookEdge");
        assert_eq!(spec.origin, MemberOrigin::Accessor);
        assert_eq!(
            arg_names(&generator.generate_pagination_arguments(&spec)),
            vec!["first", "after", "last", "before"]
        );
    }

    #[test]
    fn test_offset_arguments() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            strategy: PaginationStrategy::OffsetBased,
            page_size: 25,
            custom_arguments: vec!["genre".into()],
            ..Default::default()
        });
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();
        let arguments = generator.generate_pagination_arguments(&spec);

        assert_eq!(arg_names(&arguments), vec!["limit", "offset", "genre"]);
        assert_eq!(arguments[0].default_value, Some(Value::Int(25)));
        assert_eq!(arguments[1].default_value, Some(Value::Int(0)));
        assert_eq!(arguments[2].ty, TypeRef::named("String"));
    }

    #[test]
    fn test_page_arguments_with_sorting() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            strategy: PaginationStrategy::PageBased,
            generate_sorting: true,
            generate_filters: true,
            ..Default::default()
        });
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();
        let arguments = generator.generate_pagination_arguments(&spec);

        // Sort arguments appear once
        assert_eq!(
            arg_names(&arguments),
            vec!["page", "size", "sortBy", "sortDirection", "filter"]
        );
        assert_eq!(arguments[0].default_value, Some(Value::Int(1)));
        assert_eq!(arguments[1].default_value, Some(Value::Int(20)));
        assert_eq!(arguments[3].default_value, Some(Value::String("ASC".into())));
    }

    #[test]
    fn test_custom_strategy() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            strategy: PaginationStrategy::Custom,
            custom_arguments: vec!["cursor".into(), "window".into()],
            generate_filters: true,
            ..Default::default()
        });
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();

        assert_eq!(
            arg_names(&generator.generate_pagination_arguments(&spec)),
            vec!["cursor", "window", "filter"]
        );
    }

    #[test]
    fn test_connection_shape_and_caching() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let author = set.get(fixtures::AUTHOR).unwrap();
        let spec = generator.generate_for_field(author, author.field("books").unwrap()).unwrap();

        let first = generator.generate_connection_type(&spec);
        let second = generator.generate_connection_type(&spec);
        assert!(Rc::ptr_eq(&first, &second));

        let fields: Vec<_> = first.fields.iter().map(|f| (f.name.as_str(), f.ty.to_string())).collect();
        assert_eq!(
            fields,
            vec![
                ("edges", "[BookEdge!]".to_string()),
                ("pageInfo", "PageInfo!".to_string()),
                ("totalCount", "Int".to_string()),
            ]
        );

        let edge = generator.generate_edge_type(&spec);
        assert_eq!(edge.field("node").unwrap().ty.to_string(), "Book");
        assert_eq!(edge.field("cursor").unwrap().ty.to_string(), "String!");

        assert!(Rc::ptr_eq(
            &generator.generate_page_info_type(),
            &generator.generate_page_info_type()
        ));
        // PageInfo, BookConnection, BookEdge
        assert_eq!(generator.generated_types().len(), 3);
    }

    #[test]
    fn test_same_connection_name_is_shared() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let author = set.get(fixtures::AUTHOR).unwrap();
        let from_field = generator.generate_for_field(author, author.field("books").unwrap()).unwrap();
        let from_method = generator
            .generate_for_method(author, &paginated_method(PaginationMarker::default()))
            .unwrap();

        assert!(Rc::ptr_eq(
            &generator.generate_connection_type(&from_field),
            &generator.generate_connection_type(&from_method)
        ));
    }

    #[test]
    fn test_empty_connection_is_allowed() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            connection_name: Some("BareConnection".into()),
            include_edges: false,
            include_page_info: false,
            include_total_count: false,
            ..Default::default()
        });
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();
        let connection = generator.generate_connection_type(&spec);

        assert!(connection.fields.is_empty());
        assert_eq!(generator.generated_types().len(), 1);
    }

    #[test]
    fn test_unknown_node_type_is_skipped() {
        let owner = TypeDescriptor::new("com.a.Shelf", TypeKind::Class)
            .with_marker(fixtures::object())
            .with_field(
                FieldDescriptor::new("items", TypeSignature::new("java.util.List", TypeKind::Collection))
                    .with_marker(Marker::Pagination(PaginationMarker::default())),
            )
            .with_field(FieldDescriptor::new("name", fixtures::string()));
        let set = DescriptorSet::new(vec![owner.clone()]);
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        assert!(generator.generate_pagination_configurations(&owner).is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            page_size: 500,
            max_page_size: 50,
            ..Default::default()
        });
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();

        assert_eq!(spec.page_size, 50);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_paginated_field_keeps_existing_arguments() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker::default());
        let spec = generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .unwrap();

        let mut field = FieldDefinition::new("books", TypeRef::named("Book").list().non_null());
        field.arguments.push(
            InputValueDefinition::new("first", TypeRef::named("Int").non_null()).with_default(Value::Int(5)),
        );
        let paginated = generator.generate_paginated_field(&spec, &field);

        assert_eq!(arg_names(&paginated.arguments), vec!["first", "after", "last", "before"]);
        assert_eq!(paginated.arguments[0].default_value, Some(Value::Int(5)));
        assert_eq!(paginated.ty.to_string(), "BookConnection!");
    }

    #[test]
    fn test_disabled_marker() {
        let set = fixtures::library();
        let diagnostics = Diagnostics::new();
        let types = TypeResolver::new(&set, &diagnostics, NamingStrategy::PascalCase);
        let generator = PaginationGenerator::new(&types);

        let method = paginated_method(PaginationMarker {
            enabled: false,
            ..Default::default()
        });
        assert!(!generator.should_generate_pagination(Member::Method(&method)));
        assert!(generator
            .generate_for_method(set.get(fixtures::AUTHOR).unwrap(), &method)
            .is_none());
    }
}
