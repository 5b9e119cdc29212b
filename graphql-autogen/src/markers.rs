//! Intent markers
//!
//! Tagged facts attached to descriptors at scan time ("this is an object
//! type", "this field is an identifier", "this method is a query", ...).
//! Resolvers switch on the marker variants instead of probing live
//! annotations.
//!
//! Markers with an `enabled` flag are reported as absent by the [`Markers`]
//! accessors when the flag is false.

use crate::descriptor::TypeSignature;
use serde::{Deserialize, Serialize};

/// A single intent marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "marker", rename_all = "snake_case")]
pub enum Marker {
    /// Output object type
    Object(TypeMarker),
    /// Input object type
    Input(TypeMarker),
    /// Interface type
    Interface(TypeMarker),
    /// Union type with declared members
    Union(UnionMarker),
    /// Enum type
    Enum(TypeMarker),
    /// Custom scalar type
    Scalar(ScalarMarker),
    /// Class whose methods are root operations
    Controller(ControllerMarker),
    /// Explicit field inclusion and overrides
    Field(FieldMarker),
    /// Input object field overrides
    InputField(InputFieldMarker),
    /// Identifier field, always `ID!`
    Id(IdMarker),
    /// Excluded from the schema
    Ignore,
    /// Free-standing description
    Description(DescriptionMarker),
    /// Enum value overrides
    EnumValue(EnumValueMarker),
    /// Query operation
    Query(OperationMarker),
    /// Mutation operation
    Mutation(OperationMarker),
    /// Subscription operation
    Subscription(OperationMarker),
    /// Operation argument overrides
    Argument(ArgumentMarker),
    /// Subscription filter argument
    SubscriptionFilter(SubscriptionFilterMarker),
    /// Role and permission requirements
    Authorize(AuthorizeMarker),
    /// Paginated collection
    Pagination(PaginationMarker),
    /// Batch-loaded relationship
    DataLoader(DataLoaderMarker),
}

/// Shared shape of object, input, interface and enum markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for TypeMarker {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            enabled: true,
        }
    }
}

/// Union marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnionMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Identities of the member types
    pub members: Vec<String>,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for UnionMarker {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            members: Vec::new(),
            enabled: true,
        }
    }
}

/// Custom scalar marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarMarker {
    /// Scalar name, defaults to the type's simple name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
}

/// Controller marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerMarker {
    /// Prefix for auto-named operations
    pub prefix: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for ControllerMarker {
    fn default() -> Self {
        Self {
            prefix: None,
            description: None,
            enabled: true,
        }
    }
}

/// Field marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// `false` wraps the field type in non-null
    pub nullable: bool,
    /// Marks the field deprecated when non-empty
    pub deprecation_reason: Option<String>,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for FieldMarker {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            nullable: true,
            deprecation_reason: None,
            enabled: true,
        }
    }
}

/// Input field marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFieldMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Wraps the field type in non-null
    pub required: bool,
    /// Default value literal
    pub default_value: Option<String>,
}

/// Identifier marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
}

/// Description marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionMarker {
    /// Description text
    pub text: String,
}

/// Enum value marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValueMarker {
    /// Explicit GraphQL name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Marks the value deprecated when non-empty
    pub deprecation_reason: Option<String>,
}

/// Query, mutation and subscription marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationMarker {
    /// Explicit operation name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Whether the marker is in effect
    pub enabled: bool,
    /// Marks the operation deprecated when non-empty
    pub deprecation_reason: Option<String>,
    /// Roles required to run the operation
    pub roles: Vec<String>,
    /// Permissions required to run the operation
    pub permissions: Vec<String>,
    /// Result type override (mutations only)
    pub payload_type: Option<TypeSignature>,
    /// Result is a list of payloads (mutations only)
    pub batch: bool,
}

impl Default for OperationMarker {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            enabled: true,
            deprecation_reason: None,
            roles: Vec::new(),
            permissions: Vec::new(),
            payload_type: None,
            batch: false,
        }
    }
}

/// Argument marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentMarker {
    /// Explicit argument name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Explicit required flag
    pub required: Option<bool>,
    /// Default value literal
    pub default_value: Option<String>,
}

/// Subscription filter marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionFilterMarker {
    /// Explicit argument name
    pub name: Option<String>,
    /// Explicit description
    pub description: Option<String>,
    /// Filter may be omitted by the client
    pub optional: bool,
}

/// Authorization marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizeMarker {
    /// Required roles
    pub roles: Vec<String>,
    /// Required permissions
    pub permissions: Vec<String>,
}

/// Pagination strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaginationStrategy {
    /// Relay cursor connections (`first`/`after`/`last`/`before`)
    #[default]
    RelayCursor,
    /// `limit`/`offset`
    #[serde(alias = "OFFSET")]
    OffsetBased,
    /// `page`/`size`
    #[serde(alias = "PAGE")]
    PageBased,
    /// Only declared custom arguments
    Custom,
}

/// How cursors are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CursorStrategy {
    /// Base64-encoded identifier
    #[default]
    Base64Id,
    /// Raw identifier
    PlainId,
    /// Base64-encoded composite key
    Base64Composite,
    /// Timestamp
    Timestamp,
    /// Application-defined
    Custom,
}

/// Pagination marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationMarker {
    /// Pagination strategy
    #[serde(alias = "type")]
    pub strategy: PaginationStrategy,
    /// Connection type name, defaults to `<Node>Connection`
    pub connection_name: Option<String>,
    /// Edge type name, defaults to `<Node>Edge`
    pub edge_name: Option<String>,
    /// Default page size
    pub page_size: u32,
    /// Upper bound for the page size
    pub max_page_size: u32,
    /// Emit `totalCount` on the connection
    pub include_total_count: bool,
    /// Emit `edges` on the connection
    pub include_edges: bool,
    /// Emit `pageInfo` on the connection
    pub include_page_info: bool,
    /// Cursor encoding
    pub cursor_strategy: CursorStrategy,
    /// Extra string arguments
    pub custom_arguments: Vec<String>,
    /// Append a `filter` argument
    pub generate_filters: bool,
    /// Append sort arguments
    pub generate_sorting: bool,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for PaginationMarker {
    fn default() -> Self {
        Self {
            strategy: PaginationStrategy::RelayCursor,
            connection_name: None,
            edge_name: None,
            page_size: 20,
            max_page_size: 100,
            include_total_count: true,
            include_edges: true,
            include_page_info: true,
            cursor_strategy: CursorStrategy::Base64Id,
            custom_arguments: Vec::new(),
            generate_filters: false,
            generate_sorting: false,
            enabled: true,
        }
    }
}

/// How data-loader cache keys are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheKeyStrategy {
    /// Key property value
    #[default]
    PropertyValue,
    /// Hash of the key property
    PropertyHash,
    /// Application-defined method
    CustomMethod,
}

/// Data-loader marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLoaderMarker {
    /// Loader name, defaults to `<member>DataLoader`
    pub name: Option<String>,
    /// Maximum keys per batch
    pub batch_size: u32,
    /// Cache loaded values per request
    pub caching_enabled: bool,
    /// Batch individual loads
    pub batching_enabled: bool,
    /// Property holding the batch key
    pub key_property: Option<String>,
    /// Service method loading a batch
    pub batch_load_method: Option<String>,
    /// Service type providing the batch method
    pub service_class: Option<String>,
    /// Batch window in milliseconds
    pub batch_timeout_ms: u64,
    /// Collect loader statistics
    pub statistics_enabled: bool,
    /// Cache key computation
    pub cache_key_strategy: CacheKeyStrategy,
    /// Whether the marker is in effect
    pub enabled: bool,
}

impl Default for DataLoaderMarker {
    fn default() -> Self {
        Self {
            name: None,
            batch_size: 100,
            caching_enabled: true,
            batching_enabled: true,
            key_property: None,
            batch_load_method: None,
            service_class: None,
            batch_timeout_ms: 50,
            statistics_enabled: false,
            cache_key_strategy: CacheKeyStrategy::PropertyValue,
            enabled: true,
        }
    }
}

/// The markers attached to one descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markers(Vec<Marker>);

impl Markers {
    /// Wrap a list of markers
    pub fn new(markers: Vec<Marker>) -> Self {
        Self(markers)
    }

    /// Add a marker
    pub fn push(&mut self, marker: Marker) {
        self.0.push(marker);
    }

    /// Iterate over all markers, enabled or not
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.0.iter()
    }

    /// True when no markers are attached
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Explicitly excluded from the schema
    pub fn ignored(&self) -> bool {
        self.0.iter().any(|m| matches!(m, Marker::Ignore))
    }

    /// Object intent
    pub fn object(&self) -> Option<&TypeMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Object(t) if t.enabled => Some(t),
            _ => None,
        })
    }

    /// Input intent
    pub fn input(&self) -> Option<&TypeMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Input(t) if t.enabled => Some(t),
            _ => None,
        })
    }

    /// Interface intent
    pub fn interface(&self) -> Option<&TypeMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Interface(t) if t.enabled => Some(t),
            _ => None,
        })
    }

    /// Union intent
    pub fn union(&self) -> Option<&UnionMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Union(u) if u.enabled => Some(u),
            _ => None,
        })
    }

    /// Enum intent
    pub fn enumeration(&self) -> Option<&TypeMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Enum(t) if t.enabled => Some(t),
            _ => None,
        })
    }

    /// Custom scalar intent
    pub fn scalar(&self) -> Option<&ScalarMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Scalar(s) => Some(s),
            _ => None,
        })
    }

    /// Controller intent
    pub fn controller(&self) -> Option<&ControllerMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Controller(c) if c.enabled => Some(c),
            _ => None,
        })
    }

    /// Field overrides
    pub fn field(&self) -> Option<&FieldMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Field(f) if f.enabled => Some(f),
            _ => None,
        })
    }

    /// Input field overrides
    pub fn input_field(&self) -> Option<&InputFieldMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::InputField(f) => Some(f),
            _ => None,
        })
    }

    /// Identifier intent
    pub fn id(&self) -> Option<&IdMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Id(i) => Some(i),
            _ => None,
        })
    }

    /// Free-standing description text
    pub fn description(&self) -> Option<&str> {
        self.0.iter().find_map(|m| match m {
            Marker::Description(d) => Some(d.text.as_str()),
            _ => None,
        })
    }

    /// Enum value overrides
    pub fn enum_value(&self) -> Option<&EnumValueMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::EnumValue(v) => Some(v),
            _ => None,
        })
    }

    /// Query intent
    pub fn query(&self) -> Option<&OperationMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Query(o) if o.enabled => Some(o),
            _ => None,
        })
    }

    /// Mutation intent
    pub fn mutation(&self) -> Option<&OperationMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Mutation(o) if o.enabled => Some(o),
            _ => None,
        })
    }

    /// Subscription intent
    pub fn subscription(&self) -> Option<&OperationMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Subscription(o) if o.enabled => Some(o),
            _ => None,
        })
    }

    /// Argument overrides
    pub fn argument(&self) -> Option<&ArgumentMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Argument(a) => Some(a),
            _ => None,
        })
    }

    /// Subscription filter intent
    pub fn subscription_filter(&self) -> Option<&SubscriptionFilterMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::SubscriptionFilter(f) => Some(f),
            _ => None,
        })
    }

    /// Authorization requirements
    pub fn authorize(&self) -> Option<&AuthorizeMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Authorize(a) => Some(a),
            _ => None,
        })
    }

    /// Pagination intent
    pub fn pagination(&self) -> Option<&PaginationMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::Pagination(p) if p.enabled => Some(p),
            _ => None,
        })
    }

    /// Batch-load intent
    pub fn data_loader(&self) -> Option<&DataLoaderMarker> {
        self.0.iter().find_map(|m| match m {
            Marker::DataLoader(d) if d.enabled => Some(d),
            _ => None,
        })
    }

    /// Carries any type-level intent (object, input, interface, union, enum, scalar)
    pub fn has_type_intent(&self) -> bool {
        self.object().is_some()
            || self.input().is_some()
            || self.interface().is_some()
            || self.union().is_some()
            || self.enumeration().is_some()
            || self.scalar().is_some()
    }
}

impl From<Vec<Marker>> for Markers {
    fn from(markers: Vec<Marker>) -> Self {
        Self(markers)
    }
}

/// Treat empty or whitespace-only override strings as absent
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_markers_are_absent() {
        let markers = Markers::new(vec![
            Marker::Object(TypeMarker {
                enabled: false,
                ..Default::default()
            }),
            Marker::Query(OperationMarker::default()),
        ]);

        assert!(markers.object().is_none());
        assert!(markers.query().is_some());
        assert!(!markers.has_type_intent());
    }

    #[test]
    fn test_deserialize_tagged_markers() {
        let json = r#"[
            {"marker": "object", "name": "Book"},
            {"marker": "ignore"},
            {"marker": "pagination", "strategy": "OFFSET", "page_size": 50},
            {"marker": "field", "nullable": false}
        ]"#;
        let markers: Markers = serde_json::from_str(json).unwrap();

        assert_eq!(markers.object().unwrap().name.as_deref(), Some("Book"));
        assert!(markers.ignored());

        let pagination = markers.pagination().unwrap();
        assert_eq!(pagination.strategy, PaginationStrategy::OffsetBased);
        assert_eq!(pagination.page_size, 50);
        assert_eq!(pagination.max_page_size, 100);
        assert!(pagination.include_edges);

        assert!(!markers.field().unwrap().nullable);
    }

    #[test]
    fn test_marker_defaults() {
        let loader = DataLoaderMarker::default();
        assert_eq!(loader.batch_size, 100);
        assert_eq!(loader.batch_timeout_ms, 50);
        assert!(loader.caching_enabled);
        assert_eq!(loader.cache_key_strategy, CacheKeyStrategy::PropertyValue);

        assert!(FieldMarker::default().nullable);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  Book ".to_string())), Some("Book"));
        assert_eq!(non_blank(&Some("   ".to_string())), None);
        assert_eq!(non_blank(&None), None);
    }
}
