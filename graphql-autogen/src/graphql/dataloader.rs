//! DataLoader configuration
//!
//! Builds batch-loading records for relationship members carrying a
//! data-loader marker. A record names the loader, its key and value types,
//! the property holding the batch key and the service method expected to
//! load a batch. Turning a record into an executable loader is left to the
//! code emitter consuming the records.

use super::types::TypeResolver;
use crate::descriptor::{
    FieldDescriptor, Member, MemberOrigin, MethodDescriptor, TypeDescriptor, TypeKind, TypeSignature,
};
use crate::error::GeneratorError;
use crate::markers::{CacheKeyStrategy, DataLoaderMarker, non_blank};
use serde::Serialize;
use tracing::debug;

/// Key type used when no key property type can be found
pub const DEFAULT_KEY_TYPE: &str = "java.lang.Long";

/// Batch method used when none is declared
pub const DEFAULT_BATCH_METHOD: &str = "findByIds";

/// Where a batch is loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBinding {
    /// Service type identity or simple name
    pub class_name: String,
    /// Batch method on the service
    pub method_name: String,
    /// Set when either part was derived from naming conventions
    pub inferred: bool,
}

/// Batch-loading record for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLoaderSpec {
    /// Identity of the declaring type
    pub owner: String,
    /// Raw member name
    pub member: String,
    /// Attribute or accessor
    pub origin: MemberOrigin,
    /// Loader name
    pub name: String,
    /// Identity of the batch key type
    pub key_type: String,
    /// Identity of the loaded value type
    pub value_type: String,
    /// Property holding the batch key
    pub key_property: String,
    /// Maximum keys per batch
    pub batch_size: u32,
    /// Cache loaded values per request
    pub caching_enabled: bool,
    /// Batch individual loads
    pub batching_enabled: bool,
    /// Batch window in milliseconds
    pub batch_timeout_ms: u64,
    /// Collect loader statistics
    pub statistics_enabled: bool,
    /// Cache key computation
    pub cache_key_strategy: CacheKeyStrategy,
    /// Service providing the batch method
    pub service: ServiceBinding,
}

/// Builds data-loader records
pub struct DataLoaderGenerator<'a> {
    types: &'a TypeResolver<'a>,
}

impl<'a> DataLoaderGenerator<'a> {
    /// Create a generator
    pub fn new(types: &'a TypeResolver<'a>) -> Self {
        Self { types }
    }

    /// Records for every marked attribute, then every marked method
    pub fn generate_data_loaders(&self, owner: &TypeDescriptor) -> Vec<DataLoaderSpec> {
        let fields = owner.fields.iter().map(Member::Field);
        let methods = owner.methods.iter().map(Member::Method);
        let specs: Vec<_> = fields
            .chain(methods)
            .filter_map(|member| self.generate_for_member(owner, member))
            .collect();
        debug!(owner = %owner.name, count = specs.len(), "generated data-loader specs");
        specs
    }

    /// Record for an attribute
    pub fn generate_for_field(&self, owner: &TypeDescriptor, field: &FieldDescriptor) -> Option<DataLoaderSpec> {
        self.generate_for_member(owner, Member::Field(field))
    }

    /// Record for a method
    pub fn generate_for_method(&self, owner: &TypeDescriptor, method: &MethodDescriptor) -> Option<DataLoaderSpec> {
        self.generate_for_member(owner, Member::Method(method))
    }

    /// Record for a member; `None` when it does not qualify or fails
    pub fn generate_for_member(&self, owner: &TypeDescriptor, member: Member<'_>) -> Option<DataLoaderSpec> {
        if !self.should_generate_data_loader(owner, member) {
            return None;
        }
        let marker = member.markers().data_loader()?;

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

    /// Whether the member has an enabled data-loader marker and is a field
    /// of its owner
    pub fn should_generate_data_loader(&self, owner: &TypeDescriptor, member: Member<'_>) -> bool {
        let markers = member.markers();
        if markers.data_loader().is_none() || markers.ignored() || member.is_static() {
            return false;
        }
        if markers.field().is_some() {
            return true;
        }

        let owner_markers = &owner.markers;
        let field_bearing = owner_markers.object().is_some() || owner_markers.interface().is_some();
        match member {
            Member::Field(_) => field_bearing,
            Member::Method(method) => field_bearing && method.is_getter(),
        }
    }

    fn build_spec(
        &self,
        owner: &TypeDescriptor,
        member: Member<'_>,
        marker: &DataLoaderMarker,
    ) -> Result<DataLoaderSpec, GeneratorError> {
        let value = value_type(member.declared_type())?;
        let property = member.property_name();

        let key_property = non_blank(&marker.key_property)
            .map(str::to_string)
            .unwrap_or_else(|| infer_key_property(&property));
        let key_type = match non_blank(&marker.key_property) {
            Some(declared) => self.key_type(owner, declared),
            None => DEFAULT_KEY_TYPE.to_string(),
        };

        let explicit_service = non_blank(&marker.service_class);
        let explicit_method = non_blank(&marker.batch_load_method);
        let service = ServiceBinding {
            class_name: explicit_service
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}Service", value.simple_name())),
            method_name: explicit_method.unwrap_or(DEFAULT_BATCH_METHOD).to_string(),
            inferred: explicit_service.is_none() || explicit_method.is_none(),
        };

        Ok(DataLoaderSpec {
            owner: owner.name.clone(),
            member: member.name().to_string(),
            origin: member.origin(),
            name: non_blank(&marker.name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}DataLoader", property)),
            key_type,
            value_type: value.identity(),
            key_property,
            batch_size: marker.batch_size,
            caching_enabled: marker.caching_enabled,
            batching_enabled: marker.batching_enabled,
            batch_timeout_ms: marker.batch_timeout_ms,
            statistics_enabled: marker.statistics_enabled,
            cache_key_strategy: marker.cache_key_strategy,
            service,
        })
    }

    /// Declared type of the key property on the owner or its superclasses
    fn key_type(&self, owner: &TypeDescriptor, property: &str) -> String {
        let descriptors = self.types.descriptors();
        let found = std::iter::once(owner)
            .chain(descriptors.ancestors(owner))
            .find_map(|declaring| declaring.field(property));

        match found {
            Some(field) => field.ty.identity(),
            None => {
                debug!(owner = %owner.name, property, "key property not found; defaulting to {}", DEFAULT_KEY_TYPE);
                DEFAULT_KEY_TYPE.to_string()
            }
        }
    }
}

/// One level of sequence wrapping removed
fn value_type(declared: &TypeSignature) -> Result<&TypeSignature, GeneratorError> {
    if declared.kind == TypeKind::Void {
        return Err(GeneratorError::IncompatibleType {
            type_name: declared.to_string(),
            position: "a data-loader value type",
        });
    }
    if declared.is_sequence() {
        if let Some(element) = declared.element() {
            return Ok(element);
        }
    }
    Ok(declared)
}

/// Conventional key property for a relationship name
pub fn infer_key_property(member: &str) -> String {
    match member {
        "author" | "category" | "user" => format!("{}Id", member),
        plural if plural.len() > 1 && plural.ends_with('s') => {
            format!("{}Id", &plural[..plural.len() - 1])
        }
        other => format!("{}Id", other),
    }
}
