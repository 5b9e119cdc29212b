//! Type resolution
//!
//! Maps use-site [`TypeSignature`]s to schema types. The resolver owns the
//! scalar tables, the custom scalar registry and the resolution cache; every
//! other resolver reaches schema types through it.
//!
//! Resolution order, first match wins:
//! 1. built-in scalar table
//! 2. custom scalar registry and scalar-marked declarations
//! 3. identifier intent on the declaration
//! 4. arrays (list of the element)
//! 5. marked enums
//! 6. raw collections (list of `String`)
//! 7. optionals (the inner type, nullability unchanged)
//! 8. interfaces
//! 9. unions
//! 10. objects
//! 11. inputs
//!
//! Parameterized collections and optionals resolve their actual type
//! argument before any rule on the raw container applies.
//!
//! Rules 1 and 2 match fully-qualified or primitive names. A simple name such
//! as `Long` only reaches the scalar tables when it is not a declaration in
//! the descriptor set, so domain types never turn into scalars by name.

use crate::descriptor::{DescriptorSet, TypeDescriptor, TypeKind, TypeSignature};
use crate::diagnostics::Diagnostics;
use crate::docs::{self, DocElement};
use crate::error::GeneratorError;
use crate::ir::{
    EnumType, EnumValueDefinition, InputObjectType, InterfaceType, ObjectType, ScalarType,
    TypeDefinition, TypeRef, UnionType,
};
use crate::markers::non_blank;
use crate::naming::NamingStrategy;
use crate::scalar::{self, BuiltinScalar, Representation};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::debug;

/// A resolved schema type with its wrappers
///
/// Named nodes are shared: resolving the same identity twice through one
/// resolver yields the same `Rc`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    /// A named type
    Named(Rc<TypeDefinition>),
    /// `[T]`
    List(Rc<ResolvedType>),
    /// `T!`
    NonNull(Rc<ResolvedType>),
}

impl ResolvedType {
    /// Innermost named definition
    pub fn definition(&self) -> &Rc<TypeDefinition> {
        match self {
            ResolvedType::Named(definition) => definition,
            ResolvedType::List(inner) | ResolvedType::NonNull(inner) => inner.definition(),
        }
    }

    /// Innermost type name
    pub fn name(&self) -> &str {
        self.definition().name()
    }

    /// Number of list wrappers
    pub fn list_depth(&self) -> usize {
        match self {
            ResolvedType::Named(_) => 0,
            ResolvedType::List(inner) => 1 + inner.list_depth(),
            ResolvedType::NonNull(inner) => inner.list_depth(),
        }
    }

    /// Outermost wrapper is non-null
    pub fn is_non_null(&self) -> bool {
        matches!(self, ResolvedType::NonNull(_))
    }

    /// Wrap in non-null; already non-null types are returned unchanged
    pub fn non_null(self: &Rc<Self>) -> Rc<Self> {
        if self.is_non_null() {
            Rc::clone(self)
        } else {
            Rc::new(ResolvedType::NonNull(Rc::clone(self)))
        }
    }

    /// Wrap in a list
    pub fn list(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(ResolvedType::List(Rc::clone(self)))
    }

    /// Name-based reference for schema definitions
    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            ResolvedType::Named(definition) => TypeRef::named(definition.name()),
            ResolvedType::List(inner) => inner.to_type_ref().list(),
            ResolvedType::NonNull(inner) => inner.to_type_ref().non_null(),
        }
    }
}

/// A named type created by the resolver, with the declaration it came from
#[derive(Debug, Clone)]
pub struct ResolvedDefinition {
    /// Identity of the originating declaration; `None` for scalars
    pub descriptor: Option<String>,
    /// The definition as created (object-like types have no fields yet)
    pub definition: Rc<TypeDefinition>,
}

/// Resolves type signatures for one compilation run
///
/// Not designed for concurrent use; create one resolver per run or shard.
pub struct TypeResolver<'a> {
    descriptors: &'a DescriptorSet,
    diagnostics: &'a Diagnostics,
    naming: NamingStrategy,
    include_docs: bool,
    builtins: HashMap<BuiltinScalar, Rc<ResolvedType>>,
    mappings: RefCell<BTreeMap<String, String>>,
    scalars: RefCell<HashMap<String, Rc<TypeDefinition>>>,
    cache: RefCell<HashMap<String, Rc<ResolvedType>>>,
    owners: RefCell<HashMap<String, String>>,
    registry: RefCell<Vec<ResolvedDefinition>>,
    resolving: RefCell<HashSet<String>>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver seeded with the default custom scalar mappings
    pub fn new(
        descriptors: &'a DescriptorSet,
        diagnostics: &'a Diagnostics,
        naming: NamingStrategy,
    ) -> Self {
        let builtins = BuiltinScalar::ALL
            .into_iter()
            .map(|s| {
                let node = ResolvedType::Named(Rc::new(TypeDefinition::Scalar(s.definition())));
                (s, Rc::new(node))
            })
            .collect();

        let resolver = Self {
            descriptors,
            diagnostics,
            naming,
            include_docs: true,
            builtins,
            mappings: RefCell::new(BTreeMap::new()),
            scalars: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
            owners: RefCell::new(HashMap::new()),
            registry: RefCell::new(Vec::new()),
            resolving: RefCell::new(HashSet::new()),
        };
        for (identity, scalar_name) in scalar::default_mappings() {
            resolver.register_mapping(identity, scalar_name);
        }
        resolver
    }

    /// Enable or disable documentation lookup in the description chain
    pub fn with_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    /// The descriptor set being compiled
    pub fn descriptors(&self) -> &'a DescriptorSet {
        self.descriptors
    }

    /// The recovered-issue collector for this run
    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    /// Configured naming strategy
    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    /// Resolve a description through the fallback chain
    pub fn describe(&self, annotation: Option<&str>, element: DocElement<'_>) -> Option<String> {
        docs::describe_opt(annotation, element, self.include_docs)
    }

    /// Shared node for a built-in scalar
    pub fn builtin(&self, scalar: BuiltinScalar) -> Rc<ResolvedType> {
        match self.builtins.get(&scalar) {
            Some(node) => Rc::clone(node),
            None => Rc::new(ResolvedType::Named(Rc::new(TypeDefinition::Scalar(
                scalar.definition(),
            )))),
        }
    }

    /// Map a type identity to a custom scalar for the rest of this run
    ///
    /// Signatures already resolved keep their cached result.
    pub fn register_mapping(&self, identity: impl Into<String>, scalar_name: impl Into<String>) {
        let identity = identity.into();
        let scalar_name = scalar_name.into();
        debug!(identity = %identity, scalar = %scalar_name, "registered custom scalar mapping");
        self.mappings.borrow_mut().insert(identity, scalar_name);
    }

    /// Every named type created so far, in creation order
    pub fn definitions(&self) -> Vec<ResolvedDefinition> {
        self.registry.borrow().clone()
    }

    /// Number of named types created so far
    pub fn definition_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Resolve a declaration
    pub fn resolve_descriptor(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Rc<ResolvedType>, GeneratorError> {
        self.resolve(&descriptor.signature())
    }

    /// Resolve a signature, returning the cached node on repeated calls
    pub fn resolve(&self, signature: &TypeSignature) -> Result<Rc<ResolvedType>, GeneratorError> {
        let key = self.cache_key(signature);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Ok(Rc::clone(hit));
        }

        if !self.resolving.borrow_mut().insert(key.clone()) {
            return Err(GeneratorError::CyclicType(key));
        }
        let result = self.resolve_uncached(signature);
        self.resolving.borrow_mut().remove(&key);

        let resolved = result?;
        self.cache.borrow_mut().insert(key, Rc::clone(&resolved));
        Ok(resolved)
    }

    /// Whether [`resolve`](Self::resolve) has a rule for the signature
    ///
    /// Has no side effects: nothing is cached or registered.
    pub fn can_resolve(&self, signature: &TypeSignature) -> bool {
        if self.cache.borrow().contains_key(&self.cache_key(signature)) {
            return true;
        }

        if let Some(element) = signature.element() {
            match signature.kind {
                TypeKind::Array | TypeKind::Collection | TypeKind::Optional => {
                    return self.can_resolve(element);
                }
                _ => {}
            }
        }

        if self.builtin_for(&signature.name).is_some() || self.mapping_for(&signature.name).is_some() {
            return true;
        }

        if matches!(signature.kind, TypeKind::Collection | TypeKind::Optional) {
            return true;
        }

        match self.descriptors.get(&signature.name) {
            Some(descriptor) => {
                let markers = &descriptor.markers;
                markers.scalar().is_some()
                    || has_id_intent(descriptor)
                    || (is_enum(signature, descriptor) && markers.enumeration().is_some())
                    || markers.interface().is_some()
                    || markers.union().is_some()
                    || markers.object().is_some()
                    || markers.input().is_some()
            }
            None => false,
        }
    }

    /// Canonical cache identity: declarations are keyed by their full name
    fn cache_key(&self, signature: &TypeSignature) -> String {
        if signature.arguments.is_empty() {
            return match self.descriptors.get(&signature.name) {
                Some(descriptor) => descriptor.name.clone(),
                None => signature.name.clone(),
            };
        }

        let arguments: Vec<String> = signature.arguments.iter().map(|a| self.cache_key(a)).collect();
        match signature.kind {
            TypeKind::Array => format!("{}[]", arguments.join(", ")),
            _ => format!("{}<{}>", signature.name, arguments.join(", ")),
        }
    }

    /// Built-in scalar by qualified or primitive name; simple names only
    /// match identities that are not scanned declarations
    fn builtin_for(&self, identity: &str) -> Option<BuiltinScalar> {
        scalar::builtin_for(identity).or_else(|| {
            if self.descriptors.get(identity).is_some() {
                None
            } else {
                scalar::builtin_for_simple_name(identity)
            }
        })
    }

    /// Registered custom scalar, with the same simple-name rule as built-ins
    fn mapping_for(&self, identity: &str) -> Option<String> {
        let mappings = self.mappings.borrow();
        if let Some(scalar_name) = mappings.get(identity) {
            return Some(scalar_name.clone());
        }
        if self.descriptors.get(identity).is_some() {
            return None;
        }

        let simple = crate::naming::simple_name(identity);
        mappings.get(simple).cloned().or_else(|| {
            // Short names also match registered fully-qualified identities
            mappings
                .iter()
                .find(|(k, _)| crate::naming::simple_name(k) == simple)
                .map(|(_, v)| v.clone())
        })
    }

    fn resolve_uncached(&self, signature: &TypeSignature) -> Result<Rc<ResolvedType>, GeneratorError> {
        // Parameterized containers resolve their actual argument first
        if let Some(element) = signature.element() {
            match signature.kind {
                TypeKind::Array | TypeKind::Collection => {
                    return Ok(self.resolve(element)?.list());
                }
                TypeKind::Optional => return self.resolve(element),
                _ => {}
            }
        }

        // Rule 1: built-in scalars
        if let Some(builtin) = self.builtin_for(&signature.name) {
            return Ok(self.builtin(builtin));
        }

        // Rule 2: custom scalar registry
        if let Some(scalar_name) = self.mapping_for(&signature.name) {
            return self.custom_scalar(&scalar_name, &signature.name, None);
        }

        let descriptor = self.descriptors.get(&signature.name);

        if let Some(descriptor) = descriptor {
            if let Some(marker) = descriptor.markers.scalar() {
                let name = non_blank(&marker.name)
                    .map(str::to_string)
                    .unwrap_or_else(|| descriptor.simple_name().to_string());
                let description = self.describe(marker.description.as_deref(), DocElement::Type(descriptor));
                return self.custom_scalar(&name, &descriptor.name, description);
            }

            // Rule 3: identifier intent
            if has_id_intent(descriptor) {
                return Ok(self.builtin(BuiltinScalar::Id));
            }
        }

        // Rule 4: arrays without an element cannot be resolved
        if signature.kind == TypeKind::Array {
            return Err(GeneratorError::UnresolvableType(format!(
                "{} (array without element type)",
                signature
            )));
        }

        // Rule 5: marked enums
        if let Some(descriptor) = descriptor {
            if is_enum(signature, descriptor) {
                if let Some(marker) = descriptor.markers.enumeration() {
                    return self.build_enum(descriptor, marker.name.as_ref(), marker.description.as_deref());
                }
            }
        }

        // Rule 6: raw collections
        if signature.kind == TypeKind::Collection {
            debug!(signature = %signature, "raw collection resolved as [String]");
            return Ok(self.builtin(BuiltinScalar::String).list());
        }

        // Rule 7: raw optionals have no inner type to unwrap
        if signature.kind == TypeKind::Optional {
            debug!(signature = %signature, "raw optional resolved as String");
            return Ok(self.builtin(BuiltinScalar::String));
        }

        let Some(descriptor) = descriptor else {
            return Err(GeneratorError::UnresolvableType(signature.identity()));
        };
        let markers = &descriptor.markers;

        // Rule 8: interfaces
        if let Some(marker) = markers.interface() {
            let name = self.type_name(descriptor, marker.name.as_ref());
            let description = self.describe(marker.description.as_deref(), DocElement::Type(descriptor));
            return self.register(descriptor, TypeDefinition::Interface(InterfaceType {
                name,
                description,
                fields: Vec::new(),
            }));
        }

        // Rule 9: unions
        if let Some(marker) = markers.union() {
            let name = self.type_name(descriptor, marker.name.as_ref());
            let description = self.describe(marker.description.as_deref(), DocElement::Type(descriptor));
            let members = self.union_members(&name, &marker.members)?;
            return self.register(descriptor, TypeDefinition::Union(UnionType {
                name,
                description,
                members,
            }));
        }

        // Rule 10: objects
        if let Some(marker) = markers.object() {
            let name = self.type_name(descriptor, marker.name.as_ref());
            let description = self.describe(marker.description.as_deref(), DocElement::Type(descriptor));
            let interfaces = self.discover_interfaces(descriptor)?;
            return self.register(descriptor, TypeDefinition::Object(ObjectType {
                name,
                description,
                interfaces,
                fields: Vec::new(),
            }));
        }

        // Rule 11: inputs
        if let Some(marker) = markers.input() {
            let name = match non_blank(&marker.name) {
                Some(explicit) => explicit.to_string(),
                None => format!("{}Input", self.naming.apply(descriptor.simple_name())),
            };
            let description = self.describe(marker.description.as_deref(), DocElement::Type(descriptor));
            return self.register(descriptor, TypeDefinition::InputObject(InputObjectType {
                name,
                description,
                fields: Vec::new(),
            }));
        }

        // Rule 12: nothing applies
        Err(GeneratorError::UnresolvableType(signature.identity()))
    }

    /// Explicit name, else the simple name under the naming strategy
    fn type_name(&self, descriptor: &TypeDescriptor, explicit: Option<&String>) -> String {
        match explicit.map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => self.naming.apply(descriptor.simple_name()),
        }
    }

    fn build_enum(
        &self,
        descriptor: &TypeDescriptor,
        explicit_name: Option<&String>,
        description: Option<&str>,
    ) -> Result<Rc<ResolvedType>, GeneratorError> {
        let name = self.type_name(descriptor, explicit_name);
        let description = self.describe(description, DocElement::Type(descriptor));

        let values = descriptor
            .enum_values
            .iter()
            // Ignored values never reach the schema
            .filter(|v| !v.markers.ignored())
            .map(|value| {
                let marker = value.markers.enum_value();
                let name = marker
                    .and_then(|m| non_blank(&m.name))
                    .unwrap_or(value.name.as_str())
                    .to_string();
                let annotation = marker
                    .and_then(|m| m.description.as_deref())
                    .or_else(|| value.markers.description());
                EnumValueDefinition {
                    name,
                    description: self.describe(annotation, DocElement::EnumValue { owner: descriptor, value }),
                    deprecation_reason: marker
                        .and_then(|m| non_blank(&m.deprecation_reason))
                        .map(str::to_string),
                }
            })
            .collect();

        self.register(descriptor, TypeDefinition::Enum(EnumType {
            name,
            description,
            values,
        }))
    }

    fn union_members(&self, union: &str, identities: &[String]) -> Result<Vec<String>, GeneratorError> {
        let mut members = Vec::new();
        for identity in identities {
            match self.descriptors.get(identity) {
                Some(member) if member.markers.object().is_some() => {
                    let resolved = self.resolve_descriptor(member)?;
                    let name = resolved.name().to_string();
                    if !members.contains(&name) {
                        members.push(name);
                    }
                }
                _ => {
                    let err = GeneratorError::UnionMemberNotAnnotated {
                        union: union.to_string(),
                        member: identity.clone(),
                    };
                    self.diagnostics.report(union, &err);
                }
            }
        }
        Ok(members)
    }

    /// Interface-marked types among the declared interfaces and the
    /// superclass chain, transitively
    fn discover_interfaces(&self, descriptor: &TypeDescriptor) -> Result<Vec<String>, GeneratorError> {
        let mut queue: VecDeque<&str> = descriptor.interfaces.iter().map(String::as_str).collect();
        queue.extend(descriptor.superclass.as_deref());
        let mut visited = HashSet::new();
        visited.insert(descriptor.name.as_str());

        let mut names = Vec::new();
        while let Some(identity) = queue.pop_front() {
            let Some(parent) = self.descriptors.get(identity) else {
                debug!(identity, "supertype not in descriptor set");
                continue;
            };
            if !visited.insert(parent.name.as_str()) {
                continue;
            }

            if parent.markers.interface().is_some() {
                let resolved = self.resolve_descriptor(parent)?;
                let name = resolved.name().to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }

            queue.extend(parent.interfaces.iter().map(String::as_str));
            queue.extend(parent.superclass.as_deref());
        }
        Ok(names)
    }

    /// Shared custom scalar node, one per scalar name
    fn custom_scalar(
        &self,
        scalar_name: &str,
        identity: &str,
        description: Option<String>,
    ) -> Result<Rc<ResolvedType>, GeneratorError> {
        // Mapping onto a built-in name reuses the built-in scalar
        if let Some(builtin) = BuiltinScalar::from_name(scalar_name) {
            return Ok(self.builtin(builtin));
        }

        if let Some(existing) = self.scalars.borrow().get(scalar_name) {
            return Ok(Rc::new(ResolvedType::Named(Rc::clone(existing))));
        }

        self.claim(scalar_name, &format!("scalar {}", scalar_name))?;
        let definition = Rc::new(TypeDefinition::Scalar(ScalarType {
            name: scalar_name.to_string(),
            description: description.or_else(|| Some(scalar::custom_scalar_description(identity))),
            representation: Representation::infer(identity),
            builtin: None,
        }));
        self.scalars
            .borrow_mut()
            .insert(scalar_name.to_string(), Rc::clone(&definition));
        self.registry.borrow_mut().push(ResolvedDefinition {
            descriptor: None,
            definition: Rc::clone(&definition),
        });
        debug!(scalar = scalar_name, identity, "created custom scalar");
        Ok(Rc::new(ResolvedType::Named(definition)))
    }

    /// Record a named definition, enforcing name uniqueness
    fn register(
        &self,
        descriptor: &TypeDescriptor,
        definition: TypeDefinition,
    ) -> Result<Rc<ResolvedType>, GeneratorError> {
        self.claim(definition.name(), &descriptor.name)?;
        debug!(name = definition.name(), identity = %descriptor.name, "resolved type");

        let definition = Rc::new(definition);
        self.registry.borrow_mut().push(ResolvedDefinition {
            descriptor: Some(descriptor.name.clone()),
            definition: Rc::clone(&definition),
        });
        Ok(Rc::new(ResolvedType::Named(definition)))
    }

    fn claim(&self, name: &str, identity: &str) -> Result<(), GeneratorError> {
        let mut owners = self.owners.borrow_mut();
        match owners.get(name) {
            Some(existing) if existing != identity => Err(GeneratorError::NamingCollision {
                name: name.to_string(),
                existing: existing.clone(),
                incoming: identity.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                owners.insert(name.to_string(), identity.to_string());
                Ok(())
            }
        }
    }
}

fn is_enum(signature: &TypeSignature, descriptor: &TypeDescriptor) -> bool {
    signature.kind == TypeKind::Enum || descriptor.kind == TypeKind::Enum
}

/// Identifier intent: the declaration itself is marked as an identifier, or
/// it is an unmarked value type whose attributes carry the identifier marker
fn has_id_intent(descriptor: &TypeDescriptor) -> bool {
    if descriptor.markers.id().is_some() {
        return true;
    }
    !descriptor.markers.has_type_intent() && descriptor.fields.iter().any(|f| f.markers.id().is_some())
}
