//! Field resolution for object, interface and input types
//!
//! Turns the attributes and accessor methods of a declaration into field
//! definitions. Inclusion rules, in order:
//! - an ignore marker always excludes
//! - static members are always excluded
//! - field, input-field and identifier markers always include
//! - otherwise object, interface and input declarations include their
//!   non-synthetic attributes and getter-shaped methods
//!
//! A member that fails to resolve is reported and left out; the remaining
//! members of the type are unaffected.

use super::types::{ResolvedType, TypeResolver};
use crate::descriptor::{FieldDescriptor, Member, MethodDescriptor, TypeDescriptor};
use crate::docs::DocElement;
use crate::error::GeneratorError;
use crate::ir::{FieldDefinition, InputValueDefinition, Value};
use crate::markers::{Markers, non_blank};
use crate::scalar::{self, BuiltinScalar};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use tracing::debug;

/// Resolves the fields of one declaration at a time
pub struct FieldResolver<'a> {
    types: &'a TypeResolver<'a>,
    include_inherited: bool,
}

impl<'a> FieldResolver<'a> {
    /// Create a field resolver
    pub fn new(types: &'a TypeResolver<'a>, include_inherited: bool) -> Self {
        Self {
            types,
            include_inherited,
        }
    }

    /// Output fields of an object or interface declaration
    pub fn resolve_fields(&self, owner: &TypeDescriptor) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();
        for (name, declaring, member) in self.included_members(owner) {
            match self.resolve_output_field(name, declaring, member) {
                Ok(field) => fields.push(field),
                Err(e) => self.report(owner, member, &e),
            }
        }
        fields
    }

    /// Fields of an input declaration
    pub fn resolve_input_fields(&self, owner: &TypeDescriptor) -> Vec<InputValueDefinition> {
        let mut fields = Vec::new();
        for (name, declaring, member) in self.included_members(owner) {
            match self.resolve_input_field(name, declaring, member) {
                Ok(field) => fields.push(field),
                Err(e) => self.report(owner, member, &e),
            }
        }
        fields
    }

    /// Whether an attribute becomes a field of `owner`
    pub fn should_include_field(&self, owner: &TypeDescriptor, field: &FieldDescriptor) -> bool {
        let markers = &field.markers;
        if markers.ignored() || field.is_static {
            return false;
        }
        if has_field_intent(markers) {
            return true;
        }
        is_field_bearing(owner) && !field.synthetic
    }

    /// Whether a method becomes a field of `owner`
    pub fn should_include_method(&self, owner: &TypeDescriptor, method: &MethodDescriptor) -> bool {
        let markers = &method.markers;
        if markers.ignored() || method.is_static {
            return false;
        }
        if has_field_intent(markers) {
            return true;
        }
        is_field_bearing(owner) && !method.synthetic && method.is_getter()
    }

    /// Included members with their field names, own members first, then
    /// inherited ones; later members never replace an earlier name
    fn included_members<'d>(
        &'d self,
        owner: &'d TypeDescriptor,
    ) -> Vec<(String, &'d TypeDescriptor, Member<'d>)> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for declaring in self.declarations(owner) {
            for member in declaring.members() {
                let included = match member {
                    Member::Field(f) => self.should_include_field(owner, f),
                    Member::Method(m) => self.should_include_method(owner, m),
                };
                if !included {
                    continue;
                }

                let name = field_name(member);
                if !seen.insert(name.clone()) {
                    debug!(owner = %owner.name, member = member.name(), field = %name, "duplicate field name skipped");
                    continue;
                }
                members.push((name, declaring, member));
            }
        }
        members
    }

    /// Declarations contributing members to `owner`: the owner itself, then,
    /// when inherited fields are enabled, its supertypes
    pub fn declarations<'d>(&'d self, owner: &'d TypeDescriptor) -> Vec<&'d TypeDescriptor> {
        let mut declarations = vec![owner];
        if self.include_inherited {
            declarations.extend(self.supertypes(owner));
        }
        declarations
    }

    /// Superclass chain, nearest first, then every implemented interface
    fn supertypes<'d>(&'d self, owner: &'d TypeDescriptor) -> Vec<&'d TypeDescriptor> {
        let descriptors = self.types.descriptors();
        let mut found = descriptors.ancestors(owner);
        let mut seen: HashSet<&str> = found.iter().map(|d| d.name.as_str()).collect();
        seen.insert(owner.name.as_str());

        let mut queue: VecDeque<&str> = std::iter::once(owner)
            .chain(found.iter().copied())
            .flat_map(|d| d.interfaces.iter().map(String::as_str))
            .collect();
        while let Some(identity) = queue.pop_front() {
            let Some(interface) = descriptors.get(identity) else {
                continue;
            };
            if seen.insert(interface.name.as_str()) {
                queue.extend(interface.interfaces.iter().map(String::as_str));
                found.push(interface);
            }
        }
        found
    }

    fn resolve_output_field(
        &self,
        name: String,
        declaring: &TypeDescriptor,
        member: Member<'_>,
    ) -> Result<FieldDefinition, GeneratorError> {
        let markers = member.markers();
        let field_marker = markers.field();

        let ty = if markers.id().is_some() {
            // Identifiers are always ID!
            self.types.builtin(BuiltinScalar::Id).non_null()
        } else {
            let resolved = self.types.resolve(member.declared_type())?;
            if !resolved.definition().is_output() {
                return Err(GeneratorError::IncompatibleType {
                    type_name: resolved.name().to_string(),
                    position: "an output field type",
                });
            }
            match field_marker {
                Some(f) if !f.nullable => resolved.non_null(),
                _ => resolved,
            }
        };

        Ok(FieldDefinition {
            name,
            description: self.description(declaring, member),
            arguments: Vec::new(),
            ty: ty.to_type_ref(),
            deprecation_reason: field_marker
                .and_then(|f| non_blank(&f.deprecation_reason))
                .map(str::to_string),
            directives: Vec::new(),
        })
    }

    fn resolve_input_field(
        &self,
        name: String,
        declaring: &TypeDescriptor,
        member: Member<'_>,
    ) -> Result<InputValueDefinition, GeneratorError> {
        let markers = member.markers();
        let input_marker = markers.input_field();

        let resolved = if markers.id().is_some() {
            self.types.builtin(BuiltinScalar::Id).non_null()
        } else {
            let resolved = self.types.resolve(member.declared_type())?;
            if !resolved.definition().is_input() {
                return Err(GeneratorError::IncompatibleType {
                    type_name: resolved.name().to_string(),
                    position: "an input field type",
                });
            }
            let required = input_marker.is_some_and(|m| m.required)
                || markers.field().is_some_and(|f| !f.nullable);
            if required { resolved.non_null() } else { resolved }
        };

        let default_value = input_marker
            .and_then(|m| non_blank(&m.default_value))
            .map(|literal| self.default_value(declaring, member, &resolved, literal));

        Ok(InputValueDefinition {
            name,
            description: self.description(declaring, member),
            ty: resolved.to_type_ref(),
            default_value,
        })
    }

    /// Parse a default literal, degrading to the raw string on failure
    fn default_value(
        &self,
        declaring: &TypeDescriptor,
        member: Member<'_>,
        resolved: &Rc<ResolvedType>,
        literal: &str,
    ) -> Value {
        match scalar::parse_default(resolved.definition(), resolved.list_depth(), literal) {
            Ok(value) => value,
            Err(e) => {
                self.report(declaring, member, &e);
                Value::String(literal.to_string())
            }
        }
    }

    fn description(&self, declaring: &TypeDescriptor, member: Member<'_>) -> Option<String> {
        let markers = member.markers();
        let annotation = markers
            .field()
            .and_then(|f| f.description.as_deref())
            .or_else(|| markers.id().and_then(|i| i.description.as_deref()))
            .or_else(|| markers.input_field().and_then(|i| i.description.as_deref()))
            .or_else(|| markers.description());
        self.types.describe(
            annotation,
            DocElement::Member {
                owner: declaring,
                member,
            },
        )
    }

    fn report(&self, owner: &TypeDescriptor, member: Member<'_>, error: &GeneratorError) {
        self.types
            .diagnostics()
            .report(format!("{}.{}", owner.name, member.name()), error);
    }
}

fn has_field_intent(markers: &Markers) -> bool {
    markers.field().is_some() || markers.id().is_some() || markers.input_field().is_some()
}

fn is_field_bearing(owner: &TypeDescriptor) -> bool {
    let markers = &owner.markers;
    markers.object().is_some() || markers.interface().is_some() || markers.input().is_some()
}

/// Explicit name, else the getter-stripped property name, else the raw name
pub(crate) fn field_name(member: Member<'_>) -> String {
    let markers = member.markers();
    markers
        .field()
        .and_then(|f| non_blank(&f.name))
        .or_else(|| markers.id().and_then(|i| non_blank(&i.name)))
        .or_else(|| markers.input_field().and_then(|i| non_blank(&i.name)))
        .map(str::to_string)
        .unwrap_or_else(|| member.property_name())
}
