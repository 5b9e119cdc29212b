//! Intermediate Representation (IR) of a compiled GraphQL schema
//!
//! These types are the schema-side output of the resolvers. Type references
//! inside definitions are by name, the way SDL refers to types, so a
//! compiled [`Schema`] owns plain data and can be merged, compared and
//! printed independently of the resolvers that produced it.

use crate::scalar::{BuiltinScalar, Representation};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Reference to a named type with list and non-null wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    /// `T`
    Named(String),
    /// `[T]`
    List(Box<TypeRef>),
    /// `T!`
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Reference a named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Wrap in a list
    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Wrap in non-null; already non-null references are returned unchanged
    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    /// Outermost wrapper is non-null
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// A constant GraphQL value, used for defaults and directive arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// `null`
    Null,
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// Enum value literal
    Enum(String),
    /// List literal
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => {
                // Keep a decimal point so the literal stays a Float
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Enum(e) => f.write_str(e),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Escape a string for a single-line GraphQL string literal
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// A directive applied to a definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    /// Directive name without `@`
    pub name: String,
    /// Arguments in declaration order
    pub arguments: Vec<(String, Value)>,
}

/// A directive declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveDefinition {
    /// Directive name without `@`
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Accepted arguments
    pub arguments: Vec<InputValueDefinition>,
    /// Locations (`FIELD_DEFINITION`, ...)
    pub locations: Vec<String>,
}

/// An argument or input object field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValueDefinition {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Type
    pub ty: TypeRef,
    /// Default value
    pub default_value: Option<Value>,
}

impl InputValueDefinition {
    /// Create an undocumented input value without a default
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// An output field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Arguments
    pub arguments: Vec<InputValueDefinition>,
    /// Type
    pub ty: TypeRef,
    /// Deprecation reason, when deprecated
    pub deprecation_reason: Option<String>,
    /// Applied directives other than `@deprecated`
    pub directives: Vec<Directive>,
}

impl FieldDefinition {
    /// Create an undocumented field without arguments
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            ty,
            deprecation_reason: None,
            directives: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Find an argument by name
    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// An enum value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueDefinition {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Deprecation reason, when deprecated
    pub deprecation_reason: Option<String>,
}

/// A scalar type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Underlying value representation
    pub representation: Representation,
    /// Set for the five GraphQL built-in scalars
    pub builtin: Option<BuiltinScalar>,
}

/// An enum type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Values in declaration order
    pub values: Vec<EnumValueDefinition>,
}

/// An object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Implemented interface names
    pub interfaces: Vec<String>,
    /// Fields
    pub fields: Vec<FieldDefinition>,
}

impl ObjectType {
    /// Create an empty object type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An interface type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Fields
    pub fields: Vec<FieldDefinition>,
}

/// A union type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Member object type names
    pub members: Vec<String>,
}

/// An input object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputObjectType {
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Fields
    pub fields: Vec<InputValueDefinition>,
}

/// Any named type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDefinition {
    /// Scalar
    Scalar(ScalarType),
    /// Enum
    Enum(EnumType),
    /// Object
    Object(ObjectType),
    /// Interface
    Interface(InterfaceType),
    /// Union
    Union(UnionType),
    /// Input object
    InputObject(InputObjectType),
}

impl TypeDefinition {
    /// Type name
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(t) => &t.name,
            TypeDefinition::Enum(t) => &t.name,
            TypeDefinition::Object(t) => &t.name,
            TypeDefinition::Interface(t) => &t.name,
            TypeDefinition::Union(t) => &t.name,
            TypeDefinition::InputObject(t) => &t.name,
        }
    }

    /// Type description
    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDefinition::Scalar(t) => t.description.as_deref(),
            TypeDefinition::Enum(t) => t.description.as_deref(),
            TypeDefinition::Object(t) => t.description.as_deref(),
            TypeDefinition::Interface(t) => t.description.as_deref(),
            TypeDefinition::Union(t) => t.description.as_deref(),
            TypeDefinition::InputObject(t) => t.description.as_deref(),
        }
    }

    /// Built-in scalars are never printed
    pub fn is_builtin(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(s) if s.builtin.is_some())
    }

    /// Valid as an argument or input field type
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)
        )
    }

    /// Valid as an output field type
    pub fn is_output(&self) -> bool {
        !matches!(self, TypeDefinition::InputObject(_))
    }
}

/// A compiled schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Query root, always present
    pub query: ObjectType,
    /// Mutation root, when any mutation exists
    pub mutation: Option<ObjectType>,
    /// Subscription root, when any subscription exists
    pub subscription: Option<ObjectType>,
    /// Directive declarations
    pub directives: Vec<DirectiveDefinition>,
    /// Every other named type, built-in scalars excluded
    pub types: IndexMap<String, TypeDefinition>,
}

impl Schema {
    /// Look up a named type
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Root operation types present in this schema
    pub fn roots(&self) -> impl Iterator<Item = &ObjectType> {
        std::iter::once(&self.query)
            .chain(self.mutation.as_ref())
            .chain(self.subscription.as_ref())
    }

    /// Type references that name no defined type
    ///
    /// Returns `(location, missing type name)` pairs.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        let mut check = |location: String, ty: &TypeRef| {
            let name = ty.base_name();
            if BuiltinScalar::from_name(name).is_none()
                && !self.types.contains_key(name)
                && !self.roots().any(|root| root.name == name)
            {
                missing.push((location, name.to_string()));
            }
        };

        let objects = self.roots().chain(self.types.values().filter_map(|t| match t {
            TypeDefinition::Object(o) => Some(o),
            _ => None,
        }));
        for object in objects {
            for field in &object.fields {
                check(format!("{}.{}", object.name, field.name), &field.ty);
                for arg in &field.arguments {
                    check(format!("{}.{}({})", object.name, field.name, arg.name), &arg.ty);
                }
            }
        }

        for definition in self.types.values() {
            match definition {
                TypeDefinition::Interface(i) => {
                    for field in &i.fields {
                        check(format!("{}.{}", i.name, field.name), &field.ty);
                    }
                }
                TypeDefinition::InputObject(i) => {
                    for field in &i.fields {
                        check(format!("{}.{}", i.name, field.name), &field.ty);
                    }
                }
                _ => {}
            }
        }

        missing
    }
}
