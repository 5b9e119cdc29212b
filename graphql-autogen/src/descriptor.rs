//! Descriptor model
//!
//! Language-neutral, read-only description of scanned program elements:
//! types, fields, methods, parameters and enum values, each with attached
//! intent markers. Descriptors are produced by a scanner and consumed by
//! every resolver; nothing in the compiler mutates them.
//!
//! Two shapes describe types:
//! - [`TypeDescriptor`] is a declaration (a class, interface or enum) with
//!   its members and markers
//! - [`TypeSignature`] is a type as written at a use site (a field type, a
//!   parameter type, a return type), possibly parameterized

use crate::error::GeneratorError;
use crate::markers::{Marker, Markers};
use crate::naming;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Structural kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Language primitive (`int`, `boolean`, ...)
    Primitive,
    /// Class, record or struct
    #[default]
    Class,
    /// Interface or trait
    Interface,
    /// Enumeration
    Enum,
    /// Fixed array; the element is the single type argument
    Array,
    /// Collection (`List<T>`, `Set<T>`, ...)
    Collection,
    /// Optional or nullable wrapper
    Optional,
    /// Async or reactive stream wrapper (`Flux<T>`, `Future<T>`, ...)
    Stream,
    /// No value
    Void,
}

/// A type as written at a use site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSignature {
    /// Raw type name, fully qualified when the scanner knows it
    pub name: String,
    /// Structural kind
    #[serde(default)]
    pub kind: TypeKind,
    /// Type arguments; the element type for arrays
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeSignature>,
}

impl TypeSignature {
    /// Create a signature without type arguments
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            arguments: Vec::new(),
        }
    }

    /// A class-kind signature
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// A primitive signature
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    /// An enum-kind signature
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    /// The `void` signature
    pub fn void() -> Self {
        Self::new("void", TypeKind::Void)
    }

    /// `List<element>`
    pub fn list_of(element: TypeSignature) -> Self {
        Self::new("java.util.List", TypeKind::Collection).with_argument(element)
    }

    /// `Optional<element>`
    pub fn optional_of(element: TypeSignature) -> Self {
        Self::new("java.util.Optional", TypeKind::Optional).with_argument(element)
    }

    /// `element[]`
    pub fn array_of(element: TypeSignature) -> Self {
        let name = format!("{}[]", element.name);
        Self::new(name, TypeKind::Array).with_argument(element)
    }

    /// A stream wrapper named `name` around `element`
    pub fn stream_of(name: impl Into<String>, element: TypeSignature) -> Self {
        Self::new(name, TypeKind::Stream).with_argument(element)
    }

    /// Append a type argument
    pub fn with_argument(mut self, argument: TypeSignature) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Unqualified name
    pub fn simple_name(&self) -> &str {
        naming::simple_name(&self.name)
    }

    /// The single type argument, if there is exactly one
    pub fn element(&self) -> Option<&TypeSignature> {
        match self.arguments.as_slice() {
            [element] => Some(element),
            _ => None,
        }
    }

    /// Array or collection kind
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, TypeKind::Array | TypeKind::Collection)
    }

    /// Boolean-compatible (`boolean`, `Boolean`, `bool`)
    pub fn is_boolean(&self) -> bool {
        matches!(self.simple_name(), "boolean" | "Boolean" | "bool")
    }

    /// Cache identity: the name with type arguments rendered in
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TypeKind::Array {
            if let Some(element) = self.element() {
                return write!(f, "{}[]", element);
            }
        }

        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A declared attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Attribute name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeSignature,
    /// Intent markers
    #[serde(default)]
    pub markers: Markers,
    /// Class-level member
    #[serde(default)]
    pub is_static: bool,
    /// Compiler-generated member
    #[serde(default)]
    pub synthetic: bool,
    /// Raw documentation comment
    #[serde(default)]
    pub doc: Option<String>,
}

impl FieldDescriptor {
    /// Create an unmarked field
    pub fn new(name: impl Into<String>, ty: TypeSignature) -> Self {
        Self {
            name: name.into(),
            ty,
            markers: Markers::default(),
            is_static: false,
            synthetic: false,
            doc: None,
        }
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Attach a raw documentation comment
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeSignature,
    /// Intent markers
    #[serde(default)]
    pub markers: Markers,
}

impl ParameterDescriptor {
    /// Create an unmarked parameter
    pub fn new(name: impl Into<String>, ty: TypeSignature) -> Self {
        Self {
            name: name.into(),
            ty,
            markers: Markers::default(),
        }
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Ordered parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type
    #[serde(default = "TypeSignature::void")]
    pub return_type: TypeSignature,
    /// Intent markers
    #[serde(default)]
    pub markers: Markers,
    /// Class-level member
    #[serde(default)]
    pub is_static: bool,
    /// Compiler-generated member
    #[serde(default)]
    pub synthetic: bool,
    /// Raw documentation comment
    #[serde(default)]
    pub doc: Option<String>,
}

impl MethodDescriptor {
    /// Create an unmarked, parameterless method
    pub fn new(name: impl Into<String>, return_type: TypeSignature) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            markers: Markers::default(),
            is_static: false,
            synthetic: false,
            doc: None,
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Attach a raw documentation comment
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Zero-argument, non-void `getX`, or `isX` returning a boolean
    pub fn is_getter(&self) -> bool {
        if !self.parameters.is_empty() || self.return_type.kind == TypeKind::Void {
            return false;
        }
        match naming::getter_parts(&self.name) {
            Some((naming::GetterPrefix::Get, _)) => true,
            Some((naming::GetterPrefix::Is, _)) => self.return_type.is_boolean(),
            None => false,
        }
    }
}

/// A declared enum constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    /// Constant name
    pub name: String,
    /// Intent markers
    #[serde(default)]
    pub markers: Markers,
    /// Raw documentation comment
    #[serde(default)]
    pub doc: Option<String>,
}

impl EnumValueDescriptor {
    /// Create an unmarked enum value
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Markers::default(),
            doc: None,
        }
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// A declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified name, the descriptor's identity
    pub name: String,
    /// Structural kind
    #[serde(default)]
    pub kind: TypeKind,
    /// Intent markers
    #[serde(default)]
    pub markers: Markers,
    /// Declared attributes
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Declared enum constants
    #[serde(default)]
    pub enum_values: Vec<EnumValueDescriptor>,
    /// Identities of directly implemented interfaces
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Identity of the direct superclass
    #[serde(default)]
    pub superclass: Option<String>,
    /// Abstract declaration
    #[serde(default)]
    pub is_abstract: bool,
    /// Raw documentation comment
    #[serde(default)]
    pub doc: Option<String>,
    /// Source text of the declaring artifact
    #[serde(default)]
    pub source: Option<String>,
}

impl TypeDescriptor {
    /// Create an unmarked declaration
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            markers: Markers::default(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_values: Vec::new(),
            interfaces: Vec::new(),
            superclass: None,
            is_abstract: false,
            doc: None,
            source: None,
        }
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Append an attribute
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a method
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Append an enum constant
    pub fn with_enum_value(mut self, value: EnumValueDescriptor) -> Self {
        self.enum_values.push(value);
        self
    }

    /// Declare an implemented interface
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declare the superclass
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Attach a raw documentation comment
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Attach the declaring source text
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Unqualified name
    pub fn simple_name(&self) -> &str {
        naming::simple_name(&self.name)
    }

    /// Namespace of the declaration
    pub fn package(&self) -> &str {
        naming::package_of(&self.name)
    }

    /// Use-site signature referring to this declaration
    pub fn signature(&self) -> TypeSignature {
        TypeSignature::new(self.name.clone(), self.kind)
    }

    /// Look up a declared attribute by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Attributes followed by methods
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.fields
            .iter()
            .map(Member::Field)
            .chain(self.methods.iter().map(Member::Method))
    }
}

/// Where a member comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberOrigin {
    /// Declared attribute
    Attribute,
    /// Accessor method
    Accessor,
}

/// A field-like member: an attribute or a method
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// Declared attribute
    Field(&'a FieldDescriptor),
    /// Declared method
    Method(&'a MethodDescriptor),
}

impl<'a> Member<'a> {
    /// Raw member name
    pub fn name(&self) -> &'a str {
        match self {
            Member::Field(f) => &f.name,
            Member::Method(m) => &m.name,
        }
    }

    /// Property name: getter prefix stripped for methods
    pub fn property_name(&self) -> String {
        match self {
            Member::Field(f) => f.name.clone(),
            Member::Method(m) => naming::property_name(&m.name),
        }
    }

    /// Attribute or accessor
    pub fn origin(&self) -> MemberOrigin {
        match self {
            Member::Field(_) => MemberOrigin::Attribute,
            Member::Method(_) => MemberOrigin::Accessor,
        }
    }

    /// Declared type, the return type for methods
    pub fn declared_type(&self) -> &'a TypeSignature {
        match self {
            Member::Field(f) => &f.ty,
            Member::Method(m) => &m.return_type,
        }
    }

    /// Intent markers
    pub fn markers(&self) -> &'a Markers {
        match self {
            Member::Field(f) => &f.markers,
            Member::Method(m) => &m.markers,
        }
    }

    /// Class-level member
    pub fn is_static(&self) -> bool {
        match self {
            Member::Field(f) => f.is_static,
            Member::Method(m) => m.is_static,
        }
    }

    /// Compiler-generated member
    pub fn synthetic(&self) -> bool {
        match self {
            Member::Field(f) => f.synthetic,
            Member::Method(m) => m.synthetic,
        }
    }

    /// Raw documentation comment
    pub fn doc(&self) -> Option<&'a str> {
        match self {
            Member::Field(f) => f.doc.as_deref(),
            Member::Method(m) => m.doc.as_deref(),
        }
    }
}

/// Serialized form of a descriptor set
#[derive(Debug, Default, Serialize, Deserialize)]
struct DescriptorDocument {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// The scanner's output: every declaration known to one compilation
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    types: IndexMap<String, TypeDescriptor>,
    simple_names: HashMap<String, Vec<String>>,
}

impl DescriptorSet {
    /// Build a set from declarations, keeping scan order
    pub fn new(types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut set = Self::default();
        for descriptor in types {
            set.insert(descriptor);
        }
        set
    }

    /// Parse a JSON descriptor document (`{"types": [...]}`)
    pub fn from_json(json: &str) -> Result<Self, GeneratorError> {
        let document: DescriptorDocument = serde_json::from_str(json)?;
        Ok(Self::new(document.types))
    }

    /// Render the set as a JSON descriptor document
    pub fn to_json(&self) -> Result<String, GeneratorError> {
        let document = DescriptorDocument {
            types: self.types.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Add or replace a declaration
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        let simple = descriptor.simple_name().to_string();
        let identity = descriptor.name.clone();
        let owners = self.simple_names.entry(simple).or_default();
        if !owners.contains(&identity) {
            owners.push(identity.clone());
        }
        self.types.insert(identity, descriptor);
    }

    /// Add every declaration of another set
    pub fn extend(&mut self, other: DescriptorSet) {
        for (_, descriptor) in other.types {
            self.insert(descriptor);
        }
    }

    /// Look up a declaration by identity, falling back to a unique simple name
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        if let Some(descriptor) = self.types.get(name) {
            return Some(descriptor);
        }
        match self.simple_names.get(naming::simple_name(name)).map(Vec::as_slice) {
            Some([only]) => self.types.get(only),
            _ => None,
        }
    }

    /// Declarations in scan order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the set has no declarations
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Superclass chain of a declaration, nearest first
    ///
    /// Stops at the first superclass missing from the set and never visits a
    /// declaration twice.
    pub fn ancestors<'a>(&'a self, descriptor: &'a TypeDescriptor) -> Vec<&'a TypeDescriptor> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(descriptor.name.as_str());

        let mut current = descriptor;
        while let Some(parent) = current.superclass.as_deref().and_then(|s| self.get(s)) {
            if !seen.insert(parent.name.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::TypeMarker;

    #[test]
    fn test_signature_identity() {
        let book = TypeSignature::class("com.example.Book");
        assert_eq!(book.identity(), "com.example.Book");

        let list = TypeSignature::list_of(book.clone());
        assert_eq!(list.identity(), "java.util.List<com.example.Book>");

        let array = TypeSignature::array_of(book);
        assert_eq!(array.identity(), "com.example.Book[]");
    }

    #[test]
    fn test_is_getter() {
        let getter = MethodDescriptor::new("getTitle", TypeSignature::class("String"));
        assert!(getter.is_getter());

        let bool_getter = MethodDescriptor::new("isAvailable", TypeSignature::primitive("boolean"));
        assert!(bool_getter.is_getter());

        let not_bool = MethodDescriptor::new("isbn", TypeSignature::class("String"));
        assert!(!not_bool.is_getter());

        let is_string = MethodDescriptor::new("isTitle", TypeSignature::class("String"));
        assert!(!is_string.is_getter());

        let void = MethodDescriptor::new("getNothing", TypeSignature::void());
        assert!(!void.is_getter());

        let with_args = MethodDescriptor::new("getTitle", TypeSignature::class("String"))
            .with_parameter(ParameterDescriptor::new("locale", TypeSignature::class("String")));
        assert!(!with_args.is_getter());
    }

    #[test]
    fn test_descriptor_set_lookup() {
        let set = DescriptorSet::new(vec![
            TypeDescriptor::new("com.example.Book", TypeKind::Class),
            TypeDescriptor::new("com.example.a.Author", TypeKind::Class),
            TypeDescriptor::new("com.example.b.Author", TypeKind::Class),
        ]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("Book").unwrap().name, "com.example.Book");
        assert!(set.get("com.example.a.Author").is_some());
        // Ambiguous simple names do not resolve
        assert!(set.get("Author").is_none());
    }

    #[test]
    fn test_ancestors_stop_on_cycles() {
        let set = DescriptorSet::new(vec![
            TypeDescriptor::new("A", TypeKind::Class).with_superclass("B"),
            TypeDescriptor::new("B", TypeKind::Class).with_superclass("C"),
            TypeDescriptor::new("C", TypeKind::Class).with_superclass("A"),
        ]);

        let a = set.get("A").unwrap();
        let names: Vec<_> = set.ancestors(a).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_json_document() {
        let json = r#"{
            "types": [{
                "name": "com.example.Book",
                "markers": [{"marker": "object"}],
                "fields": [{"name": "title", "type": {"name": "java.lang.String"}}]
            }]
        }"#;
        let set = DescriptorSet::from_json(json).unwrap();
        let book = set.get("com.example.Book").unwrap();

        assert_eq!(book.kind, TypeKind::Class);
        assert_eq!(book.markers.object(), Some(&TypeMarker::default()));
        assert_eq!(book.fields[0].ty.kind, TypeKind::Class);

        let round = DescriptorSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(round.get("Book"), set.get("Book"));
    }

    #[test]
    fn test_malformed_document() {
        let err = DescriptorSet::from_json("{\"types\": 3}").unwrap_err();
        assert!(matches!(err, GeneratorError::Parse(_)));
    }
}
