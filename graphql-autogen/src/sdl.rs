//! SDL export and schema validation
//!
//! The schema IR is converted into an `async_graphql` dynamic schema.
//! Building it runs the GraphQL type-system checks: every referenced type
//! exists, fields and arguments sit in output and input positions, and
//! objects implement their interfaces with compatible fields. The SDL is the
//! dynamic schema's own export, which lists types sorted by name. Directive
//! definitions declared by the IR follow it, also sorted by name.
//!
//! Only the schema shape is exported; the generated field resolvers return
//! nothing and are never executed.

use crate::error::GeneratorError;
use crate::ir::{
    Directive, DirectiveDefinition, EnumType, FieldDefinition, InputObjectType, InputValueDefinition,
    InterfaceType, ObjectType, ScalarType, Schema, TypeDefinition, TypeRef, UnionType, Value,
};
use async_graphql::dynamic::{
    self, Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField,
    Object, ResolverContext, Scalar, Subscription, SubscriptionField, SubscriptionFieldFuture, Type,
    Union,
};
use async_graphql::{Name, Number, SDLExportOptions, Value as GqlValue};
use tracing::debug;

/// Build and validate a dynamic schema from the IR
pub fn build_schema(schema: &Schema) -> Result<dynamic::Schema, GeneratorError> {
    let mut builder = dynamic::Schema::build(
        &schema.query.name,
        schema.mutation.as_ref().map(|m| m.name.as_str()),
        schema.subscription.as_ref().map(|s| s.name.as_str()),
    )
    .register(object(&schema.query)?);

    if let Some(mutation) = &schema.mutation {
        builder = builder.register(object(mutation)?);
    }
    if let Some(subscription) = &schema.subscription {
        builder = builder.register(subscription_root(subscription)?);
    }
    for definition in schema.types.values().filter(|t| !t.is_builtin()) {
        builder = builder.register(dynamic_type(definition)?);
    }

    let built = builder.finish()?;
    debug!(types = schema.types.len(), "validated schema");
    Ok(built)
}

/// Render a schema as SDL text, validating it first
pub fn print_schema(schema: &Schema) -> Result<String, GeneratorError> {
    let built = build_schema(schema)?;
    let mut sdl = built.sdl_with_options(SDLExportOptions::new().prefer_single_line_descriptions());

    let mut directives: Vec<&DirectiveDefinition> = schema.directives.iter().collect();
    directives.sort_by(|a, b| a.name.cmp(&b.name));
    for directive in directives {
        if !sdl.is_empty() && !sdl.ends_with("\n\n") {
            sdl.push('\n');
        }
        sdl.push_str(&print_directive_definition(directive));
    }
    Ok(sdl)
}

/// Convert one non-root definition
pub fn dynamic_type(definition: &TypeDefinition) -> Result<Type, GeneratorError> {
    Ok(match definition {
        TypeDefinition::Scalar(scalar) => scalar_type(scalar).into(),
        TypeDefinition::Enum(enumeration) => enum_type(enumeration).into(),
        TypeDefinition::Object(o) => object(o)?.into(),
        TypeDefinition::Interface(interface) => interface_type(interface)?.into(),
        TypeDefinition::Union(union) => union_type(union).into(),
        TypeDefinition::InputObject(input) => input_object(input)?.into(),
    })
}

/// Convert a type reference
pub fn type_ref(ty: &TypeRef) -> dynamic::TypeRef {
    match ty {
        TypeRef::Named(name) => dynamic::TypeRef::named(name.clone()),
        TypeRef::List(inner) => dynamic::TypeRef::List(Box::new(type_ref(inner))),
        TypeRef::NonNull(inner) => dynamic::TypeRef::NonNull(Box::new(type_ref(inner))),
    }
}

/// Convert a literal; non-finite floats have no GraphQL form
pub fn const_value(value: &Value) -> Result<GqlValue, GeneratorError> {
    Ok(match value {
        Value::Null => GqlValue::Null,
        Value::Int(i) => GqlValue::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f)
            .map(GqlValue::Number)
            .ok_or_else(|| GeneratorError::InvalidSchema(format!("{} is not a valid Float literal", f)))?,
        Value::String(s) => GqlValue::String(s.clone()),
        Value::Boolean(b) => GqlValue::Boolean(*b),
        Value::Enum(e) => GqlValue::Enum(Name::new(e)),
        Value::List(items) => GqlValue::List(items.iter().map(const_value).collect::<Result<_, _>>()?),
    })
}

/// Blank reasons deprecate without a reason argument
fn deprecation_reason(reason: &str) -> Option<&str> {
    Some(reason.trim()).filter(|r| !r.is_empty())
}

/// Resolver for every exported field: the schema is never executed
fn unresolved(_: ResolverContext<'_>) -> FieldFuture<'_> {
    FieldFuture::new(async { Ok(None::<GqlValue>) })
}

fn scalar_type(scalar: &ScalarType) -> Scalar {
    let mut out = Scalar::new(&scalar.name);
    if let Some(description) = &scalar.description {
        out = out.description(description);
    }
    out
}

fn enum_type(enumeration: &EnumType) -> Enum {
    let mut out = Enum::new(&enumeration.name);
    if let Some(description) = &enumeration.description {
        out = out.description(description);
    }
    for value in &enumeration.values {
        let mut item = EnumItem::new(&value.name);
        if let Some(description) = &value.description {
            item = item.description(description);
        }
        if let Some(reason) = &value.deprecation_reason {
            item = item.deprecation(deprecation_reason(reason));
        }
        out = out.item(item);
    }
    out
}

fn object(object: &ObjectType) -> Result<Object, GeneratorError> {
    let mut out = Object::new(&object.name);
    if let Some(description) = &object.description {
        out = out.description(description);
    }
    for interface in &object.interfaces {
        out = out.implement(interface);
    }
    for field in &object.fields {
        out = out.field(output_field(field)?);
    }
    Ok(out)
}

fn output_field(field: &FieldDefinition) -> Result<Field, GeneratorError> {
    let mut out = Field::new(&field.name, type_ref(&field.ty), unresolved);
    if let Some(description) = &field.description {
        out = out.description(description);
    }
    for argument in &field.arguments {
        out = out.argument(input_value(argument)?);
    }
    if let Some(reason) = &field.deprecation_reason {
        out = out.deprecation(deprecation_reason(reason));
    }
    for directive in &field.directives {
        out = out.directive(applied_directive(directive)?);
    }
    Ok(out)
}

fn interface_type(interface: &InterfaceType) -> Result<Interface, GeneratorError> {
    let mut out = Interface::new(&interface.name);
    if let Some(description) = &interface.description {
        out = out.description(description);
    }
    for field in &interface.fields {
        let mut member = InterfaceField::new(&field.name, type_ref(&field.ty));
        if let Some(description) = &field.description {
            member = member.description(description);
        }
        for argument in &field.arguments {
            member = member.argument(input_value(argument)?);
        }
        if let Some(reason) = &field.deprecation_reason {
            member = member.deprecation(deprecation_reason(reason));
        }
        out = out.field(member);
    }
    Ok(out)
}

fn union_type(union: &UnionType) -> Union {
    let mut out = Union::new(&union.name);
    if let Some(description) = &union.description {
        out = out.description(description);
    }
    for member in &union.members {
        out = out.possible_type(member);
    }
    out
}

fn input_object(input: &InputObjectType) -> Result<InputObject, GeneratorError> {
    let mut out = InputObject::new(&input.name);
    if let Some(description) = &input.description {
        out = out.description(description);
    }
    for field in &input.fields {
        out = out.field(input_value(field)?);
    }
    Ok(out)
}

fn input_value(value: &InputValueDefinition) -> Result<InputValue, GeneratorError> {
    let mut out = InputValue::new(&value.name, type_ref(&value.ty));
    if let Some(description) = &value.description {
        out = out.description(description);
    }
    if let Some(default) = &value.default_value {
        out = out.default_value(const_value(default)?);
    }
    Ok(out)
}

/// Subscription roots need stream resolvers; they yield nothing
fn subscription_root(root: &ObjectType) -> Result<Subscription, GeneratorError> {
    let mut out = Subscription::new(&root.name);
    if let Some(description) = &root.description {
        out = out.description(description);
    }
    for field in &root.fields {
        let mut member = SubscriptionField::new(&field.name, type_ref(&field.ty), |_| {
            SubscriptionFieldFuture::new(async {
                Ok(futures::stream::empty::<async_graphql::Result<GqlValue>>())
            })
        });
        if let Some(description) = &field.description {
            member = member.description(description);
        }
        for argument in &field.arguments {
            member = member.argument(input_value(argument)?);
        }
        if let Some(reason) = &field.deprecation_reason {
            member = member.deprecation(deprecation_reason(reason));
        }
        for directive in &field.directives {
            member = member.directive(applied_directive(directive)?);
        }
        out = out.field(member);
    }
    Ok(out)
}

fn applied_directive(directive: &Directive) -> Result<dynamic::Directive, GeneratorError> {
    let mut out = dynamic::Directive::new(&directive.name);
    for (name, value) in &directive.arguments {
        out = out.argument(name, const_value(value)?);
    }
    Ok(out)
}

/// Definition line for a directive declared by the IR
fn print_directive_definition(directive: &DirectiveDefinition) -> String {
    let mut out = String::new();
    if let Some(description) = directive.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        out.push_str(&format!("\"{}\"\n", crate::ir::escape_string(description)));
    }
    let arguments: Vec<String> = directive
        .arguments
        .iter()
        .map(|argument| match &argument.default_value {
            Some(default) => format!("{}: {} = {}", argument.name, argument.ty, default),
            None => format!("{}: {}", argument.name, argument.ty),
        })
        .collect();
    let arguments = if arguments.is_empty() {
        String::new()
    } else {
        format!("({})", arguments.join(", "))
    };
    out.push_str(&format!(
        "directive @{}{} on {}\n",
        directive.name,
        arguments,
        directive.locations.join(" | ")
    ));
    out
}
