//! Root operation resolution
//!
//! Maps the marked methods of controller declarations to Query, Mutation and
//! Subscription fields. Arguments come from the method parameters, minus the
//! transport plumbing a framework injects (requests, responses, binding
//! results, ...).
//!
//! A failure while resolving one operation or one of its arguments drops that
//! operation and records a diagnostic; the controller's other operations are
//! unaffected.

use super::types::{ResolvedType, TypeResolver};
use crate::descriptor::{DescriptorSet, Member, MethodDescriptor, ParameterDescriptor, TypeDescriptor, TypeKind};
use crate::docs::DocElement;
use crate::error::GeneratorError;
use crate::ir::{Directive, DirectiveDefinition, FieldDefinition, InputValueDefinition, TypeRef, Value};
use crate::markers::{Markers, OperationMarker, non_blank};
use crate::naming::{capitalize, simple_name};
use crate::scalar::{self, BuiltinScalar};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Name of the authorization directive
pub const AUTH_DIRECTIVE: &str = "auth";

/// Parameter types supplied by the hosting framework
const PLUMBING_TYPES: &[&str] = &[
    "javax.servlet.http.HttpServletRequest",
    "javax.servlet.http.HttpServletResponse",
    "javax.servlet.ServletRequest",
    "javax.servlet.ServletResponse",
    "javax.servlet.http.HttpSession",
    "jakarta.servlet.http.HttpServletRequest",
    "jakarta.servlet.http.HttpServletResponse",
    "jakarta.servlet.ServletRequest",
    "jakarta.servlet.ServletResponse",
    "jakarta.servlet.http.HttpSession",
    "org.springframework.web.context.request.WebRequest",
    "org.springframework.web.context.request.NativeWebRequest",
    "org.springframework.web.server.ServerWebExchange",
    "org.springframework.http.server.reactive.ServerHttpRequest",
    "org.springframework.http.server.reactive.ServerHttpResponse",
    "org.springframework.validation.BindingResult",
    "org.springframework.validation.Errors",
    "org.springframework.ui.Model",
    "org.springframework.ui.ModelMap",
    "org.springframework.security.core.Authentication",
    "java.security.Principal",
    "java.util.Locale",
    "graphql.schema.DataFetchingEnvironment",
    "graphql.GraphQLContext",
];

/// Parameter names reserved for framework-injected values
const PLUMBING_NAMES: &[&str] = &["request", "response", "bindingResult", "dataFetchingEnvironment"];

/// Kind of root operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Field of the Query root
    Query,
    /// Field of the Mutation root
    Mutation,
    /// Field of the Subscription root
    Subscription,
}

impl OperationKind {
    /// Name of the root type the operation belongs to
    pub fn root_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }

    /// The enabled marker for this kind, if any
    pub fn marker<'m>(&self, markers: &'m Markers) -> Option<&'m OperationMarker> {
        match self {
            OperationKind::Query => markers.query(),
            OperationKind::Mutation => markers.mutation(),
            OperationKind::Subscription => markers.subscription(),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_name())
    }
}

/// A resolved root operation with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDefinition {
    /// Root the operation belongs to
    pub kind: OperationKind,
    /// The root field
    pub field: FieldDefinition,
    /// Identity of the controller declaration
    pub controller: String,
    /// Name of the originating method
    pub method: String,
}

/// Declaration of the `@auth` directive
pub fn auth_directive_definition() -> DirectiveDefinition {
    let string_list = TypeRef::named(BuiltinScalar::String.name()).non_null().list();
    DirectiveDefinition {
        name: AUTH_DIRECTIVE.to_string(),
        description: Some("Directive for authorization".to_string()),
        arguments: vec![
            InputValueDefinition::new("roles", string_list.clone()),
            InputValueDefinition::new("permissions", string_list),
        ],
        locations: vec!["FIELD_DEFINITION".to_string()],
    }
}

/// Resolves controller methods into root operations
pub struct OperationResolver<'a> {
    types: &'a TypeResolver<'a>,
}

impl<'a> OperationResolver<'a> {
    /// Create an operation resolver
    pub fn new(types: &'a TypeResolver<'a>) -> Self {
        Self { types }
    }

    /// Every enabled query of a controller
    pub fn resolve_queries(&self, controller: &TypeDescriptor) -> Vec<OperationDefinition> {
        self.resolve_all(controller, OperationKind::Query)
    }

    /// Every enabled mutation of a controller
    pub fn resolve_mutations(&self, controller: &TypeDescriptor) -> Vec<OperationDefinition> {
        self.resolve_all(controller, OperationKind::Mutation)
    }

    /// Every enabled subscription of a controller
    pub fn resolve_subscriptions(&self, controller: &TypeDescriptor) -> Vec<OperationDefinition> {
        self.resolve_all(controller, OperationKind::Subscription)
    }

    /// Resolve one method as a query; `None` when it is not one or fails
    pub fn resolve_query(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
    ) -> Option<OperationDefinition> {
        self.resolve_one(controller, method, OperationKind::Query)
    }

    /// Resolve one method as a mutation; `None` when it is not one or fails
    pub fn resolve_mutation(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
    ) -> Option<OperationDefinition> {
        self.resolve_one(controller, method, OperationKind::Mutation)
    }

    /// Resolve one method as a subscription; `None` when it is not one or fails
    pub fn resolve_subscription(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
    ) -> Option<OperationDefinition> {
        self.resolve_one(controller, method, OperationKind::Subscription)
    }

    /// Whether the method is an enabled query of a controller
    pub fn is_query_operation(&self, controller: &TypeDescriptor, method: &MethodDescriptor) -> bool {
        is_operation(controller, method, OperationKind::Query)
    }

    /// Whether the method is an enabled mutation of a controller
    pub fn is_mutation_operation(&self, controller: &TypeDescriptor, method: &MethodDescriptor) -> bool {
        is_operation(controller, method, OperationKind::Mutation)
    }

    /// Whether the method is an enabled subscription of a controller
    pub fn is_subscription_operation(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
    ) -> bool {
        is_operation(controller, method, OperationKind::Subscription)
    }

    fn resolve_all(&self, controller: &TypeDescriptor, kind: OperationKind) -> Vec<OperationDefinition> {
        controller
            .methods
            .iter()
            .filter_map(|method| self.resolve_one(controller, method, kind))
            .collect()
    }

    fn resolve_one(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
        kind: OperationKind,
    ) -> Option<OperationDefinition> {
        if !is_operation(controller, method, kind) {
            return None;
        }
        let marker = kind.marker(&method.markers)?;

        match self.resolve_field(controller, method, marker, kind) {
            Ok(field) => {
                debug!(kind = %kind, operation = %field.name, "resolved operation");
                Some(OperationDefinition {
                    kind,
                    field,
                    controller: controller.name.clone(),
                    method: method.name.clone(),
                })
            }
            Err(e) => {
                self.types
                    .diagnostics()
                    .report(format!("{}.{}", controller.name, method.name), &e);
                None
            }
        }
    }

    fn resolve_field(
        &self,
        controller: &TypeDescriptor,
        method: &MethodDescriptor,
        marker: &OperationMarker,
        kind: OperationKind,
    ) -> Result<FieldDefinition, GeneratorError> {
        let name = operation_name(controller, method, marker);
        let location = format!("{}.{}", controller.name, method.name);

        let mut ty = self.return_type(&location, method, marker, kind)?;
        if kind == OperationKind::Mutation && marker.batch {
            ty = ty.list();
        }

        let mut arguments = Vec::new();
        for parameter in &method.parameters {
            if is_plumbing_parameter(self.types.descriptors(), parameter) {
                debug!(operation = %name, parameter = %parameter.name, "skipped framework parameter");
                continue;
            }
            arguments.push(self.resolve_argument(&location, parameter)?);
        }

        let annotation = marker
            .description
            .as_deref()
            .or_else(|| method.markers.description());
        let description = self.types.describe(
            annotation,
            DocElement::Member {
                owner: controller,
                member: Member::Method(method),
            },
        );

        Ok(FieldDefinition {
            name,
            description,
            arguments,
            ty: ty.to_type_ref(),
            deprecation_reason: non_blank(&marker.deprecation_reason).map(str::to_string),
            directives: auth_directive(controller, method, marker).into_iter().collect(),
        })
    }

    fn return_type(
        &self,
        location: &str,
        method: &MethodDescriptor,
        marker: &OperationMarker,
        kind: OperationKind,
    ) -> Result<Rc<ResolvedType>, GeneratorError> {
        if kind == OperationKind::Mutation {
            if let Some(payload) = &marker.payload_type {
                return self.output_type(self.types.resolve(payload)?);
            }
        }

        let declared = &method.return_type;
        match declared.kind {
            // Operations must return something; void becomes a success flag
            TypeKind::Void => Ok(self.types.builtin(BuiltinScalar::Boolean)),
            TypeKind::Stream => match declared.element() {
                Some(element) => self.output_type(self.types.resolve(element)?),
                None => {
                    self.types.diagnostics().warn(
                        location,
                        format!("cannot unwrap element type of {}; using String", declared),
                    );
                    Ok(self.types.builtin(BuiltinScalar::String))
                }
            },
            _ => self.output_type(self.types.resolve(declared)?),
        }
    }

    fn output_type(&self, resolved: Rc<ResolvedType>) -> Result<Rc<ResolvedType>, GeneratorError> {
        if resolved.definition().is_output() {
            Ok(resolved)
        } else {
            Err(GeneratorError::IncompatibleType {
                type_name: resolved.name().to_string(),
                position: "an operation result",
            })
        }
    }

    fn resolve_argument(
        &self,
        location: &str,
        parameter: &ParameterDescriptor,
    ) -> Result<InputValueDefinition, GeneratorError> {
        let markers = &parameter.markers;
        let argument = markers.argument();
        let filter = markers.subscription_filter();

        let name = argument
            .and_then(|a| non_blank(&a.name))
            .or_else(|| filter.and_then(|f| non_blank(&f.name)))
            .unwrap_or(parameter.name.as_str())
            .to_string();

        let resolved = self.types.resolve(&parameter.ty)?;
        if !resolved.definition().is_input() {
            return Err(GeneratorError::IncompatibleType {
                type_name: resolved.name().to_string(),
                position: "an argument type",
            });
        }

        // Primitive parameters cannot be absent, so they default to required
        let required = argument
            .and_then(|a| a.required)
            .or_else(|| filter.map(|f| !f.optional))
            .unwrap_or(parameter.ty.kind == TypeKind::Primitive);
        let ty = if required { resolved.non_null() } else { Rc::clone(&resolved) };

        let default_value = argument.and_then(|a| non_blank(&a.default_value)).map(|literal| {
            match scalar::parse_default(resolved.definition(), resolved.list_depth(), literal) {
                Ok(value) => value,
                Err(e) => {
                    warn!(location, argument = %name, "keeping unparsable default as a string");
                    self.types
                        .diagnostics()
                        .report(format!("{}({})", location, name), &e);
                    Value::String(literal.to_string())
                }
            }
        });

        let description = argument
            .and_then(|a| non_blank(&a.description))
            .or_else(|| filter.and_then(|f| non_blank(&f.description)))
            .map(str::to_string);

        Ok(InputValueDefinition {
            name,
            description,
            ty: ty.to_type_ref(),
            default_value,
        })
    }
}

/// Whether a parameter is framework plumbing rather than a client argument
///
/// Types declared in the descriptor set are never plumbing. Unqualified type
/// names fall back to a simple-name match against the plumbing table.
pub fn is_plumbing_parameter(descriptors: &DescriptorSet, parameter: &ParameterDescriptor) -> bool {
    // Explicitly marked parameters are always arguments
    if parameter.markers.argument().is_some() || parameter.markers.subscription_filter().is_some() {
        return false;
    }
    let ty = parameter.ty.name.as_str();
    if descriptors.get(ty).is_some() {
        return false;
    }
    let plumbing_type = if ty.contains('.') {
        PLUMBING_TYPES.contains(&ty)
    } else {
        PLUMBING_TYPES.iter().any(|t| simple_name(t) == ty)
    };
    plumbing_type || PLUMBING_NAMES.contains(&parameter.name.as_str())
}

fn is_operation(controller: &TypeDescriptor, method: &MethodDescriptor, kind: OperationKind) -> bool {
    controller.markers.controller().is_some()
        && !method.is_static
        && !method.markers.ignored()
        && kind.marker(&method.markers).is_some()
}

/// Explicit name, else controller prefix plus the capitalized method name,
/// else the method name
fn operation_name(controller: &TypeDescriptor, method: &MethodDescriptor, marker: &OperationMarker) -> String {
    if let Some(name) = non_blank(&marker.name) {
        return name.to_string();
    }
    match controller.markers.controller().and_then(|c| non_blank(&c.prefix)) {
        Some(prefix) => format!("{}{}", prefix, capitalize(&method.name)),
        None => method.name.clone(),
    }
}

/// `@auth` from the operation marker and any method or controller
/// authorization markers
fn auth_directive(
    controller: &TypeDescriptor,
    method: &MethodDescriptor,
    marker: &OperationMarker,
) -> Option<Directive> {
    let mut roles: Vec<String> = Vec::new();
    let mut permissions: Vec<String> = Vec::new();

    let authorizations = [method.markers.authorize(), controller.markers.authorize()];
    let role_sources =
        std::iter::once(&marker.roles).chain(authorizations.into_iter().flatten().map(|a| &a.roles));
    for role in role_sources.flatten() {
        if !roles.contains(role) {
            roles.push(role.clone());
        }
    }
    let permission_sources = std::iter::once(&marker.permissions)
        .chain(authorizations.into_iter().flatten().map(|a| &a.permissions));
    for permission in permission_sources.flatten() {
        if !permissions.contains(permission) {
            permissions.push(permission.clone());
        }
    }

    if roles.is_empty() && permissions.is_empty() {
        return None;
    }

    let as_list = |items: Vec<String>| Value::List(items.into_iter().map(Value::String).collect());
    let mut arguments = Vec::new();
    if !roles.is_empty() {
        arguments.push(("roles".to_string(), as_list(roles)));
    }
    if !permissions.is_empty() {
        arguments.push(("permissions".to_string(), as_list(permissions)));
    }
    Some(Directive {
        name: AUTH_DIRECTIVE.to_string(),
        arguments,
    })
}
