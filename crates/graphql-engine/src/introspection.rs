//! Synthesis of the `__schema` and `__type` query fields by reflecting on
//! the schema.
//!
//! A per-request [`TypeRegistry`] is built by a depth-first walk from the
//! query and mutation roots; types are deduplicated by name and the
//! original schema is never touched. Each meta object is then emitted
//! against the request's selection set, so fragments with `__Type`-style
//! conditions work through the ordinary collector.

use std::sync::Arc;

use indexmap::IndexMap;

use graphql_ast::common::{Name, Type, TypeName};
use graphql_ast::executable::SelectionSet;
use graphql_ast::mk_name;
use graphql_ast::value::ConstValue;

use crate::execute::arguments::substitute;
use crate::execute::collect::{collect_fields, CollectedField};
use crate::execute::error::{ArgumentError, Error, Result, ValidationError};
use crate::execute::ExecutionContext;
use crate::schema::{
    AbstractType, EnumType, EnumValueDef, Field, InputObjectType, InputType, InputValueDef,
    ObjectType, OutputType, Schema,
};

enum RegistryEntry<Ctx> {
    Scalar {
        name: TypeName,
        description: Option<String>,
    },
    Enum(Arc<EnumType>),
    Object(Arc<ObjectType<Ctx>>),
    Abstract(Arc<AbstractType<Ctx>>),
    InputObject(Arc<InputObjectType>),
}

impl<Ctx> RegistryEntry<Ctx> {
    fn name(&self) -> &TypeName {
        match self {
            RegistryEntry::Scalar { name, .. } => name,
            RegistryEntry::Enum(enum_type) => &enum_type.name,
            RegistryEntry::Object(object) => &object.name,
            RegistryEntry::Abstract(abstract_type) => &abstract_type.name,
            RegistryEntry::InputObject(input_object) => &input_object.name,
        }
    }
}

/// Every named type reachable from the schema roots, deduplicated by name.
struct TypeRegistry<Ctx> {
    types: IndexMap<TypeName, RegistryEntry<Ctx>>,
}

impl<Ctx> TypeRegistry<Ctx> {
    fn collect(schema: &Schema<Ctx>) -> Self {
        let mut registry = TypeRegistry {
            types: IndexMap::new(),
        };
        registry.visit_object(&schema.query);
        if let Some(mutation) = &schema.mutation {
            registry.visit_object(mutation);
        }
        registry
    }

    fn get(&self, name: &TypeName) -> Option<&RegistryEntry<Ctx>> {
        self.types.get(name)
    }

    fn visit_object(&mut self, object: &Arc<ObjectType<Ctx>>) {
        if self.types.contains_key(&object.name) {
            return;
        }
        self.types
            .insert(object.name.clone(), RegistryEntry::Object(object.clone()));
        self.visit_fields(object.fields());
    }

    fn visit_fields(&mut self, fields: &[Field<Ctx>]) {
        for field in fields {
            for argument in &field.arguments {
                self.visit_input(&argument.field_type);
            }
            self.visit_output(&field.field_type);
        }
    }

    fn visit_output(&mut self, ty: &OutputType<Ctx>) {
        match ty {
            OutputType::Nullable(inner) => self.visit_output(inner),
            OutputType::List(element) => self.visit_output(element),
            OutputType::Scalar(scalar) => {
                self.types
                    .entry(scalar.name.clone())
                    .or_insert_with(|| RegistryEntry::Scalar {
                        name: scalar.name.clone(),
                        description: scalar.description.clone(),
                    });
            }
            OutputType::Enum(enum_type) => {
                self.types
                    .entry(enum_type.name.clone())
                    .or_insert_with(|| RegistryEntry::Enum(enum_type.clone()));
            }
            OutputType::Object(object) => self.visit_object(object),
            OutputType::Abstract(abstract_type) => self.visit_abstract(abstract_type),
        }
    }

    fn visit_abstract(&mut self, abstract_type: &Arc<AbstractType<Ctx>>) {
        if self.types.contains_key(&abstract_type.name) {
            return;
        }
        self.types.insert(
            abstract_type.name.clone(),
            RegistryEntry::Abstract(abstract_type.clone()),
        );
        if let Some(fields) = abstract_type.interface_fields() {
            self.visit_fields(fields);
        }
        for member in abstract_type.members() {
            self.visit_object(&member);
        }
    }

    fn visit_input(&mut self, ty: &InputType) {
        match ty {
            InputType::Nullable(inner) => self.visit_input(inner),
            InputType::List(element) => self.visit_input(element),
            InputType::Scalar(scalar) => {
                self.types
                    .entry(scalar.name.clone())
                    .or_insert_with(|| RegistryEntry::Scalar {
                        name: scalar.name.clone(),
                        description: scalar.description.clone(),
                    });
            }
            InputType::Enum(enum_type) => {
                self.types
                    .entry(enum_type.name.clone())
                    .or_insert_with(|| RegistryEntry::Enum(enum_type.clone()));
            }
            InputType::InputObject(input_object) => {
                if self.types.contains_key(&input_object.name) {
                    return;
                }
                self.types.insert(
                    input_object.name.clone(),
                    RegistryEntry::InputObject(input_object.clone()),
                );
                for field in &input_object.fields {
                    self.visit_input(&field.field_type);
                }
            }
        }
    }
}

/// Resolve a `__schema` selection on the query root.
pub(crate) fn resolve_schema_field<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    field: &CollectedField<'e>,
) -> Result<ConstValue> {
    let registry = TypeRegistry::collect(ectx.schema);
    let selection_set = require_selections(field.selection_set)?;
    meta_object(ectx, "__Schema", selection_set, |meta_field| {
        match meta_field.name.as_str() {
            "types" => {
                let mut entries: Vec<&RegistryEntry<Ctx>> = registry.types.values().collect();
                entries.sort_by(|a, b| a.name().cmp(b.name()));
                let types = entries
                    .iter()
                    .map(|entry| named_type(ectx, &registry, entry, meta_field.selection_set))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ConstValue::List(types))
            }
            "queryType" => {
                registry_type(ectx, &registry, &ectx.schema.query.name, meta_field)
            }
            "mutationType" => match &ectx.schema.mutation {
                Some(mutation) => registry_type(ectx, &registry, &mutation.name, meta_field),
                None => Ok(ConstValue::Null),
            },
            "subscriptionType" => Ok(ConstValue::Null),
            "directives" => Ok(ConstValue::List(vec![])),
            _ => Ok(ConstValue::Null),
        }
    })
}

/// Resolve a `__type(name:)` selection on the query root.
pub(crate) fn resolve_type_field<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    field: &CollectedField<'e>,
) -> Result<ConstValue> {
    let string_non_null = Type::named_non_null(TypeName(mk_name!("String")));
    let argument = field
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == "name")
        .ok_or_else(|| ArgumentError::NotFound {
            field_name: mk_name!("__type"),
            argument_name: mk_name!("name"),
            argument_type: string_non_null.clone(),
        })?;
    let value = substitute(ectx, &argument.value)?;
    let Some(requested) = value.as_str() else {
        return Err(ArgumentError::CoercionFailed {
            field_name: mk_name!("__type"),
            argument_name: mk_name!("name"),
            argument_type: string_non_null,
            message: format!("found {}", value.kind()),
        }
        .into());
    };

    let registry = TypeRegistry::collect(ectx.schema);
    let entry = Name::new(requested)
        .ok()
        .and_then(|name| registry.get(&TypeName(name)));
    match entry {
        Some(entry) => named_type(ectx, &registry, entry, field.selection_set),
        None => Ok(ConstValue::Null),
    }
}

fn require_selections(selections: Option<&SelectionSet>) -> Result<&SelectionSet> {
    selections.ok_or_else(|| {
        ValidationError::MissingSelectionSet {
            type_name: TypeName(mk_name!("__Type")),
        }
        .into()
    })
}

/// Emit a meta object by walking the request's selection set for it.
fn meta_object<'e, Ctx, F>(
    ectx: &ExecutionContext<'e, Ctx>,
    meta_type: &str,
    selection_set: &'e SelectionSet,
    resolve: F,
) -> Result<ConstValue>
where
    F: Fn(&CollectedField<'e>) -> Result<ConstValue>,
{
    let type_name = TypeName(Name::new(meta_type).expect("introspection type names are valid"));
    let fields = collect_fields(&ectx.fragments, &type_name, &[], selection_set)?;
    let mut object = IndexMap::new();
    for field in &fields {
        let value = if field.name.as_str() == "__typename" {
            ConstValue::String(meta_type.to_string())
        } else {
            resolve(field)?
        };
        object.insert(field.response_key.clone(), value);
    }
    Ok(ConstValue::Object(object))
}

fn registry_type<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    type_name: &TypeName,
    meta_field: &CollectedField<'e>,
) -> Result<ConstValue> {
    let entry = registry
        .get(type_name)
        .ok_or_else(|| Error::resolve(format!("type not reachable from the roots: {type_name}")))?;
    named_type(ectx, registry, entry, meta_field.selection_set)
}

fn opt_string(value: Option<&str>) -> ConstValue {
    match value {
        Some(s) => ConstValue::String(s.to_string()),
        None => ConstValue::Null,
    }
}

/// Emit a `__Type` object for a named type.
fn named_type<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    entry: &RegistryEntry<Ctx>,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    let selection_set = require_selections(selections)?;
    match entry {
        RegistryEntry::Scalar { name, description } => {
            meta_object(ectx, "__Type", selection_set, |field| {
                match field.name.as_str() {
                    "kind" => Ok(ConstValue::from("SCALAR")),
                    "name" => Ok(ConstValue::String(name.to_string())),
                    "description" => Ok(opt_string(description.as_deref())),
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        RegistryEntry::Enum(enum_type) => {
            meta_object(ectx, "__Type", selection_set, |field| {
                match field.name.as_str() {
                    "kind" => Ok(ConstValue::from("ENUM")),
                    "name" => Ok(ConstValue::String(enum_type.name.to_string())),
                    "description" => Ok(opt_string(enum_type.description.as_deref())),
                    "enumValues" => {
                        let include_deprecated =
                            bool_argument(ectx, field, "includeDeprecated", false)?;
                        let mut values: Vec<&EnumValueDef> = enum_type
                            .values
                            .iter()
                            .filter(|value| {
                                !value.deprecation_status.is_deprecated() || include_deprecated
                            })
                            .collect();
                        values.sort_by(|a, b| a.value.cmp(&b.value));
                        let values = values
                            .iter()
                            .map(|value| enum_value_meta(ectx, value, field.selection_set))
                            .collect::<Result<Vec<_>>>()?;
                        Ok(ConstValue::List(values))
                    }
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        RegistryEntry::Object(object) => {
            meta_object(ectx, "__Type", selection_set, |field| {
                match field.name.as_str() {
                    "kind" => Ok(ConstValue::from("OBJECT")),
                    "name" => Ok(ConstValue::String(object.name.to_string())),
                    "description" => Ok(opt_string(object.description.as_deref())),
                    "fields" => fields_meta(ectx, registry, object.fields(), field),
                    "interfaces" => {
                        let mut interfaces: Vec<TypeName> = object
                            .abstract_names()
                            .into_iter()
                            .filter(|name| {
                                matches!(
                                    registry.get(name),
                                    Some(RegistryEntry::Abstract(a)) if a.is_interface()
                                )
                            })
                            .collect();
                        interfaces.sort();
                        let interfaces = interfaces
                            .iter()
                            .map(|name| registry_type(ectx, registry, name, field))
                            .collect::<Result<Vec<_>>>()?;
                        Ok(ConstValue::List(interfaces))
                    }
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        RegistryEntry::Abstract(abstract_type) => {
            meta_object(ectx, "__Type", selection_set, |field| {
                match field.name.as_str() {
                    "kind" => Ok(ConstValue::from(if abstract_type.is_interface() {
                        "INTERFACE"
                    } else {
                        "UNION"
                    })),
                    "name" => Ok(ConstValue::String(abstract_type.name.to_string())),
                    "description" => Ok(opt_string(abstract_type.description.as_deref())),
                    "fields" => match abstract_type.interface_fields() {
                        Some(fields) => fields_meta(ectx, registry, fields, field),
                        None => Ok(ConstValue::Null),
                    },
                    "interfaces" => {
                        if abstract_type.is_interface() {
                            Ok(ConstValue::List(vec![]))
                        } else {
                            Ok(ConstValue::Null)
                        }
                    }
                    "possibleTypes" => {
                        let mut members: Vec<TypeName> = abstract_type
                            .members()
                            .iter()
                            .map(|member| member.name.clone())
                            .collect();
                        members.sort();
                        let members = members
                            .iter()
                            .map(|name| registry_type(ectx, registry, name, field))
                            .collect::<Result<Vec<_>>>()?;
                        Ok(ConstValue::List(members))
                    }
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        RegistryEntry::InputObject(input_object) => {
            meta_object(ectx, "__Type", selection_set, |field| {
                match field.name.as_str() {
                    "kind" => Ok(ConstValue::from("INPUT_OBJECT")),
                    "name" => Ok(ConstValue::String(input_object.name.to_string())),
                    "description" => Ok(opt_string(input_object.description.as_deref())),
                    "inputFields" => {
                        let include_deprecated =
                            bool_argument(ectx, field, "includeDeprecated", false)?;
                        input_values_meta(
                            ectx,
                            registry,
                            &input_object.fields,
                            include_deprecated,
                            field.selection_set,
                        )
                    }
                    _ => Ok(ConstValue::Null),
                }
            })
        }
    }
}

/// Emit the `fields(includeDeprecated:)` list of an object or interface,
/// sorted by field name.
fn fields_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    fields: &[Field<Ctx>],
    meta_field: &CollectedField<'e>,
) -> Result<ConstValue> {
    let include_deprecated = bool_argument(ectx, meta_field, "includeDeprecated", false)?;
    let mut allowed: Vec<&Field<Ctx>> = fields
        .iter()
        .filter(|field| !field.deprecation_status.is_deprecated() || include_deprecated)
        .collect();
    allowed.sort_by(|a, b| a.name.cmp(&b.name));
    let fields = allowed
        .iter()
        .map(|field| field_meta(ectx, registry, field, meta_field.selection_set))
        .collect::<Result<Vec<_>>>()?;
    Ok(ConstValue::List(fields))
}

fn field_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    field: &Field<Ctx>,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    let selection_set = require_selections(selections)?;
    meta_object(ectx, "__Field", selection_set, |meta_field| {
        match meta_field.name.as_str() {
            "name" => Ok(ConstValue::String(field.name.to_string())),
            "description" => Ok(opt_string(field.description.as_deref())),
            "args" => {
                let include_deprecated =
                    bool_argument(ectx, meta_field, "includeDeprecated", false)?;
                input_values_meta(
                    ectx,
                    registry,
                    &field.arguments,
                    include_deprecated,
                    meta_field.selection_set,
                )
            }
            "type" => output_type_meta(ectx, registry, &field.field_type, meta_field.selection_set),
            "isDeprecated" => Ok(ConstValue::Boolean(
                field.deprecation_status.is_deprecated(),
            )),
            "deprecationReason" => Ok(opt_string(field.deprecation_status.reason())),
            _ => Ok(ConstValue::Null),
        }
    })
}

/// Emit a list of `__InputValue` objects, sorted by name.
fn input_values_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    values: &[InputValueDef],
    include_deprecated: bool,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    let mut allowed: Vec<&InputValueDef> = values
        .iter()
        .filter(|value| !value.deprecation_status.is_deprecated() || include_deprecated)
        .collect();
    allowed.sort_by(|a, b| a.name.cmp(&b.name));
    let values = allowed
        .iter()
        .map(|value| input_value_meta(ectx, registry, value, selections))
        .collect::<Result<Vec<_>>>()?;
    Ok(ConstValue::List(values))
}

fn input_value_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    value: &InputValueDef,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    let selection_set = require_selections(selections)?;
    meta_object(ectx, "__InputValue", selection_set, |meta_field| {
        match meta_field.name.as_str() {
            "name" => Ok(ConstValue::String(value.name.to_string())),
            "description" => Ok(opt_string(value.description.as_deref())),
            "type" => input_type_meta(ectx, registry, &value.field_type, meta_field.selection_set),
            // TODO: render defaultValue as a GraphQL literal once a value
            // printer exists
            "isDeprecated" => Ok(ConstValue::Boolean(
                value.deprecation_status.is_deprecated(),
            )),
            "deprecationReason" => Ok(opt_string(value.deprecation_status.reason())),
            _ => Ok(ConstValue::Null),
        }
    })
}

fn enum_value_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    value: &EnumValueDef,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    let selection_set = require_selections(selections)?;
    meta_object(ectx, "__EnumValue", selection_set, |meta_field| {
        match meta_field.name.as_str() {
            "name" => Ok(ConstValue::String(value.value.to_string())),
            "description" => Ok(opt_string(value.description.as_deref())),
            "isDeprecated" => Ok(ConstValue::Boolean(
                value.deprecation_status.is_deprecated(),
            )),
            "deprecationReason" => Ok(opt_string(value.deprecation_status.reason())),
            _ => Ok(ConstValue::Null),
        }
    })
}

/// A type that is not nullable-wrapped renders as a `NON_NULL` wrapper
/// around its base form; a nullable one renders as the base form directly.
fn output_type_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    ty: &OutputType<Ctx>,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    match ty {
        OutputType::Nullable(inner) => output_base_meta(ectx, registry, inner, selections),
        other => {
            let selection_set = require_selections(selections)?;
            meta_object(ectx, "__Type", selection_set, |meta_field| {
                match meta_field.name.as_str() {
                    "kind" => Ok(ConstValue::from("NON_NULL")),
                    "ofType" => output_base_meta(ectx, registry, other, meta_field.selection_set),
                    _ => Ok(ConstValue::Null),
                }
            })
        }
    }
}

fn output_base_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    ty: &OutputType<Ctx>,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    match ty {
        OutputType::Nullable(inner) => output_base_meta(ectx, registry, inner, selections),
        OutputType::List(element) => {
            let selection_set = require_selections(selections)?;
            meta_object(ectx, "__Type", selection_set, |meta_field| {
                match meta_field.name.as_str() {
                    "kind" => Ok(ConstValue::from("LIST")),
                    "ofType" => output_type_meta(ectx, registry, element, meta_field.selection_set),
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        named => {
            let type_name = named.type_ref().underlying_type().clone();
            let entry = registry.get(&type_name).ok_or_else(|| {
                Error::resolve(format!("type not reachable from the roots: {type_name}"))
            })?;
            named_type(ectx, registry, entry, selections)
        }
    }
}

fn input_type_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    ty: &InputType,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    match ty {
        InputType::Nullable(inner) => input_base_meta(ectx, registry, inner, selections),
        other => {
            let selection_set = require_selections(selections)?;
            meta_object(ectx, "__Type", selection_set, |meta_field| {
                match meta_field.name.as_str() {
                    "kind" => Ok(ConstValue::from("NON_NULL")),
                    "ofType" => input_base_meta(ectx, registry, other, meta_field.selection_set),
                    _ => Ok(ConstValue::Null),
                }
            })
        }
    }
}

fn input_base_meta<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    registry: &TypeRegistry<Ctx>,
    ty: &InputType,
    selections: Option<&'e SelectionSet>,
) -> Result<ConstValue> {
    match ty {
        InputType::Nullable(inner) => input_base_meta(ectx, registry, inner, selections),
        InputType::List(element) => {
            let selection_set = require_selections(selections)?;
            meta_object(ectx, "__Type", selection_set, |meta_field| {
                match meta_field.name.as_str() {
                    "kind" => Ok(ConstValue::from("LIST")),
                    "ofType" => input_type_meta(ectx, registry, element, meta_field.selection_set),
                    _ => Ok(ConstValue::Null),
                }
            })
        }
        named => {
            let type_name = named.type_ref().underlying_type().clone();
            let entry = registry.get(&type_name).ok_or_else(|| {
                Error::resolve(format!("type not reachable from the roots: {type_name}"))
            })?;
            named_type(ectx, registry, entry, selections)
        }
    }
}

/// Read an optional boolean argument, substituting variables. Absent and
/// null values supply the default; anything else must be a boolean.
fn bool_argument<'e, Ctx>(
    ectx: &ExecutionContext<'e, Ctx>,
    field: &CollectedField<'e>,
    name: &str,
    default: bool,
) -> Result<bool> {
    match field
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == name)
    {
        None => Ok(default),
        Some(argument) => {
            let value = substitute(ectx, &argument.value)?;
            if value.is_null() {
                return Ok(default);
            }
            match value.as_bool() {
                Some(flag) => Ok(flag),
                None => Err(ArgumentError::CoercionFailed {
                    field_name: field.name.clone(),
                    argument_name: Name::new(name)
                        .expect("introspection argument names are valid"),
                    argument_type: Type::named_null(TypeName(mk_name!("Boolean"))),
                    message: format!("found {}", value.kind()),
                }
                .into()),
            }
        }
    }
}
