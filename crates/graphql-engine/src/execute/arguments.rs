//! Evaluation of query arguments against a field's argument descriptors:
//! variable substitution, coercion by declared type and default handling.

use indexmap::IndexMap;

use graphql_ast::common::Name;
use graphql_ast::executable::Argument;
use graphql_ast::value::{ConstValue, Value};

use super::error::ArgumentError;
use super::ExecutionContext;
use crate::schema::{InputType, InputValueDef};

/// The coerced arguments of a field invocation, keyed by argument name in
/// descriptor order. Passed by reference to every resolver.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Arguments(IndexMap<Name, ConstValue>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ConstValue)> {
        self.0.iter()
    }
}

/// Walk the descriptor list head-first, locating each query argument by
/// name, substituting variables and coercing to the declared type.
pub(crate) fn coerce_arguments<Ctx>(
    ectx: &ExecutionContext<'_, Ctx>,
    field_name: &Name,
    descriptors: &[InputValueDef],
    provided: &[Argument],
) -> Result<Arguments, ArgumentError> {
    let mut coerced = IndexMap::new();
    for descriptor in descriptors {
        // case-sensitive, first match wins
        let value = provided
            .iter()
            .find(|argument| argument.name == descriptor.name)
            .map(|argument| &argument.value);
        let coerced_value = match value {
            Some(value) => {
                let substituted = substitute(ectx, value)?;
                coerce_const(field_name, descriptor, &substituted)?
            }
            None => absent(field_name, descriptor)?,
        };
        coerced.insert(descriptor.name.clone(), coerced_value);
    }
    Ok(Arguments(coerced))
}

/// An argument that was not provided: supply the default, bind null for a
/// nullable type, or fail.
fn absent(field_name: &Name, descriptor: &InputValueDef) -> Result<ConstValue, ArgumentError> {
    match &descriptor.default_value {
        Some(default) => coerce_const(field_name, descriptor, default),
        None => {
            if descriptor.field_type.is_nullable() {
                Ok(ConstValue::Null)
            } else {
                Err(ArgumentError::NotFound {
                    field_name: field_name.clone(),
                    argument_name: descriptor.name.clone(),
                    argument_type: descriptor.field_type.type_ref(),
                })
            }
        }
    }
}

/// Replace every variable in `value` with its value from the request's
/// variable map, falling back to the defaults declared on the operation's
/// variable definitions.
pub(crate) fn substitute<Ctx>(
    ectx: &ExecutionContext<'_, Ctx>,
    value: &Value,
) -> Result<ConstValue, ArgumentError> {
    match value {
        Value::Variable(variable_name) => lookup_variable(ectx, variable_name),
        Value::Null => Ok(ConstValue::Null),
        Value::Int(i) => Ok(ConstValue::Int(*i)),
        Value::Float(f) => Ok(ConstValue::Float(*f)),
        Value::String(s) => Ok(ConstValue::String(s.clone())),
        Value::Boolean(b) => Ok(ConstValue::Boolean(*b)),
        Value::Enum(e) => Ok(ConstValue::Enum(e.clone())),
        Value::List(items) => Ok(ConstValue::List(
            items
                .iter()
                .map(|item| substitute(ectx, item))
                .collect::<Result<_, _>>()?,
        )),
        Value::Object(fields) => {
            let mut object = IndexMap::new();
            for (key, field_value) in fields {
                object.insert(key.clone(), substitute(ectx, field_value)?);
            }
            Ok(ConstValue::Object(object))
        }
    }
}

fn lookup_variable<Ctx>(
    ectx: &ExecutionContext<'_, Ctx>,
    variable_name: &Name,
) -> Result<ConstValue, ArgumentError> {
    if let Some(value) = ectx.variables.get(variable_name) {
        return Ok(value.clone());
    }
    // only the declared default applies when the variable is not provided
    // Ref: https://spec.graphql.org/October2021/#sel-KANLLFCFFNABABC3vT
    ectx.operation
        .variable_definitions
        .iter()
        .find(|definition| &definition.name == variable_name)
        .and_then(|definition| definition.default_value.clone())
        .ok_or_else(|| ArgumentError::MissingVariable {
            variable_name: variable_name.clone(),
        })
}

fn coerce_const(
    field_name: &Name,
    descriptor: &InputValueDef,
    value: &ConstValue,
) -> Result<ConstValue, ArgumentError> {
    coerce(field_name, descriptor, &descriptor.field_type, value)
}

fn coercion_failed(
    field_name: &Name,
    descriptor: &InputValueDef,
    message: String,
) -> ArgumentError {
    ArgumentError::CoercionFailed {
        field_name: field_name.clone(),
        argument_name: descriptor.name.clone(),
        argument_type: descriptor.field_type.type_ref(),
        message,
    }
}

/// Coerce a variable-free value to the declared input type.
fn coerce(
    field_name: &Name,
    descriptor: &InputValueDef,
    ty: &InputType,
    value: &ConstValue,
) -> Result<ConstValue, ArgumentError> {
    match ty {
        InputType::Nullable(inner) => {
            if value.is_null() {
                Ok(ConstValue::Null)
            } else {
                coerce(field_name, descriptor, inner, value)
            }
        }
        InputType::List(element) => match value {
            ConstValue::Null => Err(coercion_failed(
                field_name,
                descriptor,
                "found NULL".to_string(),
            )),
            ConstValue::List(items) => Ok(ConstValue::List(
                items
                    .iter()
                    .map(|item| coerce(field_name, descriptor, element, item))
                    .collect::<Result<_, _>>()?,
            )),
            // a single value coerces to a one-element list
            // Ref: https://spec.graphql.org/October2021/#sec-List.Input-Coercion
            other => Ok(ConstValue::List(vec![coerce(
                field_name, descriptor, element, other,
            )?])),
        },
        InputType::Scalar(scalar) => {
            if value.is_null() {
                return Err(coercion_failed(
                    field_name,
                    descriptor,
                    "found NULL".to_string(),
                ));
            }
            scalar.parse(value).map_err(|_| {
                coercion_failed(field_name, descriptor, format!("found {}", value.kind()))
            })
        }
        InputType::Enum(enum_type) => {
            let incoming = match value {
                ConstValue::Enum(name) => Some(name.clone()),
                ConstValue::String(s) => Name::new(s).ok(),
                _ => None,
            };
            let member = incoming.as_ref().and_then(|name| enum_type.lookup(name));
            match member {
                Some(member) => Ok(ConstValue::Enum(member.value.clone())),
                None => Err(coercion_failed(
                    field_name,
                    descriptor,
                    format!("found {}", value.kind()),
                )),
            }
        }
        InputType::InputObject(input_object) => {
            let incoming = value.as_object().ok_or_else(|| {
                coercion_failed(field_name, descriptor, format!("found {}", value.kind()))
            })?;
            // reject keys the input object does not declare
            for key in incoming.keys() {
                if !input_object.fields.iter().any(|f| &f.name == key) {
                    return Err(ArgumentError::InputFieldNotDefined {
                        type_name: input_object.name.clone(),
                        field_name: key.clone(),
                    });
                }
            }
            let mut object = IndexMap::new();
            for field in &input_object.fields {
                let coerced = match incoming.get(&field.name) {
                    Some(field_value) => coerce_const(field_name, field, field_value)?,
                    None => absent(field_name, field)?,
                };
                object.insert(field.name.clone(), coerced);
            }
            Ok(ConstValue::Object(object))
        }
    }
}
