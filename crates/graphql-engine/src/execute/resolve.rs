//! Recursive value resolution: runs field resolvers, walks the declared
//! output type and applies null bubbling on resolve errors.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use indexmap::IndexMap;

use graphql_ast::common::Name;
use graphql_ast::executable::SelectionSet;
use graphql_ast::value::ConstValue;

use super::arguments::coerce_arguments;
use super::collect::{collect_fields, CollectedField};
use super::error::{Error, Result, ValidationError};
use super::ExecutionContext;
use crate::introspection;
use crate::response::PathSegment;
use crate::schema::{FieldValue, ObjectType, OutputType};

/// Whether sibling fields may resolve concurrently. Only the top-level
/// selection of a mutation is sequential; mutations may have side effects
/// and each root field observes the state left by the previous one.
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum ResolutionMode {
    Concurrent,
    Sequential,
}

/// Roots get the introspection overlay: `__schema` and `__type` are
/// addressable from the query root only.
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum SelectionKind {
    QueryRoot,
    Inner,
}

/// Resolve a selection set against an object type, emitting response keys
/// in selection order regardless of completion order.
pub(crate) fn resolve_object<'e, Ctx: Send + Sync>(
    ectx: &'e ExecutionContext<'e, Ctx>,
    object: Arc<ObjectType<Ctx>>,
    source: FieldValue<Ctx>,
    selection_set: &'e SelectionSet,
    mode: ResolutionMode,
    kind: SelectionKind,
) -> BoxFuture<'e, Result<IndexMap<Name, ConstValue>>> {
    Box::pin(async move {
        let abstracts = object.abstract_names();
        let collected =
            collect_fields(&ectx.fragments, &object.name, &abstracts, selection_set)?;
        let mut data = IndexMap::new();
        match mode {
            ResolutionMode::Concurrent => {
                let results = future::join_all(
                    collected
                        .iter()
                        .map(|field| resolve_collected_field(ectx, &object, &source, field, kind)),
                )
                .await;
                // leftmost error wins
                for result in results {
                    let (key, value) = result?;
                    data.insert(key, value);
                }
            }
            ResolutionMode::Sequential => {
                for field in &collected {
                    let (key, value) =
                        resolve_collected_field(ectx, &object, &source, field, kind).await?;
                    data.insert(key, value);
                }
            }
        }
        Ok(data)
    })
}

async fn resolve_collected_field<'e, Ctx: Send + Sync>(
    ectx: &'e ExecutionContext<'e, Ctx>,
    object: &Arc<ObjectType<Ctx>>,
    source: &FieldValue<Ctx>,
    field: &CollectedField<'e>,
    kind: SelectionKind,
) -> Result<(Name, ConstValue)> {
    let key = field.response_key.clone();

    match field.name.as_str() {
        "__typename" => {
            return Ok((key, ConstValue::String(object.name.to_string())));
        }
        "__schema" if kind == SelectionKind::QueryRoot => {
            return Ok((key, introspection::resolve_schema_field(ectx, field)?));
        }
        "__type" if kind == SelectionKind::QueryRoot => {
            return Ok((key, introspection::resolve_type_field(ectx, field)?));
        }
        _ => {}
    }

    let field_def = object.field(field.name).ok_or_else(|| {
        ValidationError::FieldNotDefined {
            type_name: object.name.clone(),
            field_name: field.name.clone(),
        }
    })?;

    let arguments = coerce_arguments(ectx, &field_def.name, &field_def.arguments, field.arguments)?;

    // the lift of the applied resolver is the only suspension point
    let outcome = field_def.resolver.call(ectx.ctx, source, &arguments).await;

    let resolved = match outcome {
        Ok(value) => {
            resolve_value(
                ectx,
                field_def.field_type.clone(),
                value,
                field.selection_set,
            )
            .await
        }
        Err(message) => Err(Error::resolve(message)),
    };

    match resolved {
        Ok(value) => Ok((key, value)),
        // null bubbling: a nullable field absorbs a resolve error
        Err(Error::Resolve(_)) if field_def.field_type.is_nullable() => {
            Ok((key, ConstValue::Null))
        }
        Err(error) => Err(error.at(PathSegment::field(key))),
    }
}

/// Recurse through the declared output type until leaves produce response
/// values.
pub(crate) fn resolve_value<'e, Ctx: Send + Sync>(
    ectx: &'e ExecutionContext<'e, Ctx>,
    ty: OutputType<Ctx>,
    value: FieldValue<Ctx>,
    selections: Option<&'e SelectionSet>,
) -> BoxFuture<'e, Result<ConstValue>> {
    Box::pin(async move {
        // resolvers may signal absence with either shape
        let value = match value {
            FieldValue::Value(ConstValue::Null) => FieldValue::Null,
            other => other,
        };
        match ty {
            OutputType::Nullable(inner) => match value {
                FieldValue::Null => Ok(ConstValue::Null),
                other => match resolve_value(ectx, *inner, other, selections).await {
                    // null bubbling: absorb the error at the wrapper
                    Err(Error::Resolve(_)) => Ok(ConstValue::Null),
                    result => result,
                },
            },
            OutputType::Scalar(scalar) => {
                if selections.is_some() {
                    return Err(ValidationError::SelectionOnNonCompositeType {
                        type_name: scalar.name.clone(),
                    }
                    .into());
                }
                match value {
                    FieldValue::Value(leaf) => {
                        scalar.serialize(&leaf).map_err(Error::resolve)
                    }
                    FieldValue::Null => Err(Error::resolve(format!(
                        "unexpected null for non-nullable type `{}`",
                        scalar.name
                    ))),
                    _ => Err(Error::resolve(format!(
                        "expected a leaf value for scalar `{}`",
                        scalar.name
                    ))),
                }
            }
            OutputType::Enum(enum_type) => {
                let member = match &value {
                    FieldValue::Value(ConstValue::Enum(name)) => enum_type.lookup(name),
                    FieldValue::Value(ConstValue::String(s)) => {
                        Name::new(s).ok().and_then(|name| enum_type.lookup(&name))
                    }
                    _ => None,
                };
                match member {
                    Some(member) => Ok(ConstValue::String(member.value.to_string())),
                    None => Err(Error::resolve(format!(
                        "value is not a member of enum `{}`",
                        enum_type.name
                    ))),
                }
            }
            OutputType::List(element) => {
                let items = match value {
                    FieldValue::List(items) => items,
                    // a resolver may hand back an already-serialized list
                    FieldValue::Value(ConstValue::List(leaves)) => {
                        leaves.into_iter().map(FieldValue::Value).collect()
                    }
                    FieldValue::Null => {
                        return Err(Error::resolve("unexpected null for non-nullable list"))
                    }
                    _ => return Err(Error::resolve("expected a list value")),
                };
                let mut resolved = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match resolve_value(ectx, (*element).clone(), item, selections).await {
                        Ok(value) => resolved.push(value),
                        Err(error) => return Err(error.at(PathSegment::index(index))),
                    }
                }
                Ok(ConstValue::List(resolved))
            }
            OutputType::Object(object) => {
                let selection_set =
                    selections.ok_or_else(|| ValidationError::MissingSelectionSet {
                        type_name: object.name.clone(),
                    })?;
                if value.is_null() {
                    return Err(Error::resolve(format!(
                        "unexpected null for non-nullable type `{}`",
                        object.name
                    )));
                }
                let data = resolve_object(
                    ectx,
                    object,
                    value,
                    selection_set,
                    ResolutionMode::Concurrent,
                    SelectionKind::Inner,
                )
                .await?;
                Ok(ConstValue::Object(data))
            }
            OutputType::Abstract(abstract_type) => match value {
                FieldValue::Abstract { object, value } => {
                    resolve_value(ectx, OutputType::Object(object), *value, selections).await
                }
                FieldValue::Null => Err(Error::resolve(format!(
                    "unexpected null for non-nullable type `{}`",
                    abstract_type.name
                ))),
                // an untagged source resolves through the member probes
                other => match abstract_type.concrete_type_of(&other) {
                    Some(object) => {
                        resolve_value(ectx, OutputType::Object(object), other, selections).await
                    }
                    None => Err(Error::resolve(format!(
                        "value is not a member of abstract type `{}`",
                        abstract_type.name
                    ))),
                },
            },
        }
    })
}
