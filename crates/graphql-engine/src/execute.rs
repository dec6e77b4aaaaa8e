//! The operation driver: operation selection, execution context assembly
//! and dispatch to the query or mutation root.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use graphql_ast::common::{Name, OperationType};
use graphql_ast::executable::{ExecutableDefinition, ExecutableDocument, OperationDefinition};
use graphql_ast::value::ConstValue;

use crate::response::Response;
use crate::schema::{FieldValue, Schema};

pub mod arguments;
pub(crate) mod collect;
pub mod error;
pub(crate) mod resolve;

use collect::FragmentMap;
use error::{Error, Result, ValidationError};
use resolve::{ResolutionMode, SelectionKind};

/// External variable values, keyed by variable name without the `$`.
pub type VariableValues = BTreeMap<Name, ConstValue>;

/// Everything one request's resolution needs: the schema, the selected
/// operation, the document's fragments, the variable values and the user
/// context. Built per request and discarded with the response.
pub(crate) struct ExecutionContext<'e, Ctx> {
    pub schema: &'e Schema<Ctx>,
    pub operation: &'e OperationDefinition,
    pub fragments: FragmentMap<'e>,
    pub variables: &'e VariableValues,
    pub ctx: &'e Ctx,
}

/// Execute a parsed document against a schema.
///
/// The document must contain exactly one operation; use
/// [`execute_request`] to select among several by name. The returned
/// response always carries a `data` entry; failures set it to null and add
/// an `errors` entry.
pub async fn execute<Ctx: Send + Sync>(
    schema: &Schema<Ctx>,
    document: &ExecutableDocument,
    variables: &VariableValues,
    ctx: &Ctx,
) -> Response {
    execute_request(schema, None, document, variables, ctx).await
}

/// Execute a parsed document, selecting the operation by name.
pub async fn execute_request<Ctx: Send + Sync>(
    schema: &Schema<Ctx>,
    operation_name: Option<&Name>,
    document: &ExecutableDocument,
    variables: &VariableValues,
    ctx: &Ctx,
) -> Response {
    match run(schema, operation_name, document, variables, ctx).await {
        Ok(data) => Response::ok(data),
        Err(error) => {
            tracing::debug!(error = %error, "operation failed");
            Response::error(error.into_graphql_error())
        }
    }
}

async fn run<'e, Ctx: Send + Sync>(
    schema: &'e Schema<Ctx>,
    operation_name: Option<&'e Name>,
    document: &'e ExecutableDocument,
    variables: &'e VariableValues,
    ctx: &'e Ctx,
) -> Result<IndexMap<Name, ConstValue>> {
    let mut operations = Vec::new();
    let mut fragments = FragmentMap::new();
    for definition in &document.items {
        match definition {
            ExecutableDefinition::Operation(operation) => operations.push(operation),
            ExecutableDefinition::Fragment(fragment) => {
                if fragments.insert(&fragment.name, fragment).is_some() {
                    return Err(
                        ValidationError::DuplicateFragmentDefinition(fragment.name.clone()).into(),
                    );
                }
            }
        }
    }

    let operation: &'e OperationDefinition = match operation_name {
        Some(name) => operations
            .iter()
            .find(|operation| operation.name.as_ref() == Some(name))
            .copied()
            .ok_or_else(|| Error::OperationNotFound {
                operation_name: name.clone(),
            })?,
        None => match operations.as_slice() {
            [] => return Err(Error::NoOperationFound),
            [operation] => *operation,
            _ => return Err(Error::OperationNameRequired),
        },
    };

    tracing::debug!(
        operation_type = %operation.ty,
        operation_name = operation.name.as_ref().map(Name::as_str),
        "executing operation"
    );

    let ectx = ExecutionContext {
        schema,
        operation,
        fragments,
        variables,
        ctx,
    };

    match operation.ty {
        OperationType::Query => {
            resolve::resolve_object(
                &ectx,
                schema.query.clone(),
                FieldValue::Null,
                &operation.selection_set,
                ResolutionMode::Concurrent,
                SelectionKind::QueryRoot,
            )
            .await
        }
        OperationType::Mutation => {
            let mutation = schema
                .mutation
                .clone()
                .ok_or(Error::MutationsNotConfigured)?;
            resolve::resolve_object(
                &ectx,
                mutation,
                FieldValue::Null,
                &operation.selection_set,
                ResolutionMode::Sequential,
                SelectionKind::Inner,
            )
            .await
        }
        OperationType::Subscription => Err(Error::SubscriptionsNotConfigured),
    }
}
