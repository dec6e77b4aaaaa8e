use indexmap::IndexMap;
use nonempty::{nonempty, NonEmpty};
use serde::Serialize;

use graphql_ast::common::Name;
use graphql_ast::value::ConstValue;

/// A list of path segments starting at the root of the response and ending
/// with the field associated with the error.
/// <https://spec.graphql.org/October2021/#sel-HAPHRPHABABC3vT>
pub type Path = Vec<PathSegment>;

/// A path segment is either a field response key or an index into a list.
/// <https://spec.graphql.org/October2021/#sel-HAPHRPJABABEyoB>
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PathSegment {
    /// Path segment that represents a field.
    Field(Name),
    /// Path segment that represents a list index, 0-based.
    Index(usize),
}

impl PathSegment {
    pub fn field(name: Name) -> Self {
        Self::Field(name)
    }

    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A GraphQL error as defined by the spec.
/// <https://spec.graphql.org/October2021/#sec-Errors.Error-result-format>
#[derive(Serialize, Debug, PartialEq)]
pub struct GraphQLError {
    /// A string describing the error.
    pub message: String,
    /// The response keys of the chain leading to the failing field; empty
    /// when the failure is not tied to a field.
    pub path: Path,
}

/// The result of executing an operation. Serializes as
/// `{"data": {...}}` on success and `{"data": null, "errors": [...]}` on
/// failure.
#[derive(Serialize, Debug, PartialEq)]
pub struct Response {
    pub data: Option<IndexMap<Name, ConstValue>>,
    /// Errors entry shouldn't be present if no errors were raised.
    /// <https://spec.graphql.org/October2021/#sel-FAPHFCBUBpEm7G>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<NonEmpty<GraphQLError>>,
}

impl Response {
    pub fn ok(data: IndexMap<Name, ConstValue>) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn error(error: GraphQLError) -> Self {
        Self {
            data: None,
            errors: Some(nonempty![error]),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("a response always serializes")
    }
}
