use thiserror::Error;

use graphql_ast::common::{Name, Type, TypeName};

use crate::response::{GraphQLError, Path, PathSegment};

pub type Result<T> = core::result::Result<T, Error>;

/// Argument evaluation failures. These fail the whole operation; no partial
/// data is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("Missing variable `{variable_name}`")]
    MissingVariable { variable_name: Name },

    #[error(
        "Argument `{argument_name}` of type `{argument_type}` expected \
         on field `{field_name}`, but not found."
    )]
    NotFound {
        field_name: Name,
        argument_name: Name,
        argument_type: Type,
    },

    #[error(
        "Argument `{argument_name}` of type `{argument_type}` expected \
         on field `{field_name}`, {message}."
    )]
    CoercionFailed {
        field_name: Name,
        argument_name: Name,
        argument_type: Type,
        message: String,
    },

    #[error("Field `{field_name}` is not defined on input object `{type_name}`")]
    InputFieldNotDefined {
        type_name: TypeName,
        field_name: Name,
    },
}

/// Selection shape failures. These fail the whole operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field_name}' is not defined on type '{type_name}'")]
    FieldNotDefined {
        type_name: TypeName,
        field_name: Name,
    },

    #[error("fragment not defined in the document: {0}")]
    UnknownFragment(Name),

    #[error("the following fragment is defined more than once: {0}")]
    DuplicateFragmentDefinition(Name),

    #[error("a selection set is required on a field of composite type '{type_name}'")]
    MissingSelectionSet { type_name: TypeName },

    #[error("a selection set is specified on a field of non-composite type '{type_name}'")]
    SelectionOnNonCompositeType { type_name: TypeName },
}

/// A failed resolver. Subject to null bubbling: absorbed into `null` by the
/// nearest nullable wrapper, otherwise propagated with the response keys of
/// the failing chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    pub message: String,
    pub path: Path,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolveError {
            message: message.into(),
            path: Path::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.message)]
    Resolve(ResolveError),

    #[error("Mutations are not configured")]
    MutationsNotConfigured,

    #[error("Subscriptions are not supported")]
    SubscriptionsNotConfigured,

    #[error("No operation found in the document")]
    NoOperationFound,

    #[error("Operation not found: {operation_name}")]
    OperationNotFound { operation_name: Name },

    #[error("Operation name required when the document defines several operations")]
    OperationNameRequired,
}

impl Error {
    pub(crate) fn resolve(message: impl Into<String>) -> Self {
        Error::Resolve(ResolveError::new(message))
    }

    /// Record the response key of the enclosing field or list index on a
    /// resolve error; other kinds carry no path.
    pub(crate) fn at(self, segment: PathSegment) -> Self {
        match self {
            Error::Resolve(mut error) => {
                error.path.insert(0, segment);
                Error::Resolve(error)
            }
            other => other,
        }
    }

    pub fn path(&self) -> Path {
        match self {
            Error::Resolve(error) => error.path.clone(),
            _ => Path::new(),
        }
    }

    pub fn into_graphql_error(self) -> GraphQLError {
        let path = self.path();
        GraphQLError {
            message: self.to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_ast::mk_name;

    #[test]
    fn test_argument_error_message_format() {
        let error = ArgumentError::NotFound {
            field_name: mk_name!("human"),
            argument_name: mk_name!("id"),
            argument_type: Type::named_non_null(TypeName(mk_name!("Int"))),
        };
        assert_eq!(
            error.to_string(),
            "Argument `id` of type `Int!` expected on field `human`, but not found."
        );
    }

    #[test]
    fn test_missing_variable_message() {
        let error = ArgumentError::MissingVariable {
            variable_name: mk_name!("id"),
        };
        assert_eq!(error.to_string(), "Missing variable `id`");
    }
}
