use crate::common::{Alias, Name, OperationType, Type, TypeName};
use crate::value::{ConstValue, Value};

/// An executable GraphQL request, as produced by a parser.
///
/// [Reference](https://spec.graphql.org/October2021/#ExecutableDocument).
#[derive(Debug, Clone)]
pub struct ExecutableDocument {
    /// The definitions of the document, in document order.
    pub items: Vec<ExecutableDefinition>,
}

#[derive(Debug, Clone)]
pub enum ExecutableDefinition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

/// A GraphQL operation, such as `mutation($content:String!) { makePost(content: $content) { id } }`.
///
/// [Reference](https://spec.graphql.org/October2021/#OperationDefinition).
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    /// The type of operation.
    pub ty: OperationType,
    /// The name of the operation.
    pub name: Option<Name>,
    /// The variable definitions.
    pub variable_definitions: Vec<VariableDefinition>,
    /// The operation's selection set.
    pub selection_set: SelectionSet,
}

/// A variable definition inside a list of variable definitions, for example
/// `$name:String!`.
///
/// [Reference](https://spec.graphql.org/October2021/#VariableDefinition).
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    /// The name of the variable, without the preceding `$`.
    pub name: Name,
    /// The type of the variable.
    pub var_type: Type,
    /// The optional default value of the variable.
    pub default_value: Option<ConstValue>,
}

/// A set of fields to be selected, for example `{ name age }`.
///
/// [Reference](https://spec.graphql.org/October2021/#SelectionSet).
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    /// The fields to be selected.
    pub items: Vec<Selection>,
}

/// A part of an object to be selected; a single field, a fragment spread or
/// an inline fragment.
///
/// [Reference](https://spec.graphql.org/October2021/#Selection).
#[derive(Debug, Clone)]
pub enum Selection {
    /// Select a single field, such as `name` or `weightKilos: weight(unit: KILOGRAMS)`.
    Field(Field),
    /// Select using a fragment.
    FragmentSpread(FragmentSpread),
    /// Select using an inline fragment.
    InlineFragment(InlineFragment),
}

/// An argument to a field, such as `id: 1000`.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
}

/// A field being selected on an object, such as `name` or
/// `weightKilos: weight(unit: KILOGRAMS)`.
///
/// [Reference](https://spec.graphql.org/October2021/#Field).
#[derive(Debug, Clone)]
pub struct Field {
    /// The optional field alias.
    pub alias: Option<Alias>,
    /// The name of the field.
    pub name: Name,
    /// The arguments to the field, empty if no arguments are provided.
    pub arguments: Vec<Argument>,
    /// The subfields being selected in this field, if it is an object.
    pub selection_set: Option<SelectionSet>,
}

impl Field {
    /// The key under which this field appears in the response: the alias if
    /// present, the field name otherwise.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().map_or(&self.name, |alias| &alias.0)
    }
}

/// A fragment selector, such as `... userFields`.
///
/// [Reference](https://spec.graphql.org/October2021/#FragmentSpread).
#[derive(Debug, Clone)]
pub struct FragmentSpread {
    /// The name of the fragment being selected.
    pub fragment_name: Name,
}

/// An inline fragment selector, such as `... on User { name }`.
///
/// [Reference](https://spec.graphql.org/October2021/#InlineFragment).
#[derive(Debug, Clone)]
pub struct InlineFragment {
    /// The type condition.
    pub type_condition: Option<TypeCondition>,
    /// The selected fields of the fragment.
    pub selection_set: SelectionSet,
}

/// The definition of a fragment, such as `fragment userFields on User { name age }`.
///
/// [Reference](https://spec.graphql.org/October2021/#FragmentDefinition).
#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    /// Name of the fragment.
    pub name: Name,
    /// The type this fragment operates on.
    pub type_condition: TypeCondition,
    /// The fragment's selection set.
    pub selection_set: SelectionSet,
}

/// A type a fragment can apply to (`on` followed by the type).
///
/// [Reference](https://spec.graphql.org/October2021/#TypeCondition).
#[derive(Debug, Clone)]
pub struct TypeCondition {
    /// The type this fragment applies to.
    pub on: TypeName,
}
