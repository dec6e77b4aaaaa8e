//! Flattening of a selection set against a concrete type: fragment spreads
//! and inline fragments are inlined in encounter order when their type
//! condition applies.

use std::collections::HashMap;

use graphql_ast::common::{Name, TypeName};
use graphql_ast::executable::{Argument, FragmentDefinition, Selection, SelectionSet};

use super::error::ValidationError;

pub(crate) type FragmentMap<'q> = HashMap<&'q Name, &'q FragmentDefinition>;

/// A field selected on a concrete type after fragment flattening. Borrows
/// the document.
#[derive(Debug)]
pub(crate) struct CollectedField<'q> {
    /// The key under which the field appears in the response.
    pub response_key: &'q Name,
    pub name: &'q Name,
    pub arguments: &'q [Argument],
    pub selection_set: Option<&'q SelectionSet>,
}

/// Flatten `selection_set` against the type named `type_name`, which
/// belongs to the unions and interfaces named in `abstracts`.
pub(crate) fn collect_fields<'q>(
    fragments: &FragmentMap<'q>,
    type_name: &TypeName,
    abstracts: &[TypeName],
    selection_set: &'q SelectionSet,
) -> Result<Vec<CollectedField<'q>>, ValidationError> {
    let mut fields = Vec::new();
    collect_into(fragments, type_name, abstracts, selection_set, &mut fields)?;
    Ok(fields)
}

fn collect_into<'q>(
    fragments: &FragmentMap<'q>,
    type_name: &TypeName,
    abstracts: &[TypeName],
    selection_set: &'q SelectionSet,
    fields: &mut Vec<CollectedField<'q>>,
) -> Result<(), ValidationError> {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                fields.push(CollectedField {
                    response_key: field.response_key(),
                    name: &field.name,
                    arguments: &field.arguments,
                    selection_set: field.selection_set.as_ref(),
                });
            }
            Selection::FragmentSpread(spread) => {
                let fragment = fragments.get(&spread.fragment_name).ok_or_else(|| {
                    ValidationError::UnknownFragment(spread.fragment_name.clone())
                })?;
                if type_condition_matches(&fragment.type_condition.on, type_name, abstracts) {
                    collect_into(
                        fragments,
                        type_name,
                        abstracts,
                        &fragment.selection_set,
                        fields,
                    )?;
                }
            }
            Selection::InlineFragment(inline) => {
                // an absent condition always applies
                let applies = inline
                    .type_condition
                    .as_ref()
                    .map_or(true, |condition| {
                        type_condition_matches(&condition.on, type_name, abstracts)
                    });
                if applies {
                    collect_into(fragments, type_name, abstracts, &inline.selection_set, fields)?;
                }
            }
        }
    }
    Ok(())
}

/// A condition matches the concrete type itself or any abstract type the
/// concrete type is a member of.
fn type_condition_matches(
    condition: &TypeName,
    type_name: &TypeName,
    abstracts: &[TypeName],
) -> bool {
    condition == type_name || abstracts.contains(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_ast::executable::{Field, FragmentSpread, InlineFragment, TypeCondition};
    use graphql_ast::mk_name;

    fn named_field(name: &str) -> Selection {
        Selection::Field(Field {
            alias: None,
            name: Name::new(name).unwrap(),
            arguments: vec![],
            selection_set: None,
        })
    }

    fn droid() -> TypeName {
        TypeName(mk_name!("Droid"))
    }

    #[test]
    fn test_fields_flatten_in_encounter_order() {
        let fragment = FragmentDefinition {
            name: mk_name!("F"),
            type_condition: TypeCondition { on: droid() },
            selection_set: SelectionSet {
                items: vec![named_field("b"), named_field("c")],
            },
        };
        let fragments: FragmentMap = [(&fragment.name, &fragment)].into_iter().collect();
        let selection_set = SelectionSet {
            items: vec![
                named_field("a"),
                Selection::FragmentSpread(FragmentSpread {
                    fragment_name: mk_name!("F"),
                }),
                named_field("d"),
            ],
        };
        let collected = collect_fields(&fragments, &droid(), &[], &selection_set).unwrap();
        let names: Vec<_> = collected.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_spread_condition_matches_type_or_abstract() {
        let fragment = FragmentDefinition {
            name: mk_name!("OnCharacter"),
            type_condition: TypeCondition {
                on: TypeName(mk_name!("Character")),
            },
            selection_set: SelectionSet {
                items: vec![named_field("name")],
            },
        };
        let fragments: FragmentMap = [(&fragment.name, &fragment)].into_iter().collect();
        let selection_set = SelectionSet {
            items: vec![Selection::FragmentSpread(FragmentSpread {
                fragment_name: mk_name!("OnCharacter"),
            })],
        };

        let collected =
            collect_fields(&fragments, &droid(), &[], &selection_set).unwrap();
        assert!(collected.is_empty());

        let abstracts = [TypeName(mk_name!("Character"))];
        let collected =
            collect_fields(&fragments, &droid(), &abstracts, &selection_set).unwrap();
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn test_inline_fragment_condition_is_enforced() {
        let fragments = FragmentMap::new();
        let selection_set = SelectionSet {
            items: vec![Selection::InlineFragment(InlineFragment {
                type_condition: Some(TypeCondition {
                    on: TypeName(mk_name!("Human")),
                }),
                selection_set: SelectionSet {
                    items: vec![named_field("homePlanet")],
                },
            })],
        };
        let collected = collect_fields(&fragments, &droid(), &[], &selection_set).unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn test_unknown_fragment_is_an_error() {
        let fragments = FragmentMap::new();
        let selection_set = SelectionSet {
            items: vec![Selection::FragmentSpread(FragmentSpread {
                fragment_name: mk_name!("Nope"),
            })],
        };
        let result = collect_fields(&fragments, &droid(), &[], &selection_set);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::UnknownFragment(mk_name!("Nope"))
        );
    }
}
