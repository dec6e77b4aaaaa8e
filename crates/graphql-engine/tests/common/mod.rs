//! Shared test fixtures: document construction helpers (the parser is an
//! external collaborator, so tests build documents directly) and the Star
//! Wars schema.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use graphql_ast::common::{Alias, Name, OperationType, Type, TypeName};
use graphql_ast::executable::{
    Argument, ExecutableDefinition, ExecutableDocument, Field as AstField, FragmentDefinition,
    FragmentSpread, InlineFragment, OperationDefinition, Selection, SelectionSet, TypeCondition,
    VariableDefinition,
};
use graphql_ast::value::{ConstValue, Value};

use graphql_engine::schema::build::{
    add_type, arg, async_field, enum_type, enum_value, field, input_int, input_string, int,
    interface, obj, string,
};
use graphql_engine::schema::{Arguments, FieldValue, InputType, OutputType, Schema};
use graphql_engine::VariableValues;

// ---------------------------------------------------------------------------
// document builders

pub fn name(s: &str) -> Name {
    Name::new(s).unwrap()
}

pub fn doc(items: Vec<ExecutableDefinition>) -> ExecutableDocument {
    ExecutableDocument { items }
}

pub fn operation(
    ty: OperationType,
    op_name: Option<&str>,
    variable_definitions: Vec<VariableDefinition>,
    selections: Vec<Selection>,
) -> ExecutableDefinition {
    ExecutableDefinition::Operation(OperationDefinition {
        ty,
        name: op_name.map(name),
        variable_definitions,
        selection_set: SelectionSet { items: selections },
    })
}

pub fn query(selections: Vec<Selection>) -> ExecutableDefinition {
    operation(OperationType::Query, None, vec![], selections)
}

pub fn mutation(
    variable_definitions: Vec<VariableDefinition>,
    selections: Vec<Selection>,
) -> ExecutableDefinition {
    operation(OperationType::Mutation, None, variable_definitions, selections)
}

pub fn var_def(var_name: &str, var_type: Type) -> VariableDefinition {
    VariableDefinition {
        name: name(var_name),
        var_type,
        default_value: None,
    }
}

pub fn var_def_with_default(
    var_name: &str,
    var_type: Type,
    default_value: ConstValue,
) -> VariableDefinition {
    VariableDefinition {
        name: name(var_name),
        var_type,
        default_value: Some(default_value),
    }
}

pub fn non_null(type_name: &str) -> Type {
    Type::named_non_null(TypeName(name(type_name)))
}

pub fn fld(field_name: &str, selections: Vec<Selection>) -> Selection {
    fld_args(field_name, vec![], selections)
}

pub fn fld_args(
    field_name: &str,
    arguments: Vec<(&str, Value)>,
    selections: Vec<Selection>,
) -> Selection {
    aliased(None, field_name, arguments, selections)
}

pub fn alias_fld(
    alias: &str,
    field_name: &str,
    arguments: Vec<(&str, Value)>,
    selections: Vec<Selection>,
) -> Selection {
    aliased(Some(alias), field_name, arguments, selections)
}

fn aliased(
    alias: Option<&str>,
    field_name: &str,
    arguments: Vec<(&str, Value)>,
    selections: Vec<Selection>,
) -> Selection {
    Selection::Field(AstField {
        alias: alias.map(|a| Alias(name(a))),
        name: name(field_name),
        arguments: arguments
            .into_iter()
            .map(|(argument_name, value)| Argument {
                name: name(argument_name),
                value,
            })
            .collect(),
        selection_set: if selections.is_empty() {
            None
        } else {
            Some(SelectionSet { items: selections })
        },
    })
}

pub fn spread(fragment_name: &str) -> Selection {
    Selection::FragmentSpread(FragmentSpread {
        fragment_name: name(fragment_name),
    })
}

pub fn inline_on(condition: Option<&str>, selections: Vec<Selection>) -> Selection {
    Selection::InlineFragment(InlineFragment {
        type_condition: condition.map(|on| TypeCondition {
            on: TypeName(name(on)),
        }),
        selection_set: SelectionSet { items: selections },
    })
}

pub fn fragment(
    fragment_name: &str,
    on: &str,
    selections: Vec<Selection>,
) -> ExecutableDefinition {
    ExecutableDefinition::Fragment(FragmentDefinition {
        name: name(fragment_name),
        type_condition: TypeCondition {
            on: TypeName(name(on)),
        },
        selection_set: SelectionSet { items: selections },
    })
}

pub fn var(var_name: &str) -> Value {
    Value::Variable(name(var_name))
}

pub fn variables(values: Vec<(&str, ConstValue)>) -> VariableValues {
    values
        .into_iter()
        .map(|(var_name, value)| (name(var_name), value))
        .collect()
}

// ---------------------------------------------------------------------------
// the Star Wars fixture

#[derive(Clone, Debug)]
pub struct Human {
    pub id: i64,
    pub name: String,
    pub friend_ids: Vec<i64>,
    pub appears_in: Vec<&'static str>,
    pub home_planet: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct Droid {
    pub id: i64,
    pub name: String,
    pub friend_ids: Vec<i64>,
    pub appears_in: Vec<&'static str>,
    pub primary_function: &'static str,
}

#[derive(Clone, Debug)]
pub enum CharacterRef {
    Human(Human),
    Droid(Droid),
}

#[derive(Clone, Debug)]
pub struct UpdatePayload {
    pub character: Option<CharacterRef>,
    pub error: Option<String>,
}

pub struct StarWars {
    humans: Mutex<HashMap<i64, Human>>,
    droids: HashMap<i64, Droid>,
}

fn human(
    id: i64,
    name: &str,
    friend_ids: &[i64],
    appears_in: &[&'static str],
    home_planet: Option<&'static str>,
) -> (i64, Human) {
    (
        id,
        Human {
            id,
            name: name.to_string(),
            friend_ids: friend_ids.to_vec(),
            appears_in: appears_in.to_vec(),
            home_planet,
        },
    )
}

fn droid(
    id: i64,
    name: &str,
    friend_ids: &[i64],
    appears_in: &[&'static str],
    primary_function: &'static str,
) -> (i64, Droid) {
    (
        id,
        Droid {
            id,
            name: name.to_string(),
            friend_ids: friend_ids.to_vec(),
            appears_in: appears_in.to_vec(),
            primary_function,
        },
    )
}

impl StarWars {
    pub fn new() -> StarWars {
        let all = ["NEWHOPE", "EMPIRE", "JEDI"];
        StarWars {
            humans: Mutex::new(HashMap::from([
                human(
                    1000,
                    "Luke Skywalker",
                    &[1002, 1003, 2000, 2001],
                    &all,
                    Some("Tatooine"),
                ),
                human(1002, "Han Solo", &[1000, 1003, 2001], &all, None),
                human(
                    1003,
                    "Leia Organa",
                    &[1000, 1002, 2000, 2001],
                    &all,
                    Some("Alderaan"),
                ),
            ])),
            droids: HashMap::from([
                droid(2000, "C-3PO", &[1000, 1002, 1003, 2001], &all, "Protocol"),
                droid(2001, "R2-D2", &[1000, 1002, 1003], &all, "Astromech"),
            ]),
        }
    }

    pub fn human(&self, id: i64) -> Option<Human> {
        self.humans.lock().unwrap().get(&id).cloned()
    }

    pub fn droid(&self, id: i64) -> Option<Droid> {
        self.droids.get(&id).cloned()
    }

    fn character_value(&self, id: i64) -> Option<FieldValue<StarWars>> {
        if let Some(human) = self.human(id) {
            return Some(FieldValue::owned(human));
        }
        self.droid(id).map(FieldValue::owned)
    }

    pub fn rename_human(&self, id: i64, new_name: &str) -> Option<Human> {
        let mut humans = self.humans.lock().unwrap();
        let human = humans.get_mut(&id)?;
        human.name = new_name.to_string();
        Some(human.clone())
    }

    pub fn append_to_human_name(&self, id: i64, suffix: &str) -> Option<Human> {
        let mut humans = self.humans.lock().unwrap();
        let human = humans.get_mut(&id)?;
        human.name.push_str(suffix);
        Some(human.clone())
    }
}

fn human_src<'a>(src: &'a FieldValue<StarWars>) -> Result<&'a Human, String> {
    src.downcast_ref::<Human>()
        .ok_or_else(|| "expected a Human source".to_string())
}

fn droid_src<'a>(src: &'a FieldValue<StarWars>) -> Result<&'a Droid, String> {
    src.downcast_ref::<Droid>()
        .ok_or_else(|| "expected a Droid source".to_string())
}

fn episodes(appears_in: &[&'static str]) -> FieldValue<StarWars> {
    FieldValue::Value(ConstValue::List(
        appears_in
            .iter()
            .map(|episode| ConstValue::Enum(name(episode)))
            .collect(),
    ))
}

fn friends_of(ctx: &StarWars, friend_ids: &[i64]) -> FieldValue<StarWars> {
    FieldValue::list(friend_ids.iter().filter_map(|id| ctx.character_value(*id)))
}

fn hero<'r>(
    ctx: &'r StarWars,
    _src: &'r FieldValue<StarWars>,
    args: &'r Arguments,
) -> BoxFuture<'r, Result<FieldValue<StarWars>, String>> {
    Box::pin(async move {
        let wants_luke = args
            .get("episode")
            .and_then(ConstValue::as_enum)
            .is_some_and(|episode| episode.as_str() == "EMPIRE");
        if wants_luke {
            Ok(FieldValue::owned(
                ctx.human(1000).ok_or_else(|| "Luke is missing".to_string())?,
            ))
        } else {
            Ok(FieldValue::owned(
                ctx.droid(2001)
                    .ok_or_else(|| "R2-D2 is missing".to_string())?,
            ))
        }
    })
}

fn human_by_id<'r>(
    ctx: &'r StarWars,
    _src: &'r FieldValue<StarWars>,
    args: &'r Arguments,
) -> BoxFuture<'r, Result<FieldValue<StarWars>, String>> {
    Box::pin(async move {
        let id = args
            .get("id")
            .and_then(ConstValue::as_i64)
            .ok_or_else(|| "argument `id` must be an Int".to_string())?;
        Ok(match ctx.human(id) {
            Some(human) => FieldValue::owned(human),
            None => FieldValue::Null,
        })
    })
}

/// The Star Wars schema: a `Character` interface implemented by `Human` and
/// `Droid`, hero/human/droid lookups on the query root and name-updating
/// fields on the mutation root.
pub fn star_wars_schema() -> Schema<StarWars> {
    let episode = enum_type(
        "Episode",
        vec![
            enum_value("NEWHOPE"),
            enum_value("EMPIRE"),
            enum_value("JEDI"),
        ],
    );

    let character = interface("Character", {
        let episode = episode.clone();
        move |character: &Arc<_>| {
            vec![
                field("id", int(), vec![], |_: &StarWars, src, _| {
                    human_src(src)
                        .map(|h| h.id)
                        .or_else(|_| droid_src(src).map(|d| d.id))
                        .map(FieldValue::value)
                }),
                field("name", string(), vec![], |_: &StarWars, src, _| {
                    human_src(src)
                        .map(|h| h.name.clone())
                        .or_else(|_| droid_src(src).map(|d| d.name.clone()))
                        .map(FieldValue::value)
                }),
                field(
                    "friends",
                    OutputType::list(OutputType::abstract_type(character.clone())),
                    vec![],
                    |ctx: &StarWars, src, _| {
                        human_src(src)
                            .map(|h| h.friend_ids.clone())
                            .or_else(|_| droid_src(src).map(|d| d.friend_ids.clone()))
                            .map(|ids| friends_of(ctx, &ids))
                    },
                ),
                field(
                    "appearsIn",
                    OutputType::list(OutputType::enumeration(episode.clone())),
                    vec![],
                    |_: &StarWars, src, _| {
                        human_src(src)
                            .map(|h| h.appears_in.clone())
                            .or_else(|_| droid_src(src).map(|d| d.appears_in.clone()))
                            .map(|episode_names| episodes(&episode_names))
                    },
                ),
            ]
        }
    });

    let human_type = obj("Human", {
        let episode = episode.clone();
        let character = character.clone();
        move |_| {
            vec![
                field("id", int(), vec![], |_: &StarWars, src, _| {
                    human_src(src).map(|h| FieldValue::value(h.id))
                }),
                field("name", string(), vec![], |_: &StarWars, src, _| {
                    human_src(src).map(|h| FieldValue::value(h.name.clone()))
                }),
                field(
                    "friends",
                    OutputType::list(OutputType::abstract_type(character.clone())),
                    vec![],
                    |ctx: &StarWars, src, _| {
                        human_src(src).map(|h| friends_of(ctx, &h.friend_ids))
                    },
                ),
                field(
                    "appearsIn",
                    OutputType::list(OutputType::enumeration(episode.clone())),
                    vec![],
                    |_: &StarWars, src, _| human_src(src).map(|h| episodes(&h.appears_in)),
                ),
                field(
                    "homePlanet",
                    OutputType::nullable(string()),
                    vec![],
                    |_: &StarWars, src, _| {
                        human_src(src).map(|h| match h.home_planet {
                            Some(planet) => FieldValue::value(planet),
                            None => FieldValue::Null,
                        })
                    },
                )
                .description("The home planet of the human, or null if unknown."),
            ]
        }
    });

    let droid_type = obj("Droid", {
        let episode = episode.clone();
        let character = character.clone();
        move |_| {
            vec![
                field("id", int(), vec![], |_: &StarWars, src, _| {
                    droid_src(src).map(|d| FieldValue::value(d.id))
                }),
                field("name", string(), vec![], |_: &StarWars, src, _| {
                    droid_src(src).map(|d| FieldValue::value(d.name.clone()))
                }),
                field(
                    "friends",
                    OutputType::list(OutputType::abstract_type(character.clone())),
                    vec![],
                    |ctx: &StarWars, src, _| {
                        droid_src(src).map(|d| friends_of(ctx, &d.friend_ids))
                    },
                ),
                field(
                    "appearsIn",
                    OutputType::list(OutputType::enumeration(episode.clone())),
                    vec![],
                    |_: &StarWars, src, _| droid_src(src).map(|d| episodes(&d.appears_in)),
                ),
                field(
                    "primaryFunction",
                    string(),
                    vec![],
                    |_: &StarWars, src, _| {
                        droid_src(src).map(|d| FieldValue::value(d.primary_function))
                    },
                ),
            ]
        }
    });

    let as_character_human = add_type::<StarWars, Human>(&character, &human_type);
    let as_character_droid = add_type::<StarWars, Droid>(&character, &droid_type);

    let payload = obj("UpdateCharacterPayload", {
        let character = character.clone();
        move |_| {
            vec![
                field(
                    "character",
                    OutputType::nullable(OutputType::abstract_type(character.clone())),
                    vec![],
                    move |_: &StarWars, src, _| {
                        let payload = src
                            .downcast_ref::<UpdatePayload>()
                            .ok_or_else(|| "expected an UpdatePayload source".to_string())?;
                        Ok(match &payload.character {
                            None => FieldValue::Null,
                            Some(CharacterRef::Human(h)) => as_character_human(h.clone()),
                            Some(CharacterRef::Droid(d)) => as_character_droid(d.clone()),
                        })
                    },
                ),
                field(
                    "error",
                    OutputType::nullable(string()),
                    vec![],
                    |_: &StarWars, src, _| {
                        let payload = src
                            .downcast_ref::<UpdatePayload>()
                            .ok_or_else(|| "expected an UpdatePayload source".to_string())?;
                        Ok(match &payload.error {
                            Some(error) => FieldValue::value(error.clone()),
                            None => FieldValue::Null,
                        })
                    },
                ),
            ]
        }
    });

    let query = obj("Query", {
        let episode = episode.clone();
        let character = character.clone();
        let human_type = human_type.clone();
        let droid_type = droid_type.clone();
        move |_| {
            vec![
                async_field(
                    "hero",
                    OutputType::abstract_type(character.clone()),
                    vec![arg(
                        "episode",
                        InputType::nullable(InputType::enumeration(episode.clone())),
                    )],
                    Box::new(hero),
                ),
                async_field(
                    "human",
                    OutputType::nullable(OutputType::object(human_type.clone())),
                    vec![arg("id", input_int())],
                    Box::new(human_by_id),
                ),
                field(
                    "droid",
                    OutputType::nullable(OutputType::object(droid_type.clone())),
                    vec![arg("id", input_int())],
                    |ctx: &StarWars, _src, args| {
                        let id = args
                            .get("id")
                            .and_then(ConstValue::as_i64)
                            .ok_or_else(|| "argument `id` must be an Int".to_string())?;
                        Ok(match ctx.droid(id) {
                            Some(droid) => FieldValue::owned(droid),
                            None => FieldValue::Null,
                        })
                    },
                ),
            ]
        }
    });

    let mutation = obj("Mutation", {
        let payload = payload.clone();
        move |_| {
            vec![
                field(
                    "updateCharacterName",
                    OutputType::object(payload.clone()),
                    vec![arg("id", input_int()), arg("name", input_string())],
                    |ctx: &StarWars, _src, args| {
                        let id = args
                            .get("id")
                            .and_then(ConstValue::as_i64)
                            .ok_or_else(|| "argument `id` must be an Int".to_string())?;
                        let new_name = args
                            .get("name")
                            .and_then(ConstValue::as_str)
                            .ok_or_else(|| "argument `name` must be a String".to_string())?;
                        Ok(FieldValue::owned(match ctx.rename_human(id, new_name) {
                            Some(human) => UpdatePayload {
                                character: Some(CharacterRef::Human(human)),
                                error: None,
                            },
                            None => UpdatePayload {
                                character: None,
                                error: Some(format!("No human with id {id}")),
                            },
                        }))
                    },
                ),
                field(
                    "appendToName",
                    OutputType::object(payload.clone()),
                    vec![arg("id", input_int()), arg("suffix", input_string())],
                    |ctx: &StarWars, _src, args| {
                        let id = args
                            .get("id")
                            .and_then(ConstValue::as_i64)
                            .ok_or_else(|| "argument `id` must be an Int".to_string())?;
                        let suffix = args
                            .get("suffix")
                            .and_then(ConstValue::as_str)
                            .ok_or_else(|| "argument `suffix` must be a String".to_string())?;
                        Ok(FieldValue::owned(
                            match ctx.append_to_human_name(id, suffix) {
                                Some(human) => UpdatePayload {
                                    character: Some(CharacterRef::Human(human)),
                                    error: None,
                                },
                                None => UpdatePayload {
                                    character: None,
                                    error: Some(format!("No human with id {id}")),
                                },
                            },
                        ))
                    },
                ),
            ]
        }
    });

    Schema::new(query).with_mutation(mutation)
}
