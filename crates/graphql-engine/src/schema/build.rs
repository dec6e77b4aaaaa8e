//! Builders for schema types, fields and arguments.
//!
//! Object and interface field lists are closures forced on first access;
//! the closure handed to [`obj`] receives an `Arc` of the object under
//! construction so recursive schemas can close over their own type.

use std::any::Any;
use std::sync::{Arc, RwLock, Weak};

use graphql_ast::common::{Name, TypeName};
use graphql_ast::value::ConstValue;

use super::{
    AbstractType, AbstractTypeKind, AsyncResolveFn, DeprecationStatus, EnumType, EnumValueDef,
    Field, FieldValue, InputObjectType, InputScalar, InputType, InputValueDef, ObjectType,
    OutputType, Resolver, ScalarType, Thunk,
};

fn name(s: &str) -> Name {
    Name::new(s).expect("invalid GraphQL name")
}

fn type_name(s: &str) -> TypeName {
    TypeName(name(s))
}

/// Build an object type. `fields` is evaluated on first access and receives
/// the object itself, so field builders may reference it recursively.
pub fn obj<Ctx: 'static, F>(object_name: &str, fields: F) -> Arc<ObjectType<Ctx>>
where
    F: FnOnce(&Arc<ObjectType<Ctx>>) -> Vec<Field<Ctx>> + Send + 'static,
{
    Arc::new_cyclic(|weak: &Weak<ObjectType<Ctx>>| {
        let weak = weak.clone();
        ObjectType {
            name: type_name(object_name),
            description: None,
            fields: Thunk::new(move || {
                // forcing only happens through a live `Arc`
                let this = weak
                    .upgrade()
                    .expect("object type dropped before its fields were forced");
                fields(&this)
            }),
            abstracts: RwLock::new(Vec::new()),
        }
    })
}

/// Build an interface type. As with [`obj`], the field list is lazy and
/// receives the interface under construction.
pub fn interface<Ctx: 'static, F>(interface_name: &str, fields: F) -> Arc<AbstractType<Ctx>>
where
    F: FnOnce(&Arc<AbstractType<Ctx>>) -> Vec<Field<Ctx>> + Send + 'static,
{
    Arc::new_cyclic(|weak: &Weak<AbstractType<Ctx>>| {
        let weak = weak.clone();
        AbstractType {
            name: type_name(interface_name),
            description: None,
            kind: AbstractTypeKind::Interface(Thunk::new(move || {
                let this = weak
                    .upgrade()
                    .expect("interface type dropped before its fields were forced");
                fields(&this)
            })),
            types: RwLock::new(Vec::new()),
        }
    })
}

/// Build a union type. Members are registered with [`add_type`].
pub fn union<Ctx>(union_name: &str) -> Arc<AbstractType<Ctx>> {
    Arc::new(AbstractType {
        name: type_name(union_name),
        description: None,
        kind: AbstractTypeKind::Union,
        types: RwLock::new(Vec::new()),
    })
}

/// Register `object` as a member of a union or interface.
///
/// Returns the coercion used inside resolvers to tag a concrete value with
/// its concrete object type when it flows through an abstract-typed field.
/// Untagged [`FieldValue::owned`] sources of type `T` are recognized too,
/// so resolvers built before this registration can stay coercion-free.
pub fn add_type<Ctx, T: Any + Send + Sync>(
    abstract_type: &Arc<AbstractType<Ctx>>,
    object: &Arc<ObjectType<Ctx>>,
) -> impl Fn(T) -> FieldValue<Ctx> {
    abstract_type.register_member(
        object.clone(),
        Box::new(|value| value.downcast_ref::<T>().is_some()),
    );
    object.register_abstract(abstract_type.name.clone());
    let object = object.clone();
    move |value: T| FieldValue::Abstract {
        object: object.clone(),
        value: Box::new(FieldValue::owned(value)),
    }
}

/// Build a field with a synchronous resolver. The resolver's result is
/// lifted into the engine's future shape at execution time.
pub fn field<Ctx, F>(
    field_name: &str,
    field_type: OutputType<Ctx>,
    arguments: Vec<InputValueDef>,
    resolve: F,
) -> Field<Ctx>
where
    F: Fn(&Ctx, &FieldValue<Ctx>, &super::Arguments) -> Result<FieldValue<Ctx>, String>
        + Send
        + Sync
        + 'static,
{
    Field {
        name: name(field_name),
        description: None,
        deprecation_status: DeprecationStatus::NotDeprecated,
        field_type,
        arguments,
        resolver: Resolver::Sync(Box::new(resolve)),
    }
}

/// Build a field whose resolver suspends; it must return a boxed future.
pub fn async_field<Ctx>(
    field_name: &str,
    field_type: OutputType<Ctx>,
    arguments: Vec<InputValueDef>,
    resolve: AsyncResolveFn<Ctx>,
) -> Field<Ctx> {
    Field {
        name: name(field_name),
        description: None,
        deprecation_status: DeprecationStatus::NotDeprecated,
        field_type,
        arguments,
        resolver: Resolver::Async(resolve),
    }
}

/// A required argument. The argument is optional to callers only when
/// `field_type` is nullable.
pub fn arg(argument_name: &str, field_type: InputType) -> InputValueDef {
    InputValueDef {
        name: name(argument_name),
        description: None,
        field_type,
        default_value: None,
        deprecation_status: DeprecationStatus::NotDeprecated,
    }
}

/// An optional argument whose absence supplies `default`. The declared type
/// is made nullable, matching the call sites where the argument may be
/// omitted.
pub fn default_arg(
    argument_name: &str,
    field_type: InputType,
    default: ConstValue,
) -> InputValueDef {
    InputValueDef {
        name: name(argument_name),
        description: None,
        field_type: InputType::nullable(field_type),
        default_value: Some(default),
        deprecation_status: DeprecationStatus::NotDeprecated,
    }
}

/// Build a custom output scalar from its serialization function.
pub fn scalar<Ctx>(scalar_name: &str, serialize: super::SerializeFn) -> OutputType<Ctx> {
    OutputType::Scalar(Arc::new(ScalarType::new(type_name(scalar_name), serialize)))
}

/// Build a custom input scalar from its parse function.
pub fn input_scalar(scalar_name: &str, parse: super::ParseFn) -> InputType {
    InputType::Scalar(Arc::new(InputScalar::new(type_name(scalar_name), parse)))
}

/// Build an enum type, usable on both the input and the output side via
/// [`InputType::enumeration`] and [`OutputType::enumeration`].
pub fn enum_type(enum_name: &str, values: Vec<EnumValueDef>) -> Arc<EnumType> {
    Arc::new(EnumType {
        name: type_name(enum_name),
        description: None,
        values,
    })
}

pub fn enum_value(value: &str) -> EnumValueDef {
    EnumValueDef {
        value: name(value),
        description: None,
        deprecation_status: DeprecationStatus::NotDeprecated,
    }
}

/// Build an input object type.
pub fn input_object(object_name: &str, fields: Vec<InputValueDef>) -> InputType {
    InputType::InputObject(Arc::new(InputObjectType {
        name: type_name(object_name),
        description: None,
        fields,
    }))
}

fn expecting(type_name: &str, value: &ConstValue, ok: bool) -> Result<ConstValue, String> {
    if ok {
        Ok(value.clone())
    } else {
        Err(format!("Invalid {type_name}"))
    }
}

/// The built-in `Int` output scalar.
pub fn int<Ctx>() -> OutputType<Ctx> {
    scalar("Int", Box::new(|v| expecting("Int", v, v.as_i64().is_some())))
}

/// The built-in `Float` output scalar. Integers are accepted and widened.
pub fn float<Ctx>() -> OutputType<Ctx> {
    scalar(
        "Float",
        Box::new(|v| match v.as_f64() {
            Some(f) => Ok(ConstValue::Float(f)),
            None => Err("Invalid Float".to_string()),
        }),
    )
}

/// The built-in `String` output scalar.
pub fn string<Ctx>() -> OutputType<Ctx> {
    scalar(
        "String",
        Box::new(|v| expecting("String", v, v.as_str().is_some())),
    )
}

/// The built-in `Boolean` output scalar.
pub fn boolean<Ctx>() -> OutputType<Ctx> {
    scalar(
        "Boolean",
        Box::new(|v| expecting("Boolean", v, v.as_bool().is_some())),
    )
}

/// The built-in `Int` input scalar.
pub fn input_int() -> InputType {
    input_scalar("Int", Box::new(|v| expecting("Int", v, v.as_i64().is_some())))
}

/// The built-in `Float` input scalar. Integer literals coerce to floats.
/// Ref: <https://spec.graphql.org/October2021/#sec-Float.Input-Coercion>
pub fn input_float() -> InputType {
    input_scalar(
        "Float",
        Box::new(|v| match v.as_f64() {
            Some(f) => Ok(ConstValue::Float(f)),
            None => Err("Invalid Float".to_string()),
        }),
    )
}

/// The built-in `String` input scalar.
pub fn input_string() -> InputType {
    input_scalar(
        "String",
        Box::new(|v| expecting("String", v, v.as_str().is_some())),
    )
}

/// The built-in `Boolean` input scalar.
pub fn input_boolean() -> InputType {
    input_scalar(
        "Boolean",
        Box::new(|v| expecting("Boolean", v, v.as_bool().is_some())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(output: OutputType<()>, input: InputType, value: ConstValue) {
        let OutputType::Scalar(scalar) = output else {
            panic!("not an output scalar")
        };
        let InputType::Scalar(parser) = input else {
            panic!("not an input scalar")
        };
        let serialized = scalar.serialize(&value).unwrap();
        assert_eq!(parser.parse(&serialized).unwrap(), serialized);
    }

    #[test]
    fn test_builtin_scalar_round_trips() {
        round_trip(int(), input_int(), ConstValue::Int(42));
        round_trip(float(), input_float(), ConstValue::Float(1.5));
        round_trip(string(), input_string(), ConstValue::from("hi"));
        round_trip(boolean(), input_boolean(), ConstValue::Boolean(true));
    }

    #[test]
    fn test_builtin_scalars_reject_mismatched_values() {
        let OutputType::Scalar(scalar) = int::<()>() else {
            panic!("not an output scalar")
        };
        assert_eq!(
            scalar.serialize(&ConstValue::from("x")).unwrap_err(),
            "Invalid Int"
        );
    }

    #[test]
    fn test_float_widens_integers() {
        let InputType::Scalar(parser) = input_float() else {
            panic!("not an input scalar")
        };
        assert_eq!(parser.parse(&ConstValue::Int(2)).unwrap(), ConstValue::Float(2.0));
    }
}
