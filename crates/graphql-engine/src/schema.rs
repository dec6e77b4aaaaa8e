//! The schema model: type descriptors, field definitions and resolvers.
//!
//! Named types (`ObjectType`, `AbstractType`, `EnumType`, scalars and input
//! objects) are shared behind `Arc`s and referenced structurally by the
//! [`OutputType`] / [`InputType`] wrapper enums. Object and interface field
//! lists are held in a one-shot memoized [`Thunk`] so that mutually
//! recursive schemas can be built without ordering constraints.

use std::any::Any;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use futures_util::future::{self, BoxFuture};
use graphql_ast::common::{Name, Type, TypeName};
use graphql_ast::value::ConstValue;
use serde::Serialize;

pub use crate::execute::arguments::Arguments;

pub mod build;

/// A memoized field-list cell, forced on first access.
///
/// Forcing is idempotent; the stored closure runs at most once. A closure
/// must not force the cell it initializes.
pub struct Thunk<T> {
    cell: OnceLock<T>,
    init: Mutex<Option<Box<dyn FnOnce() -> T + Send>>>,
}

impl<T> Thunk<T> {
    pub fn new(init: impl FnOnce() -> T + Send + 'static) -> Self {
        Thunk {
            cell: OnceLock::new(),
            init: Mutex::new(Some(Box::new(init))),
        }
    }

    pub fn ready(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Thunk {
            cell,
            init: Mutex::new(None),
        }
    }

    pub fn force(&self) -> &T {
        self.cell.get_or_init(|| {
            let init = self
                .init
                .lock()
                .expect("thunk lock poisoned")
                .take()
                .expect("thunk has neither a value nor an initializer");
            init()
        })
    }
}

/// Whether an item is deprecated, with an optional reason.
#[derive(Serialize, Debug, PartialEq, Clone, Default)]
pub enum DeprecationStatus {
    #[default]
    NotDeprecated,
    Deprecated {
        reason: Option<String>,
    },
}

impl DeprecationStatus {
    pub fn new_deprecated(reason: Option<&str>) -> Self {
        DeprecationStatus::Deprecated {
            reason: reason.map(ToString::to_string),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, DeprecationStatus::Deprecated { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DeprecationStatus::NotDeprecated => None,
            DeprecationStatus::Deprecated { reason } => reason.as_deref(),
        }
    }
}

pub type SerializeFn = Box<dyn Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync>;
pub type ParseFn = Box<dyn Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync>;

/// An output scalar: a named leaf type with a serialization function from
/// the resolver-produced leaf value to a response value.
pub struct ScalarType {
    pub name: TypeName,
    pub description: Option<String>,
    serialize: SerializeFn,
}

impl ScalarType {
    pub fn new(name: TypeName, serialize: SerializeFn) -> ScalarType {
        ScalarType {
            name,
            description: None,
            serialize,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub(crate) fn serialize(&self, value: &ConstValue) -> Result<ConstValue, String> {
        (self.serialize)(value)
    }
}

/// An input scalar: a named leaf type with a parse function over
/// variable-free constant values.
pub struct InputScalar {
    pub name: TypeName,
    pub description: Option<String>,
    parse: ParseFn,
}

impl InputScalar {
    pub fn new(name: TypeName, parse: ParseFn) -> InputScalar {
        InputScalar {
            name,
            description: None,
            parse,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub(crate) fn parse(&self, value: &ConstValue) -> Result<ConstValue, String> {
        (self.parse)(value)
    }
}

/// An enum type. The same descriptor serves input and output positions.
pub struct EnumType {
    pub name: TypeName,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumType {
    pub fn lookup(&self, name: &Name) -> Option<&EnumValueDef> {
        self.values.iter().find(|v| &v.value == name)
    }
}

pub struct EnumValueDef {
    pub value: Name,
    pub description: Option<String>,
    pub deprecation_status: DeprecationStatus,
}

impl EnumValueDef {
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::new_deprecated(reason);
        self
    }
}

/// An input object type. Coercion against its field list produces an
/// ordered constant object.
pub struct InputObjectType {
    pub name: TypeName,
    pub description: Option<String>,
    pub fields: Vec<InputValueDef>,
}

/// An argument or input object field descriptor.
pub struct InputValueDef {
    pub name: Name,
    pub description: Option<String>,
    pub field_type: InputType,
    pub default_value: Option<ConstValue>,
    pub deprecation_status: DeprecationStatus,
}

impl InputValueDef {
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::new_deprecated(reason);
        self
    }
}

/// The description of an input position: a named input type or a
/// nullable/list wrapper around one.
#[derive(Clone)]
pub enum InputType {
    Scalar(Arc<InputScalar>),
    Enum(Arc<EnumType>),
    InputObject(Arc<InputObjectType>),
    List(Box<InputType>),
    Nullable(Box<InputType>),
}

impl InputType {
    pub fn enumeration(enum_type: Arc<EnumType>) -> InputType {
        InputType::Enum(enum_type)
    }

    pub fn list(element: InputType) -> InputType {
        InputType::List(Box::new(element))
    }

    pub fn nullable(inner: InputType) -> InputType {
        match inner {
            nullable @ InputType::Nullable(_) => nullable,
            other => InputType::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, InputType::Nullable(_))
    }

    /// The GraphQL type reference this descriptor denotes, e.g. `[Episode!]!`.
    pub fn type_ref(&self) -> Type {
        match self {
            InputType::Nullable(inner) => {
                let mut type_ref = inner.type_ref();
                type_ref.nullable = true;
                type_ref
            }
            InputType::List(element) => Type::list_non_null(element.type_ref()),
            InputType::Scalar(scalar) => Type::named_non_null(scalar.name.clone()),
            InputType::Enum(enum_type) => Type::named_non_null(enum_type.name.clone()),
            InputType::InputObject(input_object) => {
                Type::named_non_null(input_object.name.clone())
            }
        }
    }
}

/// The description of an output position: a named output type or a
/// nullable/list wrapper around one.
pub enum OutputType<Ctx> {
    Scalar(Arc<ScalarType>),
    Enum(Arc<EnumType>),
    Object(Arc<ObjectType<Ctx>>),
    Abstract(Arc<AbstractType<Ctx>>),
    List(Box<OutputType<Ctx>>),
    Nullable(Box<OutputType<Ctx>>),
}

// Derived `Clone` would require `Ctx: Clone`.
impl<Ctx> Clone for OutputType<Ctx> {
    fn clone(&self) -> Self {
        match self {
            OutputType::Scalar(scalar) => OutputType::Scalar(scalar.clone()),
            OutputType::Enum(enum_type) => OutputType::Enum(enum_type.clone()),
            OutputType::Object(object) => OutputType::Object(object.clone()),
            OutputType::Abstract(abstract_type) => OutputType::Abstract(abstract_type.clone()),
            OutputType::List(element) => OutputType::List(element.clone()),
            OutputType::Nullable(inner) => OutputType::Nullable(inner.clone()),
        }
    }
}

impl<Ctx> OutputType<Ctx> {
    pub fn object(object: Arc<ObjectType<Ctx>>) -> OutputType<Ctx> {
        OutputType::Object(object)
    }

    pub fn abstract_type(abstract_type: Arc<AbstractType<Ctx>>) -> OutputType<Ctx> {
        OutputType::Abstract(abstract_type)
    }

    pub fn enumeration(enum_type: Arc<EnumType>) -> OutputType<Ctx> {
        OutputType::Enum(enum_type)
    }

    pub fn list(element: OutputType<Ctx>) -> OutputType<Ctx> {
        OutputType::List(Box::new(element))
    }

    pub fn nullable(inner: OutputType<Ctx>) -> OutputType<Ctx> {
        match inner {
            nullable @ OutputType::Nullable(_) => nullable,
            other => OutputType::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, OutputType::Nullable(_))
    }

    /// The GraphQL type reference this descriptor denotes.
    pub fn type_ref(&self) -> Type {
        match self {
            OutputType::Nullable(inner) => {
                let mut type_ref = inner.type_ref();
                type_ref.nullable = true;
                type_ref
            }
            OutputType::List(element) => Type::list_non_null(element.type_ref()),
            OutputType::Scalar(scalar) => Type::named_non_null(scalar.name.clone()),
            OutputType::Enum(enum_type) => Type::named_non_null(enum_type.name.clone()),
            OutputType::Object(object) => Type::named_non_null(object.name.clone()),
            OutputType::Abstract(abstract_type) => {
                Type::named_non_null(abstract_type.name.clone())
            }
        }
    }
}

/// A value produced by a resolver and consumed by the engine while it
/// recurses through the declared output type.
pub enum FieldValue<Ctx> {
    /// The absent value of a nullable position.
    Null,
    /// A leaf value, ready for scalar or enum serialization.
    Value(ConstValue),
    /// A list of values.
    List(Vec<FieldValue<Ctx>>),
    /// An opaque source for the resolvers of an object-typed field.
    Owned(Arc<dyn Any + Send + Sync>),
    /// A concrete member of a union or interface, tagged with its concrete
    /// object type by an `add_type` coercion.
    Abstract {
        object: Arc<ObjectType<Ctx>>,
        value: Box<FieldValue<Ctx>>,
    },
}

impl<Ctx> FieldValue<Ctx> {
    pub fn owned<T: Any + Send + Sync>(value: T) -> FieldValue<Ctx> {
        FieldValue::Owned(Arc::new(value))
    }

    pub fn value(value: impl Into<ConstValue>) -> FieldValue<Ctx> {
        FieldValue::Value(value.into())
    }

    pub fn list(items: impl IntoIterator<Item = FieldValue<Ctx>>) -> FieldValue<Ctx> {
        FieldValue::List(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Value(value) => value.is_null(),
            _ => false,
        }
    }

    /// Downcast an opaque source back to its concrete Rust type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            FieldValue::Owned(any) => any.downcast_ref(),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&ConstValue> {
        match self {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

pub type SyncResolveFn<Ctx> = Box<
    dyn Fn(&Ctx, &FieldValue<Ctx>, &Arguments) -> Result<FieldValue<Ctx>, String> + Send + Sync,
>;

pub type AsyncResolveFn<Ctx> = Box<
    dyn for<'r> Fn(
            &'r Ctx,
            &'r FieldValue<Ctx>,
            &'r Arguments,
        ) -> BoxFuture<'r, Result<FieldValue<Ctx>, String>>
        + Send
        + Sync,
>;

pub(crate) enum Resolver<Ctx> {
    Sync(SyncResolveFn<Ctx>),
    Async(AsyncResolveFn<Ctx>),
}

impl<Ctx> Resolver<Ctx> {
    /// Lift a resolver's outcome into the engine's uniform future shape:
    /// synchronous results are wrapped in an immediately-ready future,
    /// asynchronous results pass through.
    pub(crate) fn call<'r>(
        &'r self,
        ctx: &'r Ctx,
        source: &'r FieldValue<Ctx>,
        arguments: &'r Arguments,
    ) -> BoxFuture<'r, Result<FieldValue<Ctx>, String>> {
        match self {
            Resolver::Sync(resolve) => Box::pin(future::ready(resolve(ctx, source, arguments))),
            Resolver::Async(resolve) => resolve(ctx, source, arguments),
        }
    }
}

/// A field on an object or interface type.
pub struct Field<Ctx> {
    pub name: Name,
    pub description: Option<String>,
    pub deprecation_status: DeprecationStatus,
    pub field_type: OutputType<Ctx>,
    pub arguments: Vec<InputValueDef>,
    pub(crate) resolver: Resolver<Ctx>,
}

impl<Ctx> Field<Ctx> {
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::new_deprecated(reason);
        self
    }
}

/// An object type. The field list is lazy so that field builders can refer
/// to types that are not constructed yet, the object itself included.
pub struct ObjectType<Ctx> {
    pub name: TypeName,
    pub description: Option<String>,
    pub(crate) fields: Thunk<Vec<Field<Ctx>>>,
    // names of the unions and interfaces this object belongs to; written
    // only by `add_type` during schema construction
    abstracts: RwLock<Vec<TypeName>>,
}

impl<Ctx> ObjectType<Ctx> {
    pub fn fields(&self) -> &[Field<Ctx>] {
        self.fields.force()
    }

    pub fn field(&self, name: &Name) -> Option<&Field<Ctx>> {
        self.fields().iter().find(|field| &field.name == name)
    }

    pub fn abstract_names(&self) -> Vec<TypeName> {
        self.abstracts
            .read()
            .expect("abstracts lock poisoned")
            .clone()
    }

    pub(crate) fn register_abstract(&self, name: TypeName) {
        self.abstracts
            .write()
            .expect("abstracts lock poisoned")
            .push(name);
    }
}

pub enum AbstractTypeKind<Ctx> {
    /// A union; members share no declared fields.
    Union,
    /// An interface with a lazy list of declared fields.
    Interface(Thunk<Vec<Field<Ctx>>>),
}

/// A registered member of a union or interface: the concrete object type
/// and a probe recognizing the member's source values.
pub(crate) struct AbstractMember<Ctx> {
    pub(crate) object: Arc<ObjectType<Ctx>>,
    probe: Box<dyn Fn(&FieldValue<Ctx>) -> bool + Send + Sync>,
}

/// A union or interface type together with its registered members.
pub struct AbstractType<Ctx> {
    pub name: TypeName,
    pub description: Option<String>,
    pub kind: AbstractTypeKind<Ctx>,
    types: RwLock<Vec<Arc<AbstractMember<Ctx>>>>,
}

impl<Ctx> AbstractType<Ctx> {
    pub fn members(&self) -> Vec<Arc<ObjectType<Ctx>>> {
        self.types
            .read()
            .expect("members lock poisoned")
            .iter()
            .map(|member| member.object.clone())
            .collect()
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, AbstractTypeKind::Interface(_))
    }

    /// The declared fields of an interface; `None` for unions.
    pub fn interface_fields(&self) -> Option<&[Field<Ctx>]> {
        match &self.kind {
            AbstractTypeKind::Union => None,
            AbstractTypeKind::Interface(fields) => Some(fields.force()),
        }
    }

    /// The concrete object type of an untagged source value, determined by
    /// the member probes.
    pub(crate) fn concrete_type_of(&self, value: &FieldValue<Ctx>) -> Option<Arc<ObjectType<Ctx>>> {
        self.types
            .read()
            .expect("members lock poisoned")
            .iter()
            .find(|member| (member.probe)(value))
            .map(|member| member.object.clone())
    }

    pub(crate) fn register_member(
        &self,
        object: Arc<ObjectType<Ctx>>,
        probe: Box<dyn Fn(&FieldValue<Ctx>) -> bool + Send + Sync>,
    ) {
        self.types
            .write()
            .expect("members lock poisoned")
            .push(Arc::new(AbstractMember { object, probe }));
    }
}

/// A complete schema: a mandatory query root and an optional mutation root.
/// Root resolvers receive [`FieldValue::Null`] as their source.
pub struct Schema<Ctx> {
    pub query: Arc<ObjectType<Ctx>>,
    pub mutation: Option<Arc<ObjectType<Ctx>>>,
}

impl<Ctx> Schema<Ctx> {
    pub fn new(query: Arc<ObjectType<Ctx>>) -> Schema<Ctx> {
        Schema {
            query,
            mutation: None,
        }
    }

    pub fn with_mutation(mut self, mutation: Arc<ObjectType<Ctx>>) -> Schema<Ctx> {
        self.mutation = Some(mutation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_thunk_forces_once() {
        static FORCED: AtomicUsize = AtomicUsize::new(0);
        let thunk = Thunk::new(|| {
            FORCED.fetch_add(1, Ordering::SeqCst);
            42
        });
        assert_eq!(*thunk.force(), 42);
        assert_eq!(*thunk.force(), 42);
        assert_eq!(FORCED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nullable_wrapping_is_idempotent() {
        let ty: OutputType<()> = OutputType::nullable(OutputType::nullable(build::int()));
        assert_eq!(ty.type_ref().to_string(), "Int");
    }

    #[test]
    fn test_type_refs() {
        let ty: OutputType<()> =
            OutputType::list(OutputType::nullable(OutputType::list(build::string())));
        assert_eq!(ty.type_ref().to_string(), "[[String!]]!");
        let input = InputType::nullable(InputType::list(build::input_int()));
        assert_eq!(input.type_ref().to_string(), "[Int!]");
    }
}
