use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter, Write};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid GraphQL name")]
pub struct InvalidGraphQlName(pub String);

/// A valid GraphQL name.
///
/// [Reference](https://spec.graphql.org/October2021/#sec-Names).
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(s: &str) -> Result<Name, InvalidGraphQlName> {
        Name::from_str(s)
    }

    pub fn get(&self) -> &SmolStr {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Name {
    type Err = InvalidGraphQlName;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if is_valid_graphql_name(s) {
            Ok(Name(SmolStr::new(s)))
        } else {
            Err(InvalidGraphQlName(s.into()))
        }
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Name::new(&s).map_err(serde::de::Error::custom)
    }
}

fn match_first(c: char) -> bool {
    c == '_' || c.is_ascii_uppercase() || c.is_ascii_lowercase()
}

fn match_body(c: char) -> bool {
    match_first(c) || c.is_ascii_digit()
}

fn is_valid_graphql_name(text: &str) -> bool {
    if let Some(first) = text.chars().next() {
        let body = &text[first.len_utf8()..];
        match_first(first) && body.chars().all(match_body)
    } else {
        false
    }
}

/// Build a name from a literal known to be valid.
#[macro_export]
macro_rules! mk_name {
    ($name:literal) => {
        $crate::common::Name::new($name).unwrap()
    };
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Hashes and compares like the underlying string, so string keys can look
// up `Name`-keyed maps.
impl std::borrow::Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

/// The name of a GraphQL type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName(pub Name);

impl TypeName {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A response-key alias on a selected field.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alias(pub Name);

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The type of an operation; `query`, `mutation` or `subscription`.
///
/// [Reference](https://spec.graphql.org/October2021/#OperationType).
#[derive(Serialize, Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

/// A GraphQL type reference, for example `String` or `[String!]!`.
///
/// [Reference](https://spec.graphql.org/October2021/#Type).
#[derive(Serialize, Deserialize, Hash, Debug, PartialEq, Eq, Clone)]
pub struct TypeContainer<T> {
    /// The base type.
    pub base: BaseTypeContainer<T>,
    /// Whether the type is nullable.
    pub nullable: bool,
}

pub type Type = TypeContainer<TypeName>;

impl<T> TypeContainer<T> {
    pub fn named_non_null(named: T) -> TypeContainer<T> {
        TypeContainer {
            base: BaseTypeContainer::Named(named),
            nullable: false,
        }
    }

    pub fn named_null(named: T) -> TypeContainer<T> {
        TypeContainer {
            base: BaseTypeContainer::Named(named),
            nullable: true,
        }
    }

    pub fn list_null(element_type: TypeContainer<T>) -> TypeContainer<T> {
        TypeContainer {
            base: BaseTypeContainer::List(Box::new(element_type)),
            nullable: true,
        }
    }

    pub fn list_non_null(element_type: TypeContainer<T>) -> TypeContainer<T> {
        TypeContainer {
            base: BaseTypeContainer::List(Box::new(element_type)),
            nullable: false,
        }
    }

    pub fn underlying_type(&self) -> &T {
        match &self.base {
            BaseTypeContainer::Named(n) => n,
            BaseTypeContainer::List(ty) => ty.underlying_type(),
        }
    }

    pub fn is_list(&self) -> bool {
        match &self.base {
            BaseTypeContainer::Named(_) => false,
            BaseTypeContainer::List(_) => true,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.base.fmt(f)?;
        if !self.nullable {
            f.write_char('!')?;
        }
        Ok(())
    }
}

/// A base type reference without its own nullability; see [`TypeContainer`].
#[derive(Serialize, Deserialize, Hash, Debug, PartialEq, Eq, Clone)]
pub enum BaseTypeContainer<T> {
    /// A named type, such as `String`.
    Named(T),
    /// A list type, such as `[String]`.
    List(Box<TypeContainer<T>>),
}

pub type BaseType = BaseTypeContainer<TypeName>;

impl Display for BaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => name.fmt(f),
            Self::List(ty) => write!(f, "[{ty}]"),
        }
    }
}
