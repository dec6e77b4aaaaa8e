use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::common::Name;

/// A constant GraphQL value, for example `1` or `"Hello World!"`.
///
/// This shape serves both sides of execution: literals in a parsed document
/// (minus variables, see [`Value`]) and the values produced for the
/// response. Object keys preserve insertion order so a response object
/// reads back in selection order.
///
/// [Reference](https://spec.graphql.org/October2021/#Value).
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    /// `null`.
    Null,
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An enum value. These are typically in `SCREAMING_SNAKE_CASE`.
    Enum(Name),
    /// A list of values.
    List(Vec<ConstValue>),
    /// An object, as an ordered map of keys to values.
    Object(IndexMap<Name, ConstValue>),
}

impl ConstValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ConstValue::Null => "NULL",
            ConstValue::Int(_) => "INT",
            ConstValue::Float(_) => "FLOAT",
            ConstValue::String(_) => "STRING",
            ConstValue::Boolean(_) => "BOOLEAN",
            ConstValue::Enum(_) => "ENUM",
            ConstValue::List(_) => "LIST",
            ConstValue::Object(_) => "OBJECT",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            // Both integer and float input values are accepted for Float type.
            // Ref: https://spec.graphql.org/October2021/#sec-Float.Input-Coercion
            ConstValue::Float(f) => Some(*f),
            ConstValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Name> {
        match self {
            ConstValue::Enum(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConstValue]> {
        match self {
            ConstValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<Name, ConstValue>> {
        match self {
            ConstValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConstValue::Null => serde_json::Value::Null,
            ConstValue::Int(i) => serde_json::json!(i),
            ConstValue::Float(f) => serde_json::json!(f),
            ConstValue::String(s) => serde_json::json!(s),
            ConstValue::Boolean(b) => serde_json::json!(b),
            ConstValue::Enum(e) => serde_json::json!(e.as_str()),
            ConstValue::List(l) => {
                serde_json::Value::Array(l.iter().map(ConstValue::to_json).collect())
            }
            ConstValue::Object(o) => serde_json::Value::Object(
                o.iter()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

// Enums serialize as their name; objects serialize in insertion order.
impl Serialize for ConstValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConstValue::Null => serializer.serialize_unit(),
            ConstValue::Int(i) => serializer.serialize_i64(*i),
            ConstValue::Float(f) => serializer.serialize_f64(*f),
            ConstValue::String(s) => serializer.serialize_str(s),
            ConstValue::Boolean(b) => serializer.serialize_bool(*b),
            ConstValue::Enum(e) => serializer.serialize_str(e.as_str()),
            ConstValue::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for value in l {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            ConstValue::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (name, value) in o {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<i64> for ConstValue {
    fn from(value: i64) -> Self {
        ConstValue::Int(value)
    }
}

impl From<f64> for ConstValue {
    fn from(value: f64) -> Self {
        ConstValue::Float(value)
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Boolean(value)
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::String(value.to_string())
    }
}

impl From<String> for ConstValue {
    fn from(value: String) -> Self {
        ConstValue::String(value)
    }
}

/// A GraphQL value as written in a query, for example `1` or `$name`. This
/// is [`ConstValue`] extended with variables.
///
/// [Reference](https://spec.graphql.org/October2021/#Value).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A variable, without the `$`.
    Variable(Name),
    /// `null`.
    Null,
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An enum value.
    Enum(Name),
    /// A list of values.
    List(Vec<Value>),
    /// An object, as an ordered map of keys to values.
    Object(IndexMap<Name, Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Variable(_) => "VARIABLE",
            Value::Null => "NULL",
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Enum(_) => "ENUM",
            Value::List(_) => "LIST",
            Value::Object(_) => "OBJECT",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<ConstValue> for Value {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Null => Value::Null,
            ConstValue::Int(i) => Value::Int(i),
            ConstValue::Float(f) => Value::Float(f),
            ConstValue::String(s) => Value::String(s),
            ConstValue::Boolean(b) => Value::Boolean(b),
            ConstValue::Enum(e) => Value::Enum(e),
            ConstValue::List(l) => Value::List(l.into_iter().map(Value::from).collect()),
            ConstValue::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
