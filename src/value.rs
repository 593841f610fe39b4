//! Dynamic values checked and converted by generated functions.

use std::fmt;

use facet_core::Facet;
use facet_reflect::{HasFields, Peek};
use indexmap::IndexMap;

use crate::{Result, SerdeErrorKind};

/// An instance of a record: its type name and field values.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    /// Name of the record type the value was built from.
    pub type_name: String,
    /// Field values keyed by declared field name.
    pub fields: IndexMap<String, Value>,
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    #[allow(missing_docs)]
    Bool(bool),
    #[allow(missing_docs)]
    Int(i64),
    #[allow(missing_docs)]
    Float(f64),
    #[allow(missing_docs)]
    Str(String),
    #[allow(missing_docs)]
    Bytes(Vec<u8>),
    #[allow(missing_docs)]
    List(Vec<Value>),
    /// Unordered collection; duplicates are the producer's concern.
    Set(Vec<Value>),
    #[allow(missing_docs)]
    Tuple(Vec<Value>),
    /// Key/value pairs in insertion order.
    Dict(Vec<(Value, Value)>),
    /// A record instance.
    Record(RecordValue),
}

impl Value {
    /// Builds a record instance.
    pub fn record<K: Into<String>>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Record(RecordValue {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Builds a mapping with string keys.
    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Str(k.into()), v))
                .collect(),
        )
    }

    /// Converts any facet value into a dynamic [`Value`].
    pub fn of<'a, T: Facet<'a>>(value: &'a T) -> Result<Self> {
        Self::from_peek(Peek::new(value))
    }

    /// Walks a reflected value once and copies it into a dynamic [`Value`].
    ///
    /// Supports options, strings, booleans, integers up to 64 bits, floats,
    /// maps, sets, list-likes, tuples and structs.
    pub fn from_peek(peek: Peek<'_, '_>) -> Result<Self> {
        if let Ok(opt_peek) = peek.into_option() {
            return match opt_peek.value() {
                Some(inner) => Self::from_peek(inner),
                None => Ok(Value::Null),
            };
        }

        let peek = peek.innermost_peek();

        if let Some(s) = peek.as_str() {
            return Ok(Value::Str(s.to_string()));
        }
        if let Ok(v) = peek.get::<bool>() {
            return Ok(Value::Bool(*v));
        }

        macro_rules! ints {
            ($($ty:ty),*) => {
                $(
                    if let Ok(v) = peek.get::<$ty>() {
                        return Ok(Value::Int(i64::from(*v)));
                    }
                )*
            };
        }
        ints!(i8, i16, i32, i64, u8, u16, u32);

        if let Ok(v) = peek.get::<u64>() {
            return i64::try_from(*v)
                .map(Value::Int)
                .map_err(|_| SerdeErrorKind::UnsupportedType(format!("u64 value {v}")).into());
        }
        if let Ok(v) = peek.get::<f32>() {
            return Ok(Value::Float(f64::from(*v)));
        }
        if let Ok(v) = peek.get::<f64>() {
            return Ok(Value::Float(*v));
        }

        let type_name = peek.shape().type_identifier;

        if let Ok(map_peek) = peek.into_map() {
            let entries = map_peek
                .iter()
                .map(|(k, v)| Ok((Self::from_peek(k)?, Self::from_peek(v)?)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Dict(entries));
        }

        if let Ok(set_peek) = peek.into_set() {
            let items = set_peek
                .iter()
                .map(Self::from_peek)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Set(items));
        }

        if let Ok(list_peek) = peek.into_list_like() {
            let items = list_peek
                .iter()
                .map(Self::from_peek)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::List(items));
        }

        if let Ok(tuple_peek) = peek.into_tuple() {
            let items = tuple_peek
                .fields()
                .map(|(_, field_peek)| Self::from_peek(field_peek))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Tuple(items));
        }

        if let Ok(struct_peek) = peek.into_struct() {
            let mut fields = IndexMap::new();
            for (field, field_peek) in struct_peek.fields() {
                fields.insert(field.name.to_string(), Self::from_peek(field_peek)?);
            }
            return Ok(Value::Record(RecordValue {
                type_name: type_name.to_string(),
                fields,
            }));
        }

        Err(SerdeErrorKind::UnsupportedType(type_name.to_string()).into())
    }

    /// Runtime type name, as used in error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Null => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Record(record) => &record.type_name,
        }
    }

    #[allow(missing_docs)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[allow(missing_docs)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Looks up a record field or a string-keyed mapping entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.fields.get(key),
            Value::Dict(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Truthiness: null, `false`, zero and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) | Value::Set(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Record(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
            f.write_str(open)?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(close)
        }

        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::List(items) => seq(f, "[", items, "]"),
            Value::Set(items) => seq(f, "{", items, "}"),
            Value::Tuple(items) => seq(f, "(", items, ")"),
            Value::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Record(record) => {
                write!(f, "{}(", record.type_name)?;
                for (i, (k, v)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
