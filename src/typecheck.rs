//! Type check modes and value coercion.

use crate::{
    Result, SerdeErrorKind,
    check::is_instance,
    descriptor::{Primitive, TypeDescriptor},
    registry::Registry,
    value::Value,
};

/// How strictly values are checked against their declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeCheck {
    /// No check performed.
    #[default]
    NoCheck,
    /// Values are coerced into the declared type.
    Coerce,
    /// Values are strictly checked against the declared type.
    Strict,
}

impl TypeCheck {
    #[allow(missing_docs)]
    pub fn is_strict(self) -> bool {
        self == TypeCheck::Strict
    }

    #[allow(missing_docs)]
    pub fn is_coerce(self) -> bool {
        self == TypeCheck::Coerce
    }

    #[allow(missing_docs)]
    pub fn is_no_check(self) -> bool {
        self == TypeCheck::NoCheck
    }

    /// Applies the mode to `value` declared as `ty`.
    ///
    /// `NoCheck` returns the value untouched, `Coerce` goes through
    /// [`coerce`], `Strict` fails on any structural mismatch.
    pub fn apply(self, registry: &Registry, ty: &TypeDescriptor, value: Value) -> Result<Value> {
        match self {
            TypeCheck::NoCheck => Ok(value),
            TypeCheck::Coerce => coerce(registry, ty, value),
            TypeCheck::Strict if is_instance(registry, &value, ty) => Ok(value),
            TypeCheck::Strict => Err(SerdeErrorKind::NotInstance {
                value: value.to_string(),
                expected: ty.typename(),
            }
            .into()),
        }
    }
}

/// Whether coercion is attempted at all: null is never coerced.
pub fn is_coercible(_ty: &TypeDescriptor, value: &Value) -> bool {
    !value.is_null()
}

/// Constructs the declared type from `value`.
///
/// Null and already conforming values are returned unchanged. Scalars
/// convert between each other when the conversion is well defined; anything
/// else is a [`SerdeErrorKind::Coercion`] error.
pub fn coerce(registry: &Registry, ty: &TypeDescriptor, value: Value) -> Result<Value> {
    if !is_coercible(ty, &value) || is_instance(registry, &value, ty) {
        return Ok(value);
    }

    let failed = |value: &Value| -> crate::SerdeError {
        SerdeErrorKind::Coercion {
            value: value.to_string(),
            expected: ty.typename(),
        }
        .into()
    };

    match ty {
        TypeDescriptor::Primitive(p) => coerce_primitive(*p, &value).ok_or_else(|| failed(&value)),
        TypeDescriptor::Optional(inner) | TypeDescriptor::NewType { base: inner, .. } => {
            coerce(registry, inner, value)
        }
        _ => Err(failed(&value)),
    }
}

fn coerce_primitive(p: Primitive, value: &Value) -> Option<Value> {
    match p {
        Primitive::Bool => Some(Value::Bool(value.is_truthy())),
        Primitive::Int => match value {
            Value::Bool(b) => Some(Value::Int(i64::from(*b))),
            Value::Float(f) => {
                let t = f.trunc();
                // i64::MAX as f64 rounds up to 2^63, which is out of range
                (t >= i64::MIN as f64 && t < i64::MAX as f64).then(|| Value::Int(t as i64))
            }
            Value::Str(s) => s.trim().parse().ok().map(Value::Int),
            _ => None,
        },
        Primitive::Float => match value {
            Value::Bool(b) => Some(Value::Float(f64::from(u8::from(*b)))),
            Value::Int(i) => Some(Value::Float(*i as f64)),
            Value::Str(s) => s.trim().parse().ok().map(Value::Float),
            _ => None,
        },
        Primitive::Str => match value {
            Value::Bool(b) => Some(Value::Str(b.to_string())),
            Value::Int(i) => Some(Value::Str(i.to_string())),
            Value::Float(f) => Some(Value::Str(f.to_string())),
            Value::Bytes(b) => String::from_utf8(b.clone()).ok().map(Value::Str),
            _ => None,
        },
        Primitive::Bytes => match value {
            Value::Str(s) => Some(Value::Bytes(s.as_bytes().to_vec())),
            _ => None,
        },
    }
}
