//! Type descriptors and declared record fields.
//!
//! These are the inputs of the crate: structurally comparable descriptions
//! of the types a serializer handles, plus the raw field declarations of
//! record types. They are usually derived from a facet [`Shape`] (see
//! [`TypeDescriptor::from_shape`]) but can be built by hand.
//!
//! [`Shape`]: facet_core::Shape

use std::{fmt, sync::Arc};

use crate::{field::FieldAttrs, value::Value};

/// Scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `bool`
    Bool,
    /// Any integer width.
    Int,
    /// `f32` or `f64`.
    Float,
    /// Owned or borrowed text.
    Str,
    /// Raw bytes.
    Bytes,
}

impl Primitive {
    /// Canonical name of the primitive.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Str => "str",
            Primitive::Bytes => "bytes",
        }
    }
}

/// One admissible value of a literal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    #[allow(missing_docs)]
    Bool(bool),
    #[allow(missing_docs)]
    Int(i64),
    #[allow(missing_docs)]
    Str(String),
}

impl LiteralValue {
    /// Name of the runtime type of this literal.
    pub const fn typename(&self) -> &'static str {
        match self {
            LiteralValue::Bool(_) => Primitive::Bool.name(),
            LiteralValue::Int(_) => Primitive::Int.name(),
            LiteralValue::Str(_) => Primitive::Str.name(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Str(value.to_string())
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

/// Structural description of a type.
///
/// Records are referenced by name: their declared fields live in a
/// [`RecordType`] and their generated functions in the [`Scope`] registered
/// under the same name, which keeps recursive records expressible.
///
/// [`Scope`]: crate::Scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A scalar.
    Primitive(Primitive),
    /// `Option<T>`: absent or `T`.
    Optional(Box<TypeDescriptor>),
    /// Exactly one of the variants, in declaration order.
    Union(Vec<TypeDescriptor>),
    /// A list; `None` is a bare list without element type.
    List(Option<Box<TypeDescriptor>>),
    /// A set; `None` is a bare set without element type.
    Set(Option<Box<TypeDescriptor>>),
    /// A fixed-arity tuple; `None` is a bare tuple.
    Tuple(Option<Vec<TypeDescriptor>>),
    /// A homogeneous tuple of any length.
    VariableTuple(Box<TypeDescriptor>),
    /// A mapping; `None` is a bare mapping.
    Mapping(Option<(Box<TypeDescriptor>, Box<TypeDescriptor>)>),
    /// A record type, by name.
    Record(String),
    /// One of a fixed set of values.
    Literal(Vec<LiteralValue>),
    /// A named alias of `base`.
    NewType {
        /// Alias name.
        name: String,
        /// The aliased type.
        base: Box<TypeDescriptor>,
    },
    /// A parameterized user type, e.g. a generic record.
    Generic {
        /// The unparameterized type.
        origin: Box<TypeDescriptor>,
        /// Type arguments.
        args: Vec<TypeDescriptor>,
    },
    /// Placeholder matching anything.
    Ellipsis,
}

impl TypeDescriptor {
    #[allow(missing_docs)]
    pub const fn bool() -> Self {
        Self::Primitive(Primitive::Bool)
    }

    #[allow(missing_docs)]
    pub const fn int() -> Self {
        Self::Primitive(Primitive::Int)
    }

    #[allow(missing_docs)]
    pub const fn float() -> Self {
        Self::Primitive(Primitive::Float)
    }

    #[allow(missing_docs)]
    pub const fn str() -> Self {
        Self::Primitive(Primitive::Str)
    }

    #[allow(missing_docs)]
    pub const fn bytes() -> Self {
        Self::Primitive(Primitive::Bytes)
    }

    #[allow(missing_docs)]
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[allow(missing_docs)]
    pub fn union(variants: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union(variants.into_iter().collect())
    }

    #[allow(missing_docs)]
    pub fn list(element: TypeDescriptor) -> Self {
        Self::List(Some(Box::new(element)))
    }

    #[allow(missing_docs)]
    pub fn set(element: TypeDescriptor) -> Self {
        Self::Set(Some(Box::new(element)))
    }

    #[allow(missing_docs)]
    pub fn tuple(elements: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Tuple(Some(elements.into_iter().collect()))
    }

    #[allow(missing_docs)]
    pub fn variable_tuple(element: TypeDescriptor) -> Self {
        Self::VariableTuple(Box::new(element))
    }

    #[allow(missing_docs)]
    pub fn mapping(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Mapping(Some((Box::new(key), Box::new(value))))
    }

    #[allow(missing_docs)]
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record(name.into())
    }

    #[allow(missing_docs)]
    pub fn literal(values: impl IntoIterator<Item = LiteralValue>) -> Self {
        Self::Literal(values.into_iter().collect())
    }

    #[allow(missing_docs)]
    pub fn new_type(name: impl Into<String>, base: TypeDescriptor) -> Self {
        Self::NewType {
            name: name.into(),
            base: Box::new(base),
        }
    }

    #[allow(missing_docs)]
    pub fn generic(origin: TypeDescriptor, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Generic {
            origin: Box::new(origin),
            args: args.into_iter().collect(),
        }
    }

    /// Is this `Optional(T)`?
    pub fn is_opt(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Is this a union?
    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union(_))
    }

    /// Is this a (possibly bare) list?
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Is this a (possibly bare) set?
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Is this a tuple of either kind?
    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_) | Self::VariableTuple(_))
    }

    /// Is this a variable-length tuple?
    pub fn is_variable_tuple(&self) -> bool {
        matches!(self, Self::VariableTuple(_))
    }

    /// Is this a (possibly bare) mapping?
    pub fn is_dict(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Is this a parameterized user type?
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic { .. })
    }

    /// Is this a literal set of values?
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Is this a named alias?
    pub fn is_new_type(&self) -> bool {
        matches!(self, Self::NewType { .. })
    }

    /// Is this a record type?
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    /// Is this a container without element types?
    pub fn is_bare(&self) -> bool {
        matches!(
            self,
            Self::List(None) | Self::Set(None) | Self::Tuple(None) | Self::Mapping(None)
        )
    }

    /// Is this a scalar?
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Name of the record this type refers to, looking through generics.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            Self::Record(name) => Some(name),
            Self::Generic { origin, .. } => origin.record_name(),
            _ => None,
        }
    }

    /// Type arguments, in declaration order.
    ///
    /// Literal values are not types and are not returned here.
    pub fn type_args(&self) -> Vec<&TypeDescriptor> {
        match self {
            Self::Optional(inner) | Self::VariableTuple(inner) => vec![inner.as_ref()],
            Self::List(Some(inner)) | Self::Set(Some(inner)) => vec![inner.as_ref()],
            Self::Union(args) | Self::Tuple(Some(args)) | Self::Generic { args, .. } => {
                args.iter().collect()
            }
            Self::Mapping(Some((k, v))) => vec![k.as_ref(), v.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Canonical, deterministic name of the type.
    ///
    /// Used for mangling and for variant names in tagged unions.
    pub fn typename(&self) -> String {
        fn join(args: &[TypeDescriptor]) -> String {
            args.iter()
                .map(TypeDescriptor::typename)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::Optional(inner) => format!("Optional[{}]", inner.typename()),
            Self::Union(args) => format!("Union[{}]", join(args)),
            Self::List(None) => "List".to_string(),
            Self::List(Some(inner)) => format!("List[{}]", inner.typename()),
            Self::Set(None) => "Set".to_string(),
            Self::Set(Some(inner)) => format!("Set[{}]", inner.typename()),
            Self::Tuple(None) => "Tuple".to_string(),
            Self::Tuple(Some(args)) if args.is_empty() => "Tuple[()]".to_string(),
            Self::Tuple(Some(args)) => format!("Tuple[{}]", join(args)),
            Self::VariableTuple(inner) => format!("Tuple[{}, ...]", inner.typename()),
            Self::Mapping(None) => "Dict".to_string(),
            Self::Mapping(Some((k, v))) => format!("Dict[{}, {}]", k.typename(), v.typename()),
            Self::Record(name) | Self::NewType { name, .. } => name.clone(),
            Self::Literal(values) => format!(
                "Literal[{}]",
                values
                    .iter()
                    .map(|v| match v {
                        LiteralValue::Str(s) => format!("{s:?}"),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Generic { origin, args } => format!("{}[{}]", origin.typename(), join(args)),
            Self::Ellipsis => "...".to_string(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.typename())
    }
}

/// Produces a fresh default value for a field.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default-value state of a declared field.
#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default; the field is required.
    #[default]
    Absent,
    /// A literal default value.
    Value(Value),
    /// A factory called for every missing value.
    Factory(DefaultFactory),
}

impl FieldDefault {
    /// Has a literal default value.
    pub fn has_default(&self) -> bool {
        matches!(self, FieldDefault::Value(_))
    }

    /// Has a default factory.
    pub fn has_default_factory(&self) -> bool {
        matches!(self, FieldDefault::Factory(_))
    }

    /// The literal default, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldDefault::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Produces the default: the literal, or a fresh value from the factory.
    pub fn produce(&self) -> Option<Value> {
        match self {
            FieldDefault::Absent => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Factory(factory) => Some(factory()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Absent => f.write_str("Absent"),
            FieldDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// A field as declared on a record, before normalization.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Declared name.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Default-value state.
    pub default: FieldDefault,
    /// Serialization attributes.
    pub attrs: FieldAttrs,
}

impl RawField {
    /// A required field without attributes.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: FieldDefault::Absent,
            attrs: FieldAttrs::default(),
        }
    }

    /// Sets a literal default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Sets a default factory.
    pub fn with_default_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = FieldDefault::Factory(Arc::new(factory));
        self
    }

    /// Replaces the attributes.
    pub fn with_attrs(mut self, attrs: FieldAttrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// A record type: a name and its declared fields.
#[derive(Debug, Clone)]
pub struct RecordType {
    name: String,
    fields: Vec<RawField>,
    class_vars: Vec<RawField>,
}

impl RecordType {
    /// An empty record named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            class_vars: Vec::new(),
        }
    }

    /// Appends a declared field.
    pub fn field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a type-level constant. It only becomes a field when
    /// class variables are serialized.
    pub fn class_var(mut self, name: impl Into<String>, ty: TypeDescriptor, value: impl Into<Value>) -> Self {
        self.class_vars.push(RawField::new(name, ty).with_default(value));
        self
    }

    /// Name of the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }

    /// Type-level constants.
    pub fn class_vars(&self) -> &[RawField] {
        &self.class_vars
    }

    /// The descriptor referring to this record.
    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Record(self.name.clone())
    }
}
