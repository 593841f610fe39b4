#![warn(missing_docs)]
//! Field metadata, union tagging, structural type checks and a function
//! registry for serializers built on [`facet`](https://docs.rs/facet).
//!
//! Format crates (JSON, msgpack, KDL, ...) describe *how* a value is written;
//! this crate owns everything they share:
//!
//! - [`FieldDescriptor`]: the normalized per-field metadata (renames, aliases,
//!   skip predicates, custom converters, flattening) derived once per record.
//! - [`Scope`]: the per-record table of synthesized conversion and check
//!   functions, filled once at registration and called many times after.
//! - [`Registry`]: the store of scopes, including the synthetic wrapper
//!   records that own the functions for bare unions.
//! - [`Tagging`] and [`TypeCheck`]: how union variants are marked on the wire
//!   and how strictly values are validated.
//! - [`is_instance`]: the structural instance check used for untagged union
//!   disambiguation.
//!
//! ```
//! use facet_serde_scope::{FieldAttrs, RawField, RecordOptions, RecordType, Registry, TypeDescriptor, Value};
//!
//! let registry = Registry::new();
//! let record = RecordType::new("User")
//!     .field(RawField::new("id", TypeDescriptor::int()).with_attrs(FieldAttrs::new().rename("ID")))
//!     .field(RawField::new("name", TypeDescriptor::str()));
//! registry.register(record, RecordOptions::default()).unwrap();
//!
//! let user = Value::record("User", [("id", Value::from(1)), ("name", Value::from("anon"))]);
//! assert!(registry.is_instance(&user, &TypeDescriptor::record("User")));
//! ```

use std::{
    error::Error,
    fmt::{self, Display},
    sync::atomic::{AtomicBool, Ordering},
};

mod check;
mod descriptor;
mod field;
mod mangle;
mod registry;
mod scope;
mod shape;
mod tagging;
mod typecheck;
mod union;
mod value;

pub use check::{is_instance, union_variant};
pub use descriptor::{
    DefaultFactory, FieldDefault, LiteralValue, Primitive, RawField, RecordType, TypeDescriptor,
};
pub use field::{
    ConvFunc, Converter, FieldAccess, FieldAttrs, FieldDescriptor, FlattenOpts, Func, Predicate,
    SkipFunc, conv, fields,
};
pub use mangle::{
    GLOBAL_PREFIX, LITERAL_DE_PREFIX, UNION_DE_PREFIX, UNION_SE_PREFIX, literal_func_name, mangle,
    union_func_name,
};
pub use registry::{RecordOptions, Registry};
pub use scope::{FROM_DICT, FROM_ITER, Scope, SynthFn, TO_DICT, TO_ITER, TYPE_CHECK};
pub use tagging::{Tagged, Tagging, TaggingKind};
pub use typecheck::{TypeCheck, coerce, is_coercible};
pub use value::{RecordValue, Value};

/// Result type used throughout the crate.
pub type Result<T, E = SerdeError> = std::result::Result<T, E>;

/// Error type for metadata derivation, registration and generated functions.
#[derive(Debug, Clone)]
pub struct SerdeError {
    kind: SerdeErrorKind,
}

impl SerdeError {
    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &SerdeErrorKind {
        &self.kind
    }
}

impl Display for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.kind;
        write!(f, "{kind}")
    }
}
impl Error for SerdeError {}

impl<K: Into<SerdeErrorKind>> From<K> for SerdeError {
    fn from(value: K) -> Self {
        let kind = value.into();
        SerdeError { kind }
    }
}

/// Detailed classification of errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SerdeErrorKind {
    // Configuration errors
    /// Internal tagging was configured without a `tag` key.
    MissingTag,
    /// Adjacent tagging was configured without a `tag` or `content` key.
    MissingTagOrContent,
    /// `rename_all` names a case policy that doesn't exist.
    UnknownCase(String),
    /// A field resolved to an empty wire name.
    MissingFieldName,

    // Conversion errors
    /// No conversion strategy exists for a value or type.
    UnsupportedType(String),
    /// A value failed a structural check.
    TypeMismatch {
        /// Where the mismatch was found, e.g. `Foo.bar`.
        path: String,
        /// Canonical name of the declared type.
        expected: String,
    },
    /// A value with no path of its own failed a structural check.
    NotInstance {
        /// Rendering of the offending value.
        value: String,
        /// Canonical name of the declared type.
        expected: String,
    },
    /// Coercion could not construct the declared type from the value.
    Coercion {
        /// Rendering of the offending value.
        value: String,
        /// Canonical name of the declared type.
        expected: String,
    },
    /// No union variant matched the value.
    NoMatchingVariant {
        /// Rendering of the offending value.
        value: String,
        /// Canonical name of the union.
        union: String,
    },
    /// A tagged payload names a variant the union doesn't declare.
    UnknownVariant(String),
    /// A tagged payload doesn't have the layout its tagging requires.
    MalformedTaggedValue(String),

    // Registry errors
    /// No scope is registered for the named type.
    UnregisteredType(String),
    /// The scope exists but holds no function under that name.
    MissingFunction {
        /// Owner of the scope.
        scope: String,
        /// Requested function name.
        func: String,
    },
}

impl Display for SerdeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerdeErrorKind::MissingTag => {
                write!(f, "\"tag\" must be specified in internal tagging")
            }
            SerdeErrorKind::MissingTagOrContent => {
                write!(f, "\"tag\" and \"content\" must be specified in adjacent tagging")
            }
            SerdeErrorKind::UnknownCase(case) => write!(f, "unknown case type: {case}"),
            SerdeErrorKind::MissingFieldName => write!(f, "field name is empty"),
            SerdeErrorKind::UnsupportedType(name) => write!(f, "unsupported type: {name}"),
            SerdeErrorKind::TypeMismatch { path, expected } => {
                write!(f, "{path} is not instance of {expected}")
            }
            SerdeErrorKind::NotInstance { value, expected } => {
                write!(f, "{value} is not instance of {expected}")
            }
            SerdeErrorKind::Coercion { value, expected } => {
                write!(f, "can not coerce {value} into {expected}")
            }
            SerdeErrorKind::NoMatchingVariant { value, union } => {
                write!(f, "can not match {value} against any variant of {union}")
            }
            SerdeErrorKind::UnknownVariant(name) => write!(f, "unknown union variant '{name}'"),
            SerdeErrorKind::MalformedTaggedValue(msg) => write!(f, "malformed tagged value: {msg}"),
            SerdeErrorKind::UnregisteredType(name) => write!(f, "type '{name}' is not registered"),
            SerdeErrorKind::MissingFunction { scope, func } => {
                write!(f, "no function '{func}' in scope of '{scope}'")
            }
        }
    }
}

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Sets the process-wide debug toggle.
///
/// With debug enabled, registries created afterwards through
/// [`Registry::new`] keep the (reformatted) source of every synthesized
/// function in [`Scope::code`].
pub fn init(debug: bool) {
    DEBUG.store(debug, Ordering::Relaxed);
}

/// Settings a [`Registry`] is created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Retain generated function sources for inspection.
    pub debug: bool,
}

impl Settings {
    /// Snapshot of the process-wide settings set by [`init`].
    pub fn global() -> Self {
        Self {
            debug: DEBUG.load(Ordering::Relaxed),
        }
    }

    /// Returns these settings with `debug` replaced.
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
