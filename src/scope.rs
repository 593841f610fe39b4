//! Per-type scopes and the function synthesis primitive.
//!
//! A [`Scope`] holds everything generated for one record type. Functions
//! enter it only through [`Scope::add_func`], which also captures the
//! function's source when debugging is enabled.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use kdl::KdlDocument;

use crate::{
    Result, SerdeErrorKind,
    descriptor::{FieldDefault, TypeDescriptor},
    registry::Registry,
    typecheck::TypeCheck,
    value::Value,
};

/// Key of the positional deserializing function.
pub const FROM_ITER: &str = "from_iter";
/// Key of the keyed deserializing function.
pub const FROM_DICT: &str = "from_dict";
/// Key of the positional serializing function.
pub const TO_ITER: &str = "to_iter";
/// Key of the keyed serializing function.
pub const TO_DICT: &str = "to_dict";
/// Key of the record type check function.
pub const TYPE_CHECK: &str = "typecheck";

/// A synthesized function. It gets the registry to resolve functions of
/// other types at call time.
pub type SynthFn = Arc<dyn Fn(&Registry, &Value) -> Result<Value> + Send + Sync>;

/// Generated functions and metadata of one record type.
#[derive(Clone)]
pub struct Scope {
    owner: TypeDescriptor,
    debug: bool,
    funcs: IndexMap<String, SynthFn>,
    defaults: IndexMap<String, FieldDefault>,
    field_types: IndexMap<String, TypeDescriptor>,
    code: IndexMap<String, String>,
    union_se_args: IndexMap<String, Vec<TypeDescriptor>>,
    /// How the record's drivers check field values.
    pub type_check: TypeCheck,
    /// Default of the `reuse_instances` argument of the record's drivers.
    pub reuse_instances_default: bool,
    /// Default of the `convert_sets` argument of the record's drivers.
    pub convert_sets_default: bool,
}

impl Scope {
    /// An empty scope for `owner`. With `debug`, function sources are kept.
    pub fn new(owner: TypeDescriptor, debug: bool) -> Self {
        Self {
            owner,
            debug,
            funcs: IndexMap::new(),
            defaults: IndexMap::new(),
            field_types: IndexMap::new(),
            code: IndexMap::new(),
            union_se_args: IndexMap::new(),
            type_check: TypeCheck::default(),
            reuse_instances_default: true,
            convert_sets_default: false,
        }
    }

    /// The type this scope belongs to.
    pub fn owner(&self) -> &TypeDescriptor {
        &self.owner
    }

    /// Registers `func` under `func_name`.
    ///
    /// `source` renders a KDL description of the function. It is only
    /// called in debug mode; the result is reformatted and stored in
    /// [`Scope::code`]. Text that doesn't parse is stored as is.
    ///
    /// Registering a name twice replaces the earlier function.
    pub fn add_func(&mut self, func_name: &str, func: SynthFn, source: impl FnOnce() -> String) {
        log::trace!("Synthesizing '{func_name}' for {}", self.owner);

        if self.funcs.insert(func_name.to_string(), func).is_some() {
            log::warn!(
                "Function '{func_name}' of {} was registered twice, keeping the last one",
                self.owner
            );
        }

        if self.debug {
            self.code.insert(func_name.to_string(), reformat(source()));
        }
    }

    /// Looks up a function.
    pub fn func(&self, func_name: &str) -> Option<&SynthFn> {
        self.funcs.get(func_name)
    }

    /// Names of all functions, in registration order.
    pub fn func_names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }

    /// Looks up and calls a function.
    pub fn call(&self, registry: &Registry, func_name: &str, value: &Value) -> Result<Value> {
        let func = self.func(func_name).ok_or_else(|| SerdeErrorKind::MissingFunction {
            scope: self.owner.typename(),
            func: func_name.to_string(),
        })?;
        func(registry, value)
    }

    /// The retained source of a function, in debug mode.
    pub fn code(&self, func_name: &str) -> Option<&str> {
        self.code.get(func_name).map(String::as_str)
    }

    /// Records the default of a field.
    pub fn add_default(&mut self, field_name: &str, default: FieldDefault) {
        self.defaults.insert(field_name.to_string(), default);
    }

    /// The default of a field.
    pub fn default_of(&self, field_name: &str) -> Option<&FieldDefault> {
        self.defaults.get(field_name)
    }

    /// Records the declared type of a field.
    pub fn add_field_type(&mut self, field_name: &str, ty: TypeDescriptor) {
        self.field_types.insert(field_name.to_string(), ty);
    }

    /// The declared type of a field.
    pub fn field_type(&self, field_name: &str) -> Option<&TypeDescriptor> {
        self.field_types.get(field_name)
    }

    /// Records the variant list a union function was generated for.
    pub fn add_union_args(&mut self, func_name: &str, args: Vec<TypeDescriptor>) {
        self.union_se_args.insert(func_name.to_string(), args);
    }

    /// The variant list a union function was generated for.
    pub fn union_args(&self, func_name: &str) -> Option<&[TypeDescriptor]> {
        self.union_se_args.get(func_name).map(Vec::as_slice)
    }

    fn justify(s: &str) -> String {
        let white_spaces = 50usize.saturating_sub(s.len()) / 2;
        format!("{}{s}", " ".repeat(white_spaces))
    }
}

fn reformat(source: String) -> String {
    match source.parse::<KdlDocument>() {
        Ok(mut document) => {
            document.autoformat();
            document.to_string()
        }
        Err(e) => {
            log::warn!("Keeping unformatted source: {e}");
            source
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEAVY: &str = "==================================================";
        const LIGHT: &str = "--------------------------------------------------";

        fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
            writeln!(f, "{LIGHT}")?;
            writeln!(f, "{}", Scope::justify(title))?;
            writeln!(f, "{LIGHT}")
        }

        writeln!(f, "{HEAVY}")?;
        writeln!(f, "{}", Self::justify(&self.owner.typename()))?;
        writeln!(f, "{HEAVY}")?;
        writeln!(f)?;

        if !self.code.is_empty() {
            section(f, "Generated function sources")?;
            for code in self.code.values() {
                writeln!(f, "{}", code.trim_end())?;
            }
            writeln!(f)?;
        }

        if !self.funcs.is_empty() {
            section(f, "Function references in scope")?;
            for name in self.funcs.keys() {
                writeln!(f, "{name}: <fn {name}>")?;
            }
            writeln!(f)?;
        }

        if !self.defaults.is_empty() {
            section(f, "Default values for the record fields")?;
            for (name, default) in &self.defaults {
                match default {
                    FieldDefault::Absent => writeln!(f, "{name}: <absent>")?,
                    FieldDefault::Value(value) => writeln!(f, "{name}: {value}")?,
                    FieldDefault::Factory(_) => writeln!(f, "{name}: <factory>")?,
                }
            }
            writeln!(f)?;
        }

        if !self.union_se_args.is_empty() {
            section(f, "Type lists used by union functions")?;
            for (name, args) in &self.union_se_args {
                let args: Vec<_> = args.iter().map(TypeDescriptor::typename).collect();
                writeln!(f, "{name}: [{}]", args.join(", "))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("owner", &self.owner)
            .field("funcs", &self.funcs.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .field("field_types", &self.field_types)
            .field("union_se_args", &self.union_se_args)
            .field("type_check", &self.type_check)
            .field("reuse_instances_default", &self.reuse_instances_default)
            .field("convert_sets_default", &self.convert_sets_default)
            .finish_non_exhaustive()
    }
}
