//! The registry of per-record scopes and of synthetic union wrappers.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::{
    Result, SerdeErrorKind, Settings,
    check::{is_instance, render_type_check},
    descriptor::{RawField, RecordType, TypeDescriptor},
    field::{FieldDescriptor, fields},
    mangle::{GLOBAL_PREFIX, UNION_DE_PREFIX, UNION_SE_PREFIX, union_func_name},
    scope::{Scope, TYPE_CHECK},
    tagging::Tagging,
    typecheck::TypeCheck,
    union::{collect_unions, render_union_funcs},
    value::Value,
};

/// Name of the single field of a synthetic union wrapper record.
const UNION_WRAPPER_FIELD: &str = "v";

/// Per-record options, given when the record is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    /// Case policy applied to every field name, e.g. `"camelcase"`.
    pub rename_all: Option<String>,
    /// How unions inside the record are tagged.
    pub tagging: Tagging,
    /// How strictly field values are checked by the drivers.
    pub type_check: TypeCheck,
    /// Also (de)serialize class variables.
    pub serialize_class_var: bool,
    /// Default of the drivers' `reuse_instances` argument.
    pub reuse_instances_default: bool,
    /// Default of the drivers' `convert_sets` argument.
    pub convert_sets_default: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            rename_all: None,
            tagging: Tagging::default(),
            type_check: TypeCheck::default(),
            serialize_class_var: false,
            reuse_instances_default: true,
            convert_sets_default: false,
        }
    }
}

impl RecordOptions {
    #[allow(missing_docs)]
    pub fn rename_all(mut self, case: impl Into<String>) -> Self {
        self.rename_all = Some(case.into());
        self
    }

    #[allow(missing_docs)]
    pub fn tagging(mut self, tagging: Tagging) -> Self {
        self.tagging = tagging;
        self
    }

    #[allow(missing_docs)]
    pub fn type_check(mut self, type_check: TypeCheck) -> Self {
        self.type_check = type_check;
        self
    }

    #[allow(missing_docs)]
    pub fn serialize_class_var(mut self, enabled: bool) -> Self {
        self.serialize_class_var = enabled;
        self
    }

    #[allow(missing_docs)]
    pub fn reuse_instances_default(mut self, enabled: bool) -> Self {
        self.reuse_instances_default = enabled;
        self
    }

    #[allow(missing_docs)]
    pub fn convert_sets_default(mut self, enabled: bool) -> Self {
        self.convert_sets_default = enabled;
        self
    }
}

/// Store of every registered scope.
///
/// Scopes are built completely before they're published, so a reader
/// either sees no scope for a type or a fully populated one. Published
/// scopes are shared and never mutated; registering a record again
/// replaces its scope.
///
/// Union wrappers are created under a single lock: structurally identical
/// unions always resolve to the same [`Scope`], even when first seen from
/// several threads at once.
#[derive(Debug)]
pub struct Registry {
    settings: Settings,
    scopes: RwLock<IndexMap<String, Arc<Scope>>>,
    unions: Mutex<IndexMap<String, Arc<Scope>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry using the process-wide settings set by [`crate::init`].
    pub fn new() -> Self {
        Self::with_settings(Settings::global())
    }

    #[allow(missing_docs)]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            scopes: RwLock::new(IndexMap::new()),
            unions: Mutex::new(IndexMap::new()),
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Registers `record`: derives its field descriptors, synthesizes its
    /// `typecheck` and union functions and publishes the scope.
    pub fn register(&self, record: RecordType, options: RecordOptions) -> Result<Arc<Scope>> {
        self.register_with(record, options, |_, _| Ok(()))
    }

    /// Like [`Registry::register`], but lets `driver` add its own functions
    /// to the scope before it's published.
    ///
    /// Nothing is published when `driver` fails.
    pub fn register_with<F>(
        &self,
        record: RecordType,
        options: RecordOptions,
        driver: F,
    ) -> Result<Arc<Scope>>
    where
        F: FnOnce(&mut Scope, &[FieldDescriptor]) -> Result<()>,
    {
        options.tagging.check()?;

        let case = options.rename_all.as_deref();
        let field_descriptors: Vec<FieldDescriptor> = fields(&record, options.serialize_class_var)
            .into_iter()
            .map(|f| f.with_case(case))
            .collect();
        for f in &field_descriptors {
            f.conv_name(None)?;
        }

        let mut scope = Scope::new(record.descriptor(), self.settings.debug);
        scope.type_check = options.type_check;
        scope.reuse_instances_default = options.reuse_instances_default;
        scope.convert_sets_default = options.convert_sets_default;

        for f in &field_descriptors {
            scope.add_default(&f.name, f.default.clone());
            scope.add_field_type(&f.name, f.ty.clone());
        }

        let (type_check, source) = render_type_check(record.name(), &field_descriptors);
        scope.add_func(TYPE_CHECK, type_check, || source);

        let mut unions = Vec::new();
        for f in &field_descriptors {
            collect_unions(&f.ty, &mut unions);
        }
        for args in &unions {
            render_union_funcs(&mut scope, args, &options.tagging);
        }

        driver(&mut scope, &field_descriptors)?;

        let scope = Arc::new(scope);
        let previous = self
            .scopes
            .write()
            .insert(record.name().to_string(), Arc::clone(&scope));
        if previous.is_some() {
            log::warn!("Record '{}' was registered again, replacing its scope", record.name());
        }
        log::debug!(
            "Registered '{}' with {} field(s) and {} union(s)",
            record.name(),
            field_descriptors.len(),
            unions.len()
        );

        Ok(scope)
    }

    /// The scope of a registered record.
    pub fn scope(&self, name: &str) -> Option<Arc<Scope>> {
        self.scopes.read().get(name).cloned()
    }

    #[allow(missing_docs)]
    pub fn is_registered(&self, name: &str) -> bool {
        self.scopes.read().contains_key(name)
    }

    /// Structural instance check against this registry. See
    /// [`crate::is_instance`].
    pub fn is_instance(&self, value: &Value, ty: &TypeDescriptor) -> bool {
        is_instance(self, value, ty)
    }

    /// The wrapper scope of a union, if it was created.
    pub fn get_union(&self, union: &TypeDescriptor) -> Option<Arc<Scope>> {
        let args = union_args(union).ok()?;
        self.unions
            .lock()
            .get(&union_func_name(GLOBAL_PREFIX, args))
            .cloned()
    }

    /// The wrapper scope of a union, registering the wrapper record on
    /// first use.
    ///
    /// The wrapper is a record named after the union's signature with a
    /// single field of the union type. Unions whose variant lists mangle
    /// to the same name share one wrapper.
    pub fn get_or_create_union_scope(&self, union: &TypeDescriptor) -> Result<Arc<Scope>> {
        let args = union_args(union)?;
        let class_name = union_func_name(GLOBAL_PREFIX, args);

        let mut unions = self.unions.lock();
        if let Some(scope) = unions.get(&class_name) {
            return Ok(Arc::clone(scope));
        }

        let wrapper = RecordType::new(&class_name)
            .field(RawField::new(UNION_WRAPPER_FIELD, union.clone()));
        let scope = self.register(wrapper, RecordOptions::default())?;
        log::debug!("Created union wrapper '{class_name}' for {union}");
        unions.insert(class_name, Arc::clone(&scope));

        Ok(scope)
    }

    /// Serializes `value` as a member of `union`.
    pub fn serialize_union(&self, union: &TypeDescriptor, value: &Value) -> Result<Value> {
        let scope = self.get_or_create_union_scope(union)?;
        let func_name = union_func_name(UNION_SE_PREFIX, union_args(union)?);
        scope.call(self, &func_name, value)
    }

    /// Deserializes `data` as a member of `union`.
    pub fn deserialize_union(&self, union: &TypeDescriptor, data: &Value) -> Result<Value> {
        let scope = self.get_or_create_union_scope(union)?;
        let func_name = union_func_name(UNION_DE_PREFIX, union_args(union)?);
        scope.call(self, &func_name, data)
    }

    /// Calls a function of a registered record's scope.
    pub fn call(&self, record: &str, func_name: &str, value: &Value) -> Result<Value> {
        let scope = self
            .scope(record)
            .ok_or_else(|| SerdeErrorKind::UnregisteredType(record.to_string()))?;
        scope.call(self, func_name, value)
    }
}

fn union_args(ty: &TypeDescriptor) -> Result<&[TypeDescriptor]> {
    match ty {
        TypeDescriptor::Union(args) => Ok(args),
        other => Err(SerdeErrorKind::UnsupportedType(format!("{other} is not a union")).into()),
    }
}
