//! Field metadata: normalizing declared fields into [`FieldDescriptor`]s.

use std::{fmt, sync::Arc};

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase,
    ToTrainCase, ToUpperCamelCase,
};

use crate::{
    Result, SerdeErrorKind,
    descriptor::{FieldDefault, RawField, RecordType, TypeDescriptor},
    mangle::mangle,
    value::Value,
};

/// A skip predicate: `true` means the field is left out.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A custom per-field converter.
pub type Converter = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// A function reference together with its mangled name.
///
/// Generated code refers to user-supplied functions by name; the mangled
/// name keeps two fields' `skip_if` functions apart.
pub struct Func<F: ?Sized> {
    inner: Arc<F>,
    mangled: String,
}

/// A named skip predicate.
pub type SkipFunc = Func<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named converter.
pub type ConvFunc = Func<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

impl<F: ?Sized> Func<F> {
    /// Wraps `inner` under `mangled`.
    pub fn new(inner: Arc<F>, mangled: impl Into<String>) -> Self {
        Self {
            inner,
            mangled: mangled.into(),
        }
    }

    /// The mangled function name.
    pub fn name(&self) -> &str {
        &self.mangled
    }

    /// The wrapped function.
    pub fn inner(&self) -> &Arc<F> {
        &self.inner
    }
}

impl SkipFunc {
    /// Evaluates the predicate.
    pub fn call(&self, value: &Value) -> bool {
        (self.inner)(value)
    }
}

impl ConvFunc {
    /// Runs the converter.
    pub fn call(&self, value: &Value) -> Result<Value> {
        (self.inner)(value)
    }
}

impl<F: ?Sized> Clone for Func<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            mangled: self.mangled.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Func<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Func").field(&self.mangled).finish()
    }
}

/// Options of a flattened field. Carries no options yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOpts {}

/// Serialization attributes recognized on a declared field.
#[derive(Clone, Default)]
pub struct FieldAttrs {
    /// Wire name replacing the (case-converted) declared name.
    pub rename: Option<String>,
    /// Extra names accepted when decoding.
    pub alias: Vec<String>,
    /// Never (de)serialize the field.
    pub skip: Option<bool>,
    /// Skip the field when the predicate holds.
    pub skip_if: Option<Predicate>,
    /// Skip the field when its value is falsy.
    pub skip_if_false: Option<bool>,
    /// Skip the field when its value equals the default.
    pub skip_if_default: Option<bool>,
    /// Custom serializer.
    pub serializer: Option<Converter>,
    /// Custom deserializer.
    pub deserializer: Option<Converter>,
    /// Inline the fields of a nested record.
    pub flatten: Option<FlattenOpts>,
}

impl FieldAttrs {
    /// No attributes.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    #[allow(missing_docs)]
    pub fn alias(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.alias = names.into_iter().map(Into::into).collect();
        self
    }

    #[allow(missing_docs)]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    #[allow(missing_docs)]
    pub fn skip_if(mut self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.skip_if = Some(Arc::new(predicate));
        self
    }

    #[allow(missing_docs)]
    pub fn skip_if_false(mut self, enabled: bool) -> Self {
        self.skip_if_false = Some(enabled);
        self
    }

    #[allow(missing_docs)]
    pub fn skip_if_default(mut self, enabled: bool) -> Self {
        self.skip_if_default = Some(enabled);
        self
    }

    #[allow(missing_docs)]
    pub fn serializer(mut self, f: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        self.serializer = Some(Arc::new(f));
        self
    }

    #[allow(missing_docs)]
    pub fn deserializer(mut self, f: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        self.deserializer = Some(Arc::new(f));
        self
    }

    #[allow(missing_docs)]
    pub fn flatten(mut self) -> Self {
        self.flatten = Some(FlattenOpts::default());
        self
    }
}

impl fmt::Debug for FieldAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAttrs")
            .field("rename", &self.rename)
            .field("alias", &self.alias)
            .field("skip", &self.skip)
            .field("skip_if", &self.skip_if.is_some())
            .field("skip_if_false", &self.skip_if_false)
            .field("skip_if_default", &self.skip_if_default)
            .field("serializer", &self.serializer.is_some())
            .field("deserializer", &self.deserializer.is_some())
            .field("flatten", &self.flatten)
            .finish()
    }
}

/// How a driver addresses fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// By name, e.g. dict or map based formats.
    Keyed,
    /// By position, e.g. tuple or array based formats.
    Positional,
}

/// Normalized metadata of a single field.
///
/// Derived once per record by [`FieldDescriptor::from_raw`] and treated as
/// plain data afterwards. At most one skip predicate is materialized in
/// `skip_if`: an explicit predicate wins over `skip_if_false`, which wins
/// over `skip_if_default`.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Declared name.
    pub name: String,
    /// Default-value state.
    pub default: FieldDefault,
    /// Explicit wire name.
    pub rename: Option<String>,
    /// Names accepted on decode besides the wire name.
    pub alias: Vec<String>,
    /// Never (de)serialize the field.
    pub skip: Option<bool>,
    /// The materialized skip predicate.
    pub skip_if: Option<SkipFunc>,
    /// Custom serializer.
    pub serializer: Option<ConvFunc>,
    /// Custom deserializer.
    pub deserializer: Option<ConvFunc>,
    /// Flatten options, for flattened fields.
    pub flatten: Option<FlattenOpts>,
    /// The record declaring the field.
    pub parent: Option<TypeDescriptor>,
    /// Case policy applied to the declared name.
    pub case: Option<String>,
}

impl FieldDescriptor {
    /// Normalizes a declared field. Pure: the same input always yields the
    /// same descriptor, mangled names included.
    pub fn from_raw(raw: &RawField, parent: Option<&TypeDescriptor>) -> Self {
        let attrs = &raw.attrs;

        let skip_if_false = attrs
            .skip_if_false
            .unwrap_or(false)
            .then(|| {
                let predicate: Predicate = Arc::new(|v: &Value| !v.is_truthy());
                SkipFunc::new(predicate, mangle(&raw.name, "skip_if_false"))
            });

        let skip_if_default = attrs
            .skip_if_default
            .unwrap_or(false)
            .then(|| {
                let default = raw.default.value().cloned();
                let predicate: Predicate = Arc::new(move |v: &Value| default.as_ref() == Some(v));
                SkipFunc::new(predicate, mangle(&raw.name, "skip_if_default"))
            });

        let skip_if = attrs
            .skip_if
            .as_ref()
            .map(|f| SkipFunc::new(Arc::clone(f), mangle(&raw.name, "skip_if")));

        Self {
            ty: raw.ty.clone(),
            name: raw.name.clone(),
            default: raw.default.clone(),
            rename: attrs.rename.clone(),
            alias: attrs.alias.clone(),
            skip: attrs.skip,
            skip_if: skip_if.or(skip_if_false).or(skip_if_default),
            serializer: attrs
                .serializer
                .as_ref()
                .map(|f| ConvFunc::new(Arc::clone(f), mangle(&raw.name, "serializer"))),
            deserializer: attrs
                .deserializer
                .as_ref()
                .map(|f| ConvFunc::new(Arc::clone(f), mangle(&raw.name, "deserializer"))),
            flatten: attrs.flatten,
            parent: parent.cloned(),
            case: None,
        }
    }

    /// Sets the case policy.
    pub fn with_case(mut self, case: Option<&str>) -> Self {
        self.case = case.map(str::to_string);
        self
    }

    /// The wire name: `case` (or the given override) applied to the
    /// declared name, then replaced by `rename` if present. Aliases are
    /// never produced here.
    pub fn conv_name(&self, case: Option<&str>) -> Result<String> {
        conv(self, case.or(self.case.as_deref()))
    }

    /// Every name accepted when decoding: the wire name, then aliases.
    pub fn accepted_names(&self) -> Result<Vec<String>> {
        let mut names = vec![self.conv_name(None)?];
        names.extend(self.alias.iter().cloned());
        Ok(names)
    }

    /// The field's type is its own declaring record.
    pub fn is_self_referencing(&self) -> bool {
        self.parent.as_ref() == Some(&self.ty)
    }

    #[allow(missing_docs)]
    pub fn has_default(&self) -> bool {
        self.default.has_default()
    }

    #[allow(missing_docs)]
    pub fn has_default_factory(&self) -> bool {
        self.default.has_default_factory()
    }

    /// Whether a missing value can be filled from the default. Positional
    /// formats can't leave slots out, so they never use defaults.
    pub fn supports_default(&self, access: FieldAccess) -> bool {
        access == FieldAccess::Keyed && (self.has_default() || self.has_default_factory())
    }

    #[allow(missing_docs)]
    pub fn is_flatten(&self) -> bool {
        self.flatten.is_some()
    }

    /// Whether `value` should be left out: `skip` is set or the skip
    /// predicate holds.
    pub fn should_skip(&self, value: &Value) -> bool {
        self.skip == Some(true) || self.skip_if.as_ref().is_some_and(|f| f.call(value))
    }
}

/// Descriptors of every field of `record`, in declaration order.
///
/// With `serialize_class_var`, the record's class variables are appended;
/// they have no parent and carry their value as the default.
pub fn fields(record: &RecordType, serialize_class_var: bool) -> Vec<FieldDescriptor> {
    let parent = record.descriptor();
    let mut fields: Vec<_> = record
        .fields()
        .iter()
        .map(|f| FieldDescriptor::from_raw(f, Some(&parent)))
        .collect();

    if serialize_class_var {
        fields.extend(
            record
                .class_vars()
                .iter()
                .map(|f| FieldDescriptor::from_raw(f, None)),
        );
    }

    fields
}

/// Converts a field name: applies `case`, then `rename`.
pub fn conv(field: &FieldDescriptor, case: Option<&str>) -> Result<String> {
    let mut name = match case {
        Some(case) => apply_case(&field.name, case)?,
        None => field.name.clone(),
    };
    if let Some(rename) = &field.rename {
        name = rename.clone();
    }
    if name.is_empty() {
        return Err(SerdeErrorKind::MissingFieldName.into());
    }
    Ok(name)
}

fn apply_case(name: &str, case: &str) -> Result<String> {
    let normalized: String = case
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    Ok(match normalized.as_str() {
        "camelcase" => name.to_lower_camel_case(),
        "pascalcase" => name.to_upper_camel_case(),
        "snakecase" => name.to_snake_case(),
        "kebabcase" => name.to_kebab_case(),
        "constcase" | "screamingsnakecase" => name.to_shouty_snake_case(),
        "upperkebabcase" | "screamingkebabcase" => name.to_shouty_kebab_case(),
        "titlecase" => name.to_title_case(),
        "traincase" => name.to_train_case(),
        "uppercase" => name.to_uppercase(),
        "lowercase" => name.to_lowercase(),
        _ => return Err(SerdeErrorKind::UnknownCase(case.to_string()).into()),
    })
}
