//! Union serialize/deserialize function synthesis.

use std::sync::Arc;

use crate::{
    Result, SerdeErrorKind,
    check::{is_instance, union_variant},
    descriptor::TypeDescriptor,
    mangle::{UNION_DE_PREFIX, UNION_SE_PREFIX, union_func_name},
    registry::Registry,
    scope::{Scope, SynthFn},
    tagging::{Tagged, Tagging},
    value::{RecordValue, Value},
};

/// Collects the variant lists of every union inside `ty`, outermost first.
pub(crate) fn collect_unions(ty: &TypeDescriptor, out: &mut Vec<Vec<TypeDescriptor>>) {
    if let TypeDescriptor::Union(args) = ty {
        if !out.contains(args) {
            out.push(args.clone());
        }
    }
    if let TypeDescriptor::NewType { base, .. } = ty {
        collect_unions(base, out);
    }
    for arg in ty.type_args() {
        collect_unions(arg, out);
    }
}

/// Adds `union_se_*` and `union_de_*` for `args` to `scope`.
pub(crate) fn render_union_funcs(scope: &mut Scope, args: &[TypeDescriptor], tagging: &Tagging) {
    let se_name = union_func_name(UNION_SE_PREFIX, args);
    let de_name = union_func_name(UNION_DE_PREFIX, args);

    let kind = format!("{:?}", tagging.kind).to_lowercase();
    let source = |name: &str, direction: &str| {
        let mut source = format!("{name} direction={direction:?} tagging={kind:?} {{\n");
        for arg in args {
            source.push_str(&format!("variant {:?}\n", arg.typename()));
        }
        source.push_str("}\n");
        source
    };

    let se: SynthFn = {
        let args = args.to_vec();
        let tagging = tagging.clone();
        Arc::new(move |registry: &Registry, value: &Value| {
            serialize_variant(registry, value, &args, &tagging)
        })
    };
    scope.add_func(&se_name, se, || source(&se_name, "serialize"));

    let de: SynthFn = {
        let args = args.to_vec();
        let tagging = tagging.clone();
        Arc::new(move |registry: &Registry, data: &Value| {
            deserialize_variant(registry, data, &args, &tagging)
        })
    };
    scope.add_func(&de_name, de, || source(&de_name, "deserialize"));

    scope.add_union_args(&se_name, args.to_vec());
}

fn union_name(args: &[TypeDescriptor]) -> String {
    TypeDescriptor::Union(args.to_vec()).typename()
}

fn serialize_variant(
    registry: &Registry,
    value: &Value,
    args: &[TypeDescriptor],
    tagging: &Tagging,
) -> Result<Value> {
    let Some((_, variant)) = union_variant(registry, value, args) else {
        return Err(SerdeErrorKind::NoMatchingVariant {
            value: value.to_string(),
            union: union_name(args),
        }
        .into());
    };

    if tagging.is_internal() && variant.record_name().is_none() {
        return Err(SerdeErrorKind::UnsupportedType(format!(
            "{} can not be internally tagged",
            variant.typename()
        ))
        .into());
    }

    tagging.encode(&variant.typename(), to_wire(value))
}

fn deserialize_variant(
    registry: &Registry,
    data: &Value,
    args: &[TypeDescriptor],
    tagging: &Tagging,
) -> Result<Value> {
    match tagging.decode(data)? {
        Tagged::Variant { name, content } => {
            let variant = args
                .iter()
                .find(|arg| arg.typename() == name)
                .ok_or_else(|| SerdeErrorKind::UnknownVariant(name.to_string()))?;
            let candidate = from_wire(registry, content, variant);
            if is_instance(registry, &candidate, variant) {
                Ok(candidate)
            } else {
                Err(SerdeErrorKind::NotInstance {
                    value: candidate.to_string(),
                    expected: variant.typename(),
                }
                .into())
            }
        }
        Tagged::Untagged(data) => args
            .iter()
            .find_map(|variant| {
                let candidate = from_wire(registry, data.clone(), variant);
                is_instance(registry, &candidate, variant).then_some(candidate)
            })
            .ok_or_else(|| {
                SerdeErrorKind::NoMatchingVariant {
                    value: data.to_string(),
                    union: union_name(args),
                }
                .into()
            }),
    }
}

/// Serialized form of a variant value: records become their field maps,
/// nested ones included.
fn to_wire(value: &Value) -> Value {
    match value {
        Value::Record(record) => Value::Dict(
            record
                .fields
                .iter()
                .map(|(k, v)| (Value::Str(k.clone()), to_wire(v)))
                .collect(),
        ),
        Value::List(items) => Value::List(items.iter().map(to_wire).collect()),
        Value::Set(items) => Value::Set(items.iter().map(to_wire).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(to_wire).collect()),
        Value::Dict(entries) => Value::Dict(
            entries
                .iter()
                .map(|(k, v)| (to_wire(k), to_wire(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Reads serialized data back as `ty`.
///
/// Field maps become records wherever `ty` expects one; the fields of
/// registered records are read with their declared types. Data that
/// doesn't fit `ty` is returned as is for the instance check to reject.
fn from_wire(registry: &Registry, data: Value, ty: &TypeDescriptor) -> Value {
    use TypeDescriptor as T;

    match (ty, data) {
        (_, Value::Null) => Value::Null,
        (T::Optional(inner) | T::NewType { base: inner, .. }, data) => {
            from_wire(registry, data, inner)
        }
        (T::Generic { origin, .. }, data) => from_wire(registry, data, origin),
        (T::Union(args), data) => {
            let found = args.iter().find_map(|variant| {
                let candidate = from_wire(registry, data.clone(), variant);
                is_instance(registry, &candidate, variant).then_some(candidate)
            });
            found.unwrap_or(data)
        }
        (T::Record(name), Value::Dict(entries))
            if entries.iter().all(|(k, _)| k.as_str().is_some()) =>
        {
            let scope = registry.scope(name);
            let fields = entries
                .into_iter()
                .filter_map(|(k, v)| match k {
                    Value::Str(k) => Some((k, v)),
                    _ => None,
                })
                .map(|(k, v)| match scope.as_ref().and_then(|s| s.field_type(&k)) {
                    Some(field_ty) => {
                        let v = from_wire(registry, v, field_ty);
                        (k, v)
                    }
                    None => (k, v),
                })
                .collect();
            Value::Record(RecordValue {
                type_name: name.clone(),
                fields,
            })
        }
        (T::List(Some(element)) | T::Set(Some(element)) | T::VariableTuple(element), data) => {
            let convert = |items: Vec<Value>| -> Vec<Value> {
                items
                    .into_iter()
                    .map(|item| from_wire(registry, item, element))
                    .collect()
            };
            match data {
                Value::List(items) => Value::List(convert(items)),
                Value::Set(items) => Value::Set(convert(items)),
                Value::Tuple(items) => Value::Tuple(convert(items)),
                other => other,
            }
        }
        (T::Tuple(Some(elements)), Value::Tuple(items)) if items.len() == elements.len() => {
            Value::Tuple(
                items
                    .into_iter()
                    .zip(elements)
                    .map(|(item, element)| from_wire(registry, item, element))
                    .collect(),
            )
        }
        (T::Mapping(Some((key_ty, value_ty))), Value::Dict(entries)) => Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (from_wire(registry, k, key_ty), from_wire(registry, v, value_ty)))
                .collect(),
        ),
        (_, data) => data,
    }
}
