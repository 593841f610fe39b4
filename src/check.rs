//! Structural instance checks.
//!
//! [`is_instance`] works like a nominal type test but understands composite
//! descriptors. Containers are sampled, not scanned: lists and sets check
//! their first element only, mappings one entry. A heterogeneous container
//! whose first element conforms is therefore accepted.

use std::sync::Arc;

use crate::{
    Result, SerdeErrorKind,
    descriptor::{Primitive, TypeDescriptor},
    field::FieldDescriptor,
    registry::Registry,
    scope::{SynthFn, TYPE_CHECK},
    value::Value,
};

/// Checks `value` against `ty`. Never fails; any error inside a record's
/// generated `typecheck` function counts as a mismatch.
pub fn is_instance(registry: &Registry, value: &Value, ty: &TypeDescriptor) -> bool {
    match ty {
        TypeDescriptor::Record(name) => is_record_instance(registry, value, name),
        TypeDescriptor::Optional(inner) => value.is_null() || is_instance(registry, value, inner),
        TypeDescriptor::Union(args) => union_variant(registry, value, args).is_some(),
        TypeDescriptor::List(arg) => match value {
            Value::List(items) => is_sampled_instance(registry, items, arg.as_deref()),
            _ => false,
        },
        TypeDescriptor::Set(arg) => match value {
            Value::Set(items) => is_sampled_instance(registry, items, arg.as_deref()),
            _ => false,
        },
        TypeDescriptor::Tuple(args) => is_tuple_instance(registry, value, args.as_deref()),
        TypeDescriptor::VariableTuple(arg) => match value {
            Value::Tuple(items) => items.iter().all(|v| is_instance(registry, v, arg)),
            _ => false,
        },
        TypeDescriptor::Mapping(args) => is_dict_instance(registry, value, args.as_ref()),
        TypeDescriptor::Generic { origin, .. } => is_instance(registry, value, origin),
        // Literal values are not compared here.
        TypeDescriptor::Literal(_) => true,
        TypeDescriptor::NewType { base, .. } => is_instance(registry, value, base),
        TypeDescriptor::Ellipsis => true,
        TypeDescriptor::Primitive(p) => is_primitive_instance(value, *p),
    }
}

/// Index and type of the first union variant `value` conforms to, in
/// declaration order.
pub fn union_variant<'t>(
    registry: &Registry,
    value: &Value,
    args: &'t [TypeDescriptor],
) -> Option<(usize, &'t TypeDescriptor)> {
    args.iter()
        .enumerate()
        .find(|(_, arg)| is_instance(registry, value, arg))
}

fn is_record_instance(registry: &Registry, value: &Value, name: &str) -> bool {
    if let Some(check) = registry
        .scope(name)
        .and_then(|scope| scope.func(TYPE_CHECK).cloned())
    {
        if check(registry, value).is_err() {
            return false;
        }
    } else {
        log::trace!("No typecheck for '{name}', falling back to a nominal check");
    }
    value.as_record().is_some_and(|r| r.type_name == name)
}

fn is_sampled_instance(registry: &Registry, items: &[Value], arg: Option<&TypeDescriptor>) -> bool {
    match (items.first(), arg) {
        (Some(first), Some(arg)) => is_instance(registry, first, arg),
        _ => true,
    }
}

fn is_tuple_instance(registry: &Registry, value: &Value, args: Option<&[TypeDescriptor]>) -> bool {
    let Value::Tuple(items) = value else {
        return false;
    };
    let Some(args) = args else {
        return true;
    };
    items.len() == args.len()
        && items
            .iter()
            .zip(args)
            .all(|(item, arg)| is_instance(registry, item, arg))
}

fn is_dict_instance(
    registry: &Registry,
    value: &Value,
    args: Option<&(Box<TypeDescriptor>, Box<TypeDescriptor>)>,
) -> bool {
    let Value::Dict(entries) = value else {
        return false;
    };
    match (entries.first(), args) {
        (Some((k, v)), Some((kt, vt))) => {
            is_instance(registry, k, kt) && is_instance(registry, v, vt)
        }
        _ => true,
    }
}

fn is_primitive_instance(value: &Value, p: Primitive) -> bool {
    match (p, value) {
        (Primitive::Bool, Value::Bool(_)) => true,
        // bool is an integer subtype
        (Primitive::Int, Value::Int(_) | Value::Bool(_)) => true,
        (Primitive::Float, Value::Float(_)) => true,
        (Primitive::Str, Value::Str(_)) => true,
        (Primitive::Bytes, Value::Bytes(_)) => true,
        _ => false,
    }
}

/// How the generated `typecheck` function treats one field.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldCheck {
    Skip,
    Nested(String),
    Instance,
}

impl FieldCheck {
    fn of(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Literal(_) | TypeDescriptor::Ellipsis => FieldCheck::Skip,
            TypeDescriptor::Record(name) => FieldCheck::Nested(name.clone()),
            _ => FieldCheck::Instance,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldCheck::Skip => "skip",
            FieldCheck::Nested(_) => "nested",
            FieldCheck::Instance => "instance",
        }
    }
}

/// Builds the `typecheck` function of a record and its debug source.
///
/// The function fails with `"{record}.{field} is not instance of {type}"`
/// on the first nonconforming field. Missing fields are checked as null.
pub(crate) fn render_type_check(record: &str, fields: &[FieldDescriptor]) -> (SynthFn, String) {
    let plan: Vec<(String, TypeDescriptor, FieldCheck)> = fields
        .iter()
        .map(|f| (f.name.clone(), f.ty.clone(), FieldCheck::of(&f.ty)))
        .collect();

    let mut source = format!("{TYPE_CHECK} {record:?} {{\n");
    for (name, ty, check) in &plan {
        source.push_str(&format!(
            "field {name:?} check={:?} type={:?}\n",
            check.name(),
            ty.typename()
        ));
    }
    source.push_str("}\n");

    let record = record.to_string();
    let func: SynthFn = Arc::new(move |registry: &Registry, value: &Value| -> Result<Value> {
        let Some(instance) = value.as_record() else {
            return Err(SerdeErrorKind::TypeMismatch {
                path: value.kind_name().to_string(),
                expected: record.clone(),
            }
            .into());
        };

        for (name, ty, check) in &plan {
            let field_value = instance.fields.get(name).unwrap_or(&Value::Null);
            let mismatch = || -> crate::SerdeError {
                SerdeErrorKind::TypeMismatch {
                    path: format!("{record}.{name}"),
                    expected: ty.typename(),
                }
                .into()
            };

            match check {
                FieldCheck::Skip => {}
                FieldCheck::Nested(nested) => {
                    match registry.scope(nested).and_then(|s| s.func(TYPE_CHECK).cloned()) {
                        Some(nested_check) => {
                            nested_check(registry, field_value).map_err(|_| mismatch())?;
                        }
                        None if is_instance(registry, field_value, ty) => {}
                        None => return Err(mismatch()),
                    }
                }
                FieldCheck::Instance => {
                    if !is_instance(registry, field_value, ty) {
                        return Err(mismatch());
                    }
                }
            }
        }

        Ok(Value::Null)
    });

    (func, source)
}
