//! Deterministic names for generated functions.
//!
//! Every generated function is stored under a name derived purely from
//! field or type identity, so the same input always lands in the same slot.
//! Names are sanitized to `[A-Za-z0-9_]`; two type lists that stringify
//! identically after sanitization map to the same name and the later
//! registration overwrites the earlier one.

use crate::descriptor::{LiteralValue, TypeDescriptor};

/// Prefix of union serializing functions.
pub const UNION_SE_PREFIX: &str = "union_se";

/// Prefix of union deserializing functions.
pub const UNION_DE_PREFIX: &str = "union_de";

/// Prefix of literal deserializing functions.
pub const LITERAL_DE_PREFIX: &str = "literal_de";

/// Prefix of the synthetic records owning bare union functions.
pub const GLOBAL_PREFIX: &str = "global";

/// Name of a per-field helper, e.g. `mangle("id", "skip_if") == "id_skip_if"`.
pub fn mangle(field_name: &str, purpose: &str) -> String {
    format!("{field_name}_{purpose}")
}

/// Name of a function covering all variants of a union.
///
/// ```
/// use facet_serde_scope::{TypeDescriptor, union_func_name};
///
/// let args = [
///     TypeDescriptor::int(),
///     TypeDescriptor::list(TypeDescriptor::str()),
///     TypeDescriptor::record("IPv4Address"),
/// ];
/// assert_eq!(union_func_name("union_se", &args), "union_se_int_List_str__IPv4Address");
/// ```
pub fn union_func_name(prefix: &str, union_args: &[TypeDescriptor]) -> String {
    let names = union_args
        .iter()
        .map(TypeDescriptor::typename)
        .collect::<Vec<_>>()
        .join("_");
    sanitize(&format!("{prefix}_{names}"))
}

/// Name of a function covering all values of a literal type, each paired
/// with its runtime type name.
///
/// ```
/// use facet_serde_scope::{LiteralValue, literal_func_name};
///
/// let args = ["r", "w", "r+"].map(LiteralValue::from);
/// assert_eq!(literal_func_name(&args), "literal_de_r_str_w_str_r__str");
/// ```
pub fn literal_func_name(literal_args: &[LiteralValue]) -> String {
    let names = literal_args
        .iter()
        .map(|a| format!("{a}_{}", a.typename()))
        .collect::<Vec<_>>()
        .join("_");
    sanitize(&format!("{LITERAL_DE_PREFIX}_{names}"))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
