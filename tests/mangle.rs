use facet_serde_scope::{
    GLOBAL_PREFIX, LiteralValue, TypeDescriptor, UNION_DE_PREFIX, UNION_SE_PREFIX,
    literal_func_name, mangle, union_func_name,
};

#[test]
fn field_helpers_are_suffixed_with_their_purpose() {
    assert_eq!(mangle("id", "skip_if"), "id_skip_if");
    assert_eq!(mangle("name", "serializer"), "name_serializer");
    assert_eq!(mangle("name", "serializer"), mangle("name", "serializer"));
}

#[test]
fn union_names_depend_only_on_the_variant_list() {
    let args = || {
        vec![
            TypeDescriptor::int(),
            TypeDescriptor::optional(TypeDescriptor::str()),
            TypeDescriptor::mapping(TypeDescriptor::str(), TypeDescriptor::float()),
        ]
    };

    let first = union_func_name(UNION_SE_PREFIX, &args());
    let second = union_func_name(UNION_SE_PREFIX, &args());
    assert_eq!(first, second);
    assert_eq!(first, "union_se_int_Optional_str__Dict_str__float_");

    assert_eq!(
        union_func_name(UNION_DE_PREFIX, &args()),
        "union_de_int_Optional_str__Dict_str__float_"
    );
    assert_eq!(
        union_func_name(GLOBAL_PREFIX, &args()),
        "global_int_Optional_str__Dict_str__float_"
    );
}

#[test]
fn union_names_are_order_sensitive() {
    let a = union_func_name(UNION_SE_PREFIX, &[TypeDescriptor::int(), TypeDescriptor::str()]);
    let b = union_func_name(UNION_SE_PREFIX, &[TypeDescriptor::str(), TypeDescriptor::int()]);
    assert_ne!(a, b);
}

#[test]
fn lists_that_sanitize_alike_collide() {
    // Known limitation: "List[str]" and a record literally named "List_str_"
    // both sanitize to the same name.
    let a = union_func_name(UNION_SE_PREFIX, &[TypeDescriptor::list(TypeDescriptor::str())]);
    let b = union_func_name(UNION_SE_PREFIX, &[TypeDescriptor::record("List_str_")]);
    assert_eq!(a, b);
}

#[test]
fn literal_names_pair_values_with_their_types() {
    let args = [
        LiteralValue::from("a"),
        LiteralValue::from(1i64),
        LiteralValue::from(true),
    ];
    let name = literal_func_name(&args);
    assert_eq!(name, literal_func_name(&args));
    assert_eq!(name, "literal_de_a_str_1_int_true_bool");
}
