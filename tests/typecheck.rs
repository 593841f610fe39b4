use facet_serde_scope::{
    Registry, SerdeErrorKind, TypeCheck, TypeDescriptor as T, Value, coerce, is_coercible,
};

#[test]
fn no_check_passes_anything_through() {
    let registry = Registry::new();
    let value = TypeCheck::NoCheck
        .apply(&registry, &T::int(), Value::from("not a number"))
        .unwrap();
    assert_eq!(value, Value::from("not a number"));
    assert_eq!(TypeCheck::default(), TypeCheck::NoCheck);
}

#[test]
fn strict_fails_on_mismatch() {
    let registry = Registry::new();
    assert!(TypeCheck::Strict.is_strict());

    let ok = TypeCheck::Strict.apply(&registry, &T::list(T::int()), Value::List(vec![Value::from(1)]));
    assert!(ok.is_ok());

    let err = TypeCheck::Strict
        .apply(&registry, &T::int(), Value::from("1"))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &SerdeErrorKind::NotInstance {
            value: "\"1\"".to_string(),
            expected: "int".to_string(),
        }
    );
    assert_eq!(err.to_string(), "\"1\" is not instance of int");
}

#[test]
fn coerce_converts_scalars() {
    let registry = Registry::new();
    let mode = TypeCheck::Coerce;
    assert!(mode.is_coerce());

    assert_eq!(mode.apply(&registry, &T::int(), Value::from("42")).unwrap(), Value::from(42));
    assert_eq!(mode.apply(&registry, &T::int(), Value::from(3.9)).unwrap(), Value::from(3));
    assert_eq!(mode.apply(&registry, &T::float(), Value::from(2)).unwrap(), Value::from(2.0));
    assert_eq!(mode.apply(&registry, &T::str(), Value::from(7)).unwrap(), Value::from("7"));
    assert_eq!(mode.apply(&registry, &T::bool(), Value::from("")).unwrap(), Value::from(false));
    assert_eq!(
        mode.apply(&registry, &T::optional(T::int()), Value::from("5")).unwrap(),
        Value::from(5)
    );
    assert_eq!(
        mode.apply(&registry, &T::new_type("Port", T::int()), Value::from("80")).unwrap(),
        Value::from(80)
    );
}

#[test]
fn coerce_leaves_null_and_conforming_values_alone() {
    let registry = Registry::new();
    assert!(!is_coercible(&T::int(), &Value::Null));
    assert_eq!(coerce(&registry, &T::int(), Value::Null).unwrap(), Value::Null);

    // bool already is an int
    assert_eq!(coerce(&registry, &T::int(), Value::from(true)).unwrap(), Value::from(true));
}

#[test]
fn coerce_reports_impossible_conversions() {
    let registry = Registry::new();
    let err = coerce(&registry, &T::int(), Value::from("forty-two")).unwrap_err();
    assert_eq!(
        err.kind(),
        &SerdeErrorKind::Coercion {
            value: "\"forty-two\"".to_string(),
            expected: "int".to_string(),
        }
    );
    assert_eq!(err.to_string(), "can not coerce \"forty-two\" into int");

    let err = coerce(&registry, &T::list(T::int()), Value::from(1)).unwrap_err();
    assert!(matches!(err.kind(), SerdeErrorKind::Coercion { .. }));
}

#[test]
fn floats_outside_the_int_range_are_not_coerced() {
    let registry = Registry::new();
    assert_eq!(coerce(&registry, &T::int(), Value::from(-7.5)).unwrap(), Value::from(-7));
    assert_eq!(
        coerce(&registry, &T::int(), Value::from(-9_223_372_036_854_775_808.0)).unwrap(),
        Value::from(i64::MIN)
    );

    for f in [1e300, -1e300, 9_223_372_036_854_775_808.0, f64::INFINITY, f64::NAN] {
        let err = coerce(&registry, &T::int(), Value::from(f)).unwrap_err();
        assert!(matches!(err.kind(), SerdeErrorKind::Coercion { .. }), "{f}");
    }
}
