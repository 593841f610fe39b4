use facet_serde_scope::{
    FieldAccess, FieldAttrs, FieldDescriptor, RawField, RecordOptions, RecordType, Registry,
    SerdeErrorKind, TypeDescriptor as T, Value, conv, fields,
};

fn describe(raw: RawField) -> FieldDescriptor {
    FieldDescriptor::from_raw(&raw, Some(&T::record("Owner")))
}

#[test]
fn explicit_predicate_wins_over_skip_if_false() {
    let field = describe(
        RawField::new("tags", T::list(T::str())).with_attrs(
            FieldAttrs::new()
                .skip_if_false(true)
                .skip_if(|v| v.as_str() == Some("hidden")),
        ),
    );

    let skip_if = field.skip_if.as_ref().unwrap();
    assert_eq!(skip_if.name(), "tags_skip_if");
    assert!(skip_if.call(&Value::from("hidden")));
    assert!(!skip_if.call(&Value::List(vec![])));
}

#[test]
fn skip_if_false_wins_over_skip_if_default() {
    let field = describe(
        RawField::new("n", T::int())
            .with_default(5)
            .with_attrs(FieldAttrs::new().skip_if_default(true).skip_if_false(true)),
    );

    let skip_if = field.skip_if.as_ref().unwrap();
    assert_eq!(skip_if.name(), "n_skip_if_false");
    assert!(skip_if.call(&Value::from(0)));
    assert!(!skip_if.call(&Value::from(5)));
}

#[test]
fn derivation_is_deterministic() {
    let raw = RawField::new("id", T::int())
        .with_attrs(FieldAttrs::new().rename("ID").skip_if_false(true).serializer(|v| Ok(v.clone())));
    let a = describe(raw.clone());
    let b = describe(raw);

    assert_eq!(a.name, b.name);
    assert_eq!(a.rename, b.rename);
    assert_eq!(
        a.skip_if.as_ref().map(|f| f.name().to_string()),
        b.skip_if.as_ref().map(|f| f.name().to_string())
    );
    assert_eq!(a.serializer.as_ref().unwrap().name(), "id_serializer");
    assert_eq!(b.serializer.as_ref().unwrap().name(), "id_serializer");
}

#[test]
fn skip_flag_is_kept_apart_from_the_predicate() {
    let field = describe(RawField::new("secret", T::str()).with_attrs(FieldAttrs::new().skip(true)));
    assert!(field.skip_if.is_none());
    assert!(field.should_skip(&Value::from("anything")));

    let plain = describe(RawField::new("plain", T::str()));
    assert!(!plain.should_skip(&Value::Null));
}

#[test]
fn rename_overrides_the_case_policy() {
    let field = describe(RawField::new("user_name", T::str()));
    assert_eq!(conv(&field, None).unwrap(), "user_name");
    assert_eq!(conv(&field, Some("camelcase")).unwrap(), "userName");
    assert_eq!(conv(&field, Some("pascalcase")).unwrap(), "UserName");
    assert_eq!(conv(&field, Some("kebabcase")).unwrap(), "user-name");

    let renamed = describe(
        RawField::new("user_name", T::str()).with_attrs(FieldAttrs::new().rename("login")),
    );
    assert_eq!(conv(&renamed, Some("camelcase")).unwrap(), "login");
}

#[test]
fn aliases_are_accepted_but_never_produced() {
    let field = describe(
        RawField::new("name", T::str()).with_attrs(FieldAttrs::new().alias(["nick", "handle"])),
    );
    assert_eq!(field.conv_name(None).unwrap(), "name");
    assert_eq!(field.accepted_names().unwrap(), ["name", "nick", "handle"]);
}

#[test]
fn empty_wire_name_is_rejected() {
    let field = describe(RawField::new("x", T::int()).with_attrs(FieldAttrs::new().rename("")));
    let err = field.conv_name(None).unwrap_err();
    assert_eq!(err.kind(), &SerdeErrorKind::MissingFieldName);
}

#[test]
fn defaults_are_only_used_by_keyed_access() {
    let literal = describe(RawField::new("a", T::int()).with_default(1));
    let factory = describe(RawField::new("b", T::list(T::int())).with_default_factory(|| Value::List(vec![])));
    let required = describe(RawField::new("c", T::int()));

    assert!(literal.supports_default(FieldAccess::Keyed));
    assert!(factory.supports_default(FieldAccess::Keyed));
    assert!(!required.supports_default(FieldAccess::Keyed));

    assert!(!literal.supports_default(FieldAccess::Positional));
    assert!(!factory.supports_default(FieldAccess::Positional));

    assert!(literal.has_default() && !literal.has_default_factory());
    assert!(factory.has_default_factory() && !factory.has_default());
    assert_eq!(factory.default.produce(), Some(Value::List(vec![])));
}

#[test]
fn self_referencing_fields() {
    let node = RecordType::new("Node")
        .field(RawField::new("value", T::int()))
        .field(RawField::new("next", T::record("Node")));
    let fields = fields(&node, false);

    assert!(!fields[0].is_self_referencing());
    assert!(fields[1].is_self_referencing());
    assert_eq!(fields[1].parent, Some(T::record("Node")));
}

#[test]
fn class_vars_become_fields_on_request() {
    let record = RecordType::new("Config")
        .field(RawField::new("host", T::str()))
        .class_var("VERSION", T::int(), 2);

    assert_eq!(fields(&record, false).len(), 1);

    let with_class_vars = fields(&record, true);
    assert_eq!(with_class_vars.len(), 2);
    let version = &with_class_vars[1];
    assert_eq!(version.name, "VERSION");
    assert_eq!(version.parent, None);
    assert_eq!(version.default.value(), Some(&Value::from(2)));
}

#[test]
fn flatten_is_carried_over() {
    let field = describe(RawField::new("inner", T::record("Inner")).with_attrs(FieldAttrs::new().flatten()));
    assert!(field.is_flatten());
    assert!(!describe(RawField::new("x", T::int())).is_flatten());
}

#[test]
fn renamed_id_and_skipped_default_name() {
    let registry = Registry::new();
    let user = RecordType::new("User")
        .field(RawField::new("id", T::int()).with_attrs(FieldAttrs::new().rename("ID")))
        .field(
            RawField::new("name", T::str())
                .with_default("anon")
                .with_attrs(FieldAttrs::new().skip_if_default(true)),
        );

    let mut seen = Vec::new();
    registry
        .register_with(user, RecordOptions::default(), |_, fields| {
            seen.extend(fields.iter().cloned());
            Ok(())
        })
        .unwrap();

    assert_eq!(seen[0].conv_name(None).unwrap(), "ID");

    let skip_if = seen[1].skip_if.as_ref().unwrap();
    assert_eq!(skip_if.name(), "name_skip_if_default");
    assert!(skip_if.call(&Value::from("anon")));
    assert!(!skip_if.call(&Value::from("bob")));
    assert!(seen[1].should_skip(&Value::from("anon")));
}

#[test]
fn rename_all_reaches_every_field() {
    let registry = Registry::new();
    let record = RecordType::new("Retry")
        .field(RawField::new("max_retries", T::int()))
        .field(RawField::new("backoff_ms", T::int()).with_attrs(FieldAttrs::new().rename("delay")));

    let mut names = Vec::new();
    registry
        .register_with(record, RecordOptions::default().rename_all("camelcase"), |_, fields| {
            for f in fields {
                names.push(f.conv_name(None)?);
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(names, ["maxRetries", "delay"]);

    let bad = RecordType::new("Bad").field(RawField::new("a", T::int()));
    let err = registry
        .register(bad, RecordOptions::default().rename_all("spongecase"))
        .unwrap_err();
    assert_eq!(err.kind(), &SerdeErrorKind::UnknownCase("spongecase".to_string()));
    assert!(!registry.is_registered("Bad"));
}
