use facet_serde_scope::{SerdeErrorKind, Tagged, Tagging, TaggingKind, Value};

#[test]
fn internal_tagging_requires_a_tag() {
    let err = Tagging::new(TaggingKind::Internal, None, None).unwrap_err();
    assert_eq!(err.kind(), &SerdeErrorKind::MissingTag);
    assert_eq!(err.to_string(), "\"tag\" must be specified in internal tagging");

    assert!(Tagging::new(TaggingKind::Internal, Some("type"), None).is_ok());
}

#[test]
fn adjacent_tagging_requires_tag_and_content() {
    for (tag, content) in [(None, None), (Some("t"), None), (None, Some("c"))] {
        let err = Tagging::new(TaggingKind::Adjacent, tag, content).unwrap_err();
        assert_eq!(err.kind(), &SerdeErrorKind::MissingTagOrContent);
    }
    assert!(Tagging::new(TaggingKind::Adjacent, Some("t"), Some("c")).is_ok());
}

#[test]
fn external_and_untagged_never_fail() {
    for kind in [TaggingKind::External, TaggingKind::Untagged] {
        for (tag, content) in [(None, None), (Some("t"), None), (Some("t"), Some("c"))] {
            assert!(Tagging::new(kind, tag, content).is_ok());
        }
    }
    assert_eq!(Tagging::default(), Tagging::external());
}

#[test]
fn hand_built_tagging_is_checked() {
    let tagging = Tagging {
        tag: None,
        content: None,
        kind: TaggingKind::Internal,
    };
    assert!(tagging.check().is_err());
    assert!(tagging.encode("Foo", Value::dict([("a", Value::from(1))])).is_err());
}

#[test]
fn external_wraps_in_a_single_key_mapping() {
    let tagging = Tagging::external();
    let encoded = tagging.encode("int", Value::from(10)).unwrap();
    assert_eq!(encoded, Value::dict([("int", Value::from(10))]));

    match tagging.decode(&encoded).unwrap() {
        Tagged::Variant { name, content } => {
            assert_eq!(name, "int");
            assert_eq!(content, Value::from(10));
        }
        other => panic!("expected a variant, got {other:?}"),
    }

    let two_keys = Value::dict([("a", Value::from(1)), ("b", Value::from(2))]);
    let err = tagging.decode(&two_keys).unwrap_err();
    assert!(matches!(err.kind(), SerdeErrorKind::MalformedTaggedValue(_)));
}

#[test]
fn internal_merges_the_tag_into_the_field_map() {
    let tagging = Tagging::internal("type");
    let fields = Value::dict([("x", Value::from(1)), ("y", Value::from(2))]);
    let encoded = tagging.encode("Point", fields.clone()).unwrap();
    assert_eq!(
        encoded,
        Value::dict([
            ("type", Value::from("Point")),
            ("x", Value::from(1)),
            ("y", Value::from(2)),
        ])
    );

    assert_eq!(
        tagging.decode(&encoded).unwrap(),
        Tagged::Variant {
            name: "Point",
            content: fields,
        }
    );

    let err = tagging.encode("int", Value::from(1)).unwrap_err();
    assert!(matches!(err.kind(), SerdeErrorKind::UnsupportedType(_)));

    let untagged = Value::dict([("x", Value::from(1))]);
    assert!(tagging.decode(&untagged).is_err());
}

#[test]
fn adjacent_splits_tag_and_content() {
    let tagging = Tagging::adjacent("t", "c");
    let encoded = tagging.encode("str", Value::from("hi")).unwrap();
    assert_eq!(
        encoded,
        Value::dict([("t", Value::from("str")), ("c", Value::from("hi"))])
    );
    assert_eq!(
        tagging.decode(&encoded).unwrap(),
        Tagged::Variant {
            name: "str",
            content: Value::from("hi"),
        }
    );

    let missing_content = Value::dict([("t", Value::from("str"))]);
    assert!(tagging.decode(&missing_content).is_err());
}

#[test]
fn untagged_is_the_bare_value() {
    let tagging = Tagging::untagged();
    let encoded = tagging.encode("int", Value::from(3)).unwrap();
    assert_eq!(encoded, Value::from(3));
    assert_eq!(tagging.decode(&encoded).unwrap(), Tagged::Untagged(&Value::from(3)));
}
