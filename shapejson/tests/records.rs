use shapejson::{
    parse, parse_value, record, stringify, stringify_value, FieldBinding, FieldSelection, Json,
    RecordShape, ScalarKind, Shape, Value,
};

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Nested {
        #[json = "Nested"]
        pub nested: f64,
        pub note: Option<String>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Payload {
        #[json = "Foo"]
        pub foo: String,
        #[json]
        pub baz: bool,
        #[json = "Xam"]
        pub xam: Nested,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Unmapped {
        pub name: String,
        pub count: u32,
    }
}

fn payload() -> Payload {
    Payload {
        foo: "bar".into(),
        baz: false,
        xam: Nested {
            nested: 10.5,
            note: None,
        },
    }
}

#[test]
fn mapped_fields_serialize_under_wire_keys() {
    assert_eq!(
        stringify(&payload(), FieldSelection::OnlyBoundFields),
        r#"{"Foo":"bar","baz":false,"Xam":{"Nested":10.5}}"#
    );
    assert_eq!(
        stringify(&payload(), FieldSelection::AllFields),
        r#"{"Foo":"bar","baz":false,"Xam":{"Nested":10.5,"note":null}}"#
    );
}

#[test]
fn records_round_trip() {
    let text = stringify(&payload(), FieldSelection::AllFields);
    assert_eq!(parse::<Payload>(&text).unwrap(), payload());

    let mut noted = payload();
    noted.xam.note = Some("hi \"there\"".into());
    let text = stringify(&noted, FieldSelection::AllFields);
    assert_eq!(parse::<Payload>(&text).unwrap(), noted);
}

#[test]
fn wire_keys_match_exactly() {
    let parsed: Payload = parse(r#"{"foo":"lower","FOO":"upper","Foo":"exact"}"#).unwrap();
    assert_eq!(parsed.foo, "exact");
}

#[test]
fn first_occurrence_of_a_key_wins() {
    let parsed: Payload = parse(r#"{"Foo":"first","Foo":"second","baz":true}"#).unwrap();
    assert_eq!(parsed.foo, "first");
    assert!(parsed.baz);
}

#[test]
fn unknown_keys_and_missing_fields() {
    let parsed: Payload = parse(
        r#"{"extra":{"deep":[1,{"x":null}]},"Xam":{"Nested":2,"other":"?"}}"#,
    )
    .unwrap();
    assert_eq!(
        parsed,
        Payload {
            xam: Nested {
                nested: 2.0,
                note: None,
            },
            ..Payload::default()
        }
    );

    let empty: Unmapped = parse("{}").unwrap();
    assert_eq!(empty, Unmapped::default());
}

#[test]
fn mistyped_fields_keep_their_defaults() {
    let parsed: Unmapped = parse(r#"{"name":[5],"count":"lots"}"#).unwrap();
    assert_eq!(parsed, Unmapped::default());

    // Coercion still applies before the field is checked.
    let parsed: Unmapped = parse(r#"{"name":5,"count":"12"}"#).unwrap();
    assert_eq!(parsed.name, "5");
    assert_eq!(parsed.count, 12);
}

#[test]
fn unbound_fields_are_skipped_when_only_bound_fields_are_selected() {
    let unmapped = Unmapped {
        name: "n".into(),
        count: 3,
    };
    assert_eq!(stringify(&unmapped, FieldSelection::OnlyBoundFields), "{}");
    assert_eq!(
        stringify(&unmapped, FieldSelection::AllFields),
        r#"{"name":"n","count":3}"#
    );
    assert_eq!(
        stringify(&vec![unmapped], FieldSelection::OnlyBoundFields),
        "[{}]"
    );
}

#[test]
fn hand_built_descriptors() {
    let shape = RecordShape::new("Reading")
        .field(FieldBinding::new("sensor", Shape::Scalar(ScalarKind::String)).wire_key("Sensor"))
        .field(FieldBinding::new("at", Shape::Scalar(ScalarKind::DateTime)).mapped())
        .field(FieldBinding::new(
            "values",
            Shape::list(Shape::Scalar(ScalarKind::F32)),
        ))
        .into_shape();

    let value = parse_value(
        r#"{"at":"2021-06-01T12:00:00.250+01:00","values":[1.5,2],"Sensor":"t1"}"#,
        &shape,
    )
    .unwrap();
    assert_eq!(
        stringify_value(&value, FieldSelection::AllFields),
        r#"{"Sensor":"t1","at":"2021-06-01T11:00:00.250Z","values":[1.5,2]}"#
    );
    assert_eq!(
        stringify_value(&value, FieldSelection::OnlyBoundFields),
        r#"{"Sensor":"t1","at":"2021-06-01T11:00:00.250Z"}"#
    );
}

#[test]
fn records_parse_from_untyped_objects() {
    let value = parse_value(r#"{"Foo":"bar","Xam":{"Nested":1}}"#, &Shape::Any).unwrap();
    let payload = Payload::from_value(value).unwrap();
    assert_eq!(payload.foo, "bar");
    assert_eq!(payload.xam.nested, 1.0);

    assert_eq!(Payload::from_value(Value::from(vec![1])), None);
}
