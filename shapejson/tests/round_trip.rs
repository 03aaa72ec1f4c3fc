use std::collections::{BTreeMap, HashMap};

use shapejson::{
    parse, parse_value, stringify, stringify_value, FieldSelection, Json, Number, Shape, Value,
};
use time::macros::datetime;
use time::OffsetDateTime;

fn compact<T: Json>(value: &T) -> String {
    stringify(value, FieldSelection::AllFields)
}

fn assert_round_trips<T: Json + PartialEq + std::fmt::Debug>(value: T) {
    let text = compact(&value);
    let back: T = parse(&text).unwrap_or_else(|err| panic!("{text}: {err}"));
    assert_eq!(back, value, "round trip through {text}");
}

#[test]
fn scalars_round_trip() {
    assert_round_trips(true);
    assert_round_trips(false);
    assert_round_trips(i8::MIN);
    assert_round_trips(i16::MAX);
    assert_round_trips(-5i32);
    assert_round_trips(i64::MIN);
    assert_round_trips(u8::MAX);
    assert_round_trips(u32::MAX);
    assert_round_trips(u64::MAX);
    assert_round_trips(55.7f32);
    assert_round_trips(48.25f64);
    assert_round_trips(3.0f64);
    assert_round_trips(String::new());
    assert_round_trips(String::from("plain"));
    assert_round_trips(datetime!(2013-05-04 08:20:30.123 UTC));
}

#[test]
fn every_escape_round_trips() {
    let text = String::from("\u{07}\u{08}\u{0c}\n\r\t\u{0b}\\\" and /é☃");
    assert_round_trips(text);
    assert_eq!(compact(&String::from("foo\u{08}bar")), r#""foo\bbar""#);
}

#[test]
fn numeric_scalars_parse() {
    assert_eq!(parse::<i32>("-5").unwrap(), -5);
    assert_eq!(parse::<f32>("55.7").unwrap(), 55.7);
    assert_eq!(parse::<i64>("13e7").unwrap(), 130_000_000);
    assert_eq!(parse::<f64>(" 1e-3 ").unwrap(), 0.001);
}

#[test]
fn collections_round_trip() {
    assert_round_trips(vec![1, 2, 4, 3]);
    assert_round_trips(Vec::<String>::new());
    assert_round_trips([[1u8, 2], [3, 4]]);
    assert_round_trips(vec![Some(1.5), None]);
    assert_round_trips(vec![vec![true], vec![], vec![false, true]]);

    let mut by_id = HashMap::new();
    by_id.insert(1i32, vec![String::from("a")]);
    by_id.insert(-4, vec![]);
    assert_round_trips(by_id);

    let mut flags = BTreeMap::new();
    flags.insert(true, 1u64);
    flags.insert(false, 0);
    assert_round_trips(flags);

    let mut stamps = HashMap::new();
    stamps.insert(String::from("start"), datetime!(1999-12-31 23:59:59.999 UTC));
    assert_round_trips::<HashMap<String, OffsetDateTime>>(stamps);
}

#[test]
fn maps_round_trip_regardless_of_order() {
    let map: Value = [
        ("Ten", Value::from(10)),
        ("Hoopla", Value::from(true)),
        ("Monkey", Value::from("Awesome")),
    ]
    .into_iter()
    .collect();
    let text = stringify_value(&map, FieldSelection::AllFields);
    assert_eq!(text, r#"{"Ten":10,"Hoopla":true,"Monkey":"Awesome"}"#);
    assert_eq!(parse_value(&text, &Shape::Any).unwrap(), map);

    let reordered = parse_value(
        r#"{"Monkey":"Awesome","Ten":10,"Hoopla":true}"#,
        &Shape::Any,
    )
    .unwrap();
    assert_eq!(reordered, map);

    let typed: HashMap<String, Value> = parse(&text).unwrap();
    assert_eq!(typed.len(), 3);
    assert_eq!(typed["Ten"], Value::from(10));
}

#[test]
fn integer_keyed_maps_keep_integer_keys() {
    let map: HashMap<i32, i32> = parse(r#"{"1":2,"4":3}"#).unwrap();
    assert_eq!(map, HashMap::from([(1, 2), (4, 3)]));

    let shape = HashMap::<i32, i32>::shape();
    let value = parse_value(r#"{"1":2,"4":3}"#, &shape).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, [shapejson::Key::I64(1), shapejson::Key::I64(4)]);
}

#[test]
fn stringify_is_idempotent_through_untyped_parse() {
    let docs = [
        r#"{"a":[1,2.5,-3e2,{"b":null}],"c":"d\ne","f":true}"#,
        r#"[[],{},"",0]"#,
        r#""\a\v\\""#,
        r#"{"1":{"2":[false]}}"#,
    ];
    for doc in docs {
        let once = stringify_value(&parse_value(doc, &Shape::Any).unwrap(), FieldSelection::AllFields);
        let twice = stringify_value(&parse_value(&once, &Shape::Any).unwrap(), FieldSelection::AllFields);
        assert_eq!(once, twice);
        assert_eq!(once, doc);
    }
}

#[test]
fn whitespace_is_insignificant() {
    let spaced = parse_value(" {\n\t\"a\" :\r [ 1 , 2 ] } ", &Shape::Any).unwrap();
    assert_eq!(
        stringify_value(&spaced, FieldSelection::AllFields),
        r#"{"a":[1,2]}"#
    );
}

#[test]
fn reader_and_string_parsing_agree() {
    let doc = r#"{"name":"snow ☃","sizes":[1,2,3],"when":"2020-01-01T00:00:00.000Z"}"#;
    let shape = Shape::Any;
    let from_str = parse_value(doc, &shape).unwrap();
    let from_reader = shapejson::parse_value_from_reader(doc.as_bytes(), &shape).unwrap();
    assert_eq!(from_str, from_reader);

    let sizes: Vec<u16> = shapejson::from_reader(&b"[1, 2, 3]"[..]).unwrap();
    assert_eq!(sizes, [1, 2, 3]);
}

#[test]
fn non_finite_floats_are_written_as_null() {
    assert_eq!(compact(&f64::NAN), "null");
    assert_eq!(compact(&vec![f32::INFINITY, 1.0]), "[null,1]");
    assert!(matches!(
        parse_value("null", &f64::shape()).unwrap(),
        Value::Null
    ));
    assert!(matches!(
        parse_value("1", &f64::shape()).unwrap(),
        Value::Number(Number::F64(n)) if n == 1.0
    ));
}
