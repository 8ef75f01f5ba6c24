extern crate underscore;

use underscore::args;
use underscore::runner::api::Underscore;
use underscore::runner::ds::map::ValueMap;
use underscore::runner::ds::value::{Callable, Value};
use underscore::runner::plugin::WrapperType;

fn article() -> Value {
    let mut meta = ValueMap::new();
    meta.insert("author", Value::from("foo"));
    let mut map = ValueMap::new();
    map.insert("title", Value::from("Hello"));
    map.insert("meta", Value::Map(meta));
    Value::Map(map)
}

#[test]
fn test_dotted_get() {
    let u = Underscore::new();
    let repo = u.from(article()).unwrap();
    assert_eq!(repo.get("meta.author", Value::Null).unwrap(), Value::from("foo"));
    assert_eq!(repo.get("meta.missing", Value::from("none")).unwrap(), Value::from("none"));

    let computed = Value::Function(Callable::new(|_| Ok(Value::from("computed"))));
    assert_eq!(repo.get("nope", computed).unwrap(), Value::from("computed"));
}

#[test]
fn test_dotted_set_on_maps_and_structs() {
    let u = Underscore::new();

    let mut map = u.of(WrapperType::Lists).create();
    map.set("a.b", Value::from(1)).unwrap();
    assert_eq!(map.get("a.b", Value::Null).unwrap(), Value::from(1));

    let mut object = u.of(WrapperType::Structs).create();
    object.set("name", Value::from("foo")).unwrap();
    object.set("address.city", Value::from("bar")).unwrap();
    assert_eq!(object.get("name", Value::Null).unwrap(), Value::from("foo"));
    assert_eq!(object.get("address.city", Value::Null).unwrap(), Value::from("bar"));
    assert!(matches!(object.subject(), Value::Object(_)));
}

#[test]
fn test_get_through_the_chain() {
    let mut repo = Underscore::new().from(article()).unwrap();
    assert_eq!(repo.value("get", args!["meta.author"]).unwrap(), Value::from("foo"));
    assert_eq!(repo.obtain(), article());
}

#[test]
fn test_string_conversion() {
    let u = Underscore::new();
    let list = u.of(WrapperType::Lists).from(Value::Array(args![1, 2]));
    assert_eq!(list.to_string(), "[1,2]");
    assert_eq!(u.from(article()).unwrap().to_string(), r#"{"title":"Hello","meta":{"author":"foo"}}"#);
    assert_eq!(u.of(WrapperType::Numbers).from(5).to_string(), "5");
}

#[test]
fn test_emptiness() {
    let u = Underscore::new();
    assert!(u.of(WrapperType::Lists).create().is_empty());
    assert!(u.of(WrapperType::Strings).from("").is_empty());
    assert!(!u.of(WrapperType::Strings).from("foo").is_empty());
    assert!(u.of(WrapperType::Numbers).create().is_empty());
}

#[test]
fn test_subject_replacement() {
    let u = Underscore::new();
    let mut repo = u.of(WrapperType::Strings).from("foo");
    repo.set_subject(Value::from("bar"));
    assert_eq!(repo.obtain(), Value::from("bar"));
    assert_eq!(repo.wrapper_type(), WrapperType::Strings);

    // The next call dispatches on what the subject is now.
    repo.set_subject(Value::Array(args!["b", "a"]));
    repo.chain("sort", args![]).unwrap();
    assert_eq!(repo.into_inner(), Value::Array(args!["a", "b"]));
}

#[test]
fn test_typecast_on_construction() {
    let u = Underscore::new();
    assert_eq!(u.of(WrapperType::Numbers).from("12").obtain(), Value::from(12));

    let object = u.of(WrapperType::Structs).from(Value::Array(args!["x"])).obtain();
    match object {
        Value::Object(fields) => assert_eq!(fields.get("0"), Some(&Value::from("x"))),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_long_chain() {
    let mut repo = Underscore::new().of(WrapperType::Lists).from(Value::Array(args![5, 3, 3, 1]));
    repo.chain("unique", args![])
        .and_then(|r| r.chain("sort", args![]))
        .and_then(|r| r.chain("implode", args!["-"]))
        .and_then(|r| r.chain("upper", args![]))
        .unwrap();
    assert_eq!(repo.obtain(), Value::from("1-3-5"));
}
