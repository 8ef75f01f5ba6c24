//! Tests for classification, method resolution and chain semantics.

extern crate underscore;

use std::sync::Arc;

use parking_lot::Mutex;
use underscore::args;
use underscore::runner::api::Underscore;
use underscore::runner::ds::error::UnderscoreError;
use underscore::runner::ds::map::ValueMap;
use underscore::runner::ds::value::{Callable, ResourceHandle, Value};
use underscore::runner::plugin::{classify, CallTarget, Options, WrapperType};
use underscore::runner::repository::Outcome;

fn numbers(values: &[i64]) -> Value {
    Value::Array(values.iter().map(|v| Value::from(*v)).collect())
}

// ============================================================================
// Classification
// ============================================================================

mod classification_tests {
    use super::*;

    #[test]
    fn test_classification_is_deterministic() {
        let samples = vec![
            (Value::from("foo"), WrapperType::Strings),
            (Value::from(3), WrapperType::Numbers),
            (Value::from(3.5), WrapperType::Numbers),
            (numbers(&[1, 2]), WrapperType::Lists),
            (Value::Map(ValueMap::new()), WrapperType::Lists),
            (Value::Object(ValueMap::new()), WrapperType::Structs),
            (Value::Function(Callable::new(|_| Ok(Value::Null))), WrapperType::Functions),
        ];
        for (value, expected) in samples {
            for _ in 0..3 {
                assert_eq!(classify(&value).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_handles_are_not_classified() {
        let handle = Value::Resource(ResourceHandle::new("stream", 7));
        for _ in 0..3 {
            assert!(matches!(classify(&handle), Err(UnderscoreError::Classification(_))));
        }
        assert!(matches!(
            Underscore::new().from(handle),
            Err(UnderscoreError::Classification(_))
        ));
    }

    #[test]
    fn test_generic_from_builds_the_classified_wrapper() {
        let u = Underscore::new();
        assert_eq!(u.from(numbers(&[1])).unwrap().wrapper_type(), WrapperType::Lists);
        assert_eq!(u.from("foo").unwrap().wrapper_type(), WrapperType::Strings);
        assert_eq!(u.from(Value::Object(ValueMap::new())).unwrap().wrapper_type(), WrapperType::Structs);
    }
}

// ============================================================================
// Resolution
// ============================================================================

mod resolution_tests {
    use super::*;

    #[test]
    fn test_alias_resolves_to_canonical_method() {
        let lists = Underscore::new().of(WrapperType::Lists);
        let odd = Value::Function(Callable::new(|a| {
            Ok(Value::Bool(a[0] == Value::from(1) || a[0] == Value::from(3)))
        }));
        let by_alias = lists.call("select", args![numbers(&[1, 2, 3]), odd.clone()]).unwrap();
        let direct = lists.call("filter", args![numbers(&[1, 2, 3]), odd]).unwrap();
        assert_eq!(by_alias, numbers(&[1, 3]));
        assert_eq!(by_alias, direct);
    }

    #[test]
    fn test_library_wins_over_alias() {
        let options = Options::defaults().with_alias("filter", "reject");
        let u = Underscore::with_options(&options);
        let even = Value::Function(Callable::new(|a| Ok(Value::Bool(a[0] == Value::from(2)))));
        let kept = u.of(WrapperType::Lists).call("filter", args![numbers(&[1, 2, 3]), even]).unwrap();
        assert_eq!(kept, numbers(&[2]));
    }

    #[test]
    fn test_aliases_come_from_options() {
        let options = Options::parse("[aliases]\nsmush = \"implode\"\n").unwrap();
        let u = Underscore::with_options(&options);
        let joined = u.of(WrapperType::Lists).call("smush", args![args!["a", "b"], "+"]).unwrap();
        assert_eq!(joined, Value::from("a+b"));
        assert!(Underscore::new().of(WrapperType::Lists).call("smush", args![args!["a"]]).is_err());
    }

    #[test]
    fn test_native_deferral_by_prefix() {
        let u = Underscore::new();
        let mut foo = u.of(WrapperType::Strings).from("foo");
        foo.chain("repeat", args![3]).unwrap();
        assert_eq!(foo.obtain(), Value::from("foofoofoo"));
        assert_eq!(
            u.of(WrapperType::Strings).call("repeat", args!["foo", 2]).unwrap(),
            Value::from("foofoo")
        );
    }

    #[test]
    fn test_generic_reduce_goes_native() {
        let mul = Value::Function(Callable::new(|a| {
            let (x, y) = (a[0].to_string(), a[1].to_string());
            Ok(Value::from(x.parse::<i64>().unwrap_or(0) * y.parse::<i64>().unwrap_or(0)))
        }));
        let product = Underscore::new().call("reduce", args![numbers(&[3, 4, 5]), mul, 1]).unwrap();
        assert_eq!(product, Value::from(60));
    }

    #[test]
    fn test_unresolved_names_type_and_method() {
        let u = Underscore::new();
        match u.of(WrapperType::Lists).call("nope", args![numbers(&[1])]) {
            Err(UnderscoreError::MethodNotFound { target, method }) => {
                assert_eq!(target, "Lists");
                assert_eq!(method, "nope");
            }
            other => panic!("unexpected {:?}", other),
        }
        match u.call("nope", args![]) {
            Err(e @ UnderscoreError::MethodNotFound { .. }) => {
                assert_eq!(e.to_string(), "The method Underscore::nope does not exist");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_generic_call_targets_first_argument_type() {
        match Underscore::new().call("upper", args![args!["a"]]) {
            Err(UnderscoreError::MethodNotFound { target, method }) => {
                assert_eq!(target, "Lists");
                assert_eq!(method, "upper");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            Underscore::new().call("upper", args!["a"]).unwrap(),
            Value::from("A")
        );
    }

    #[test]
    fn test_collaborator_errors_pass_through() {
        let err = Underscore::new()
            .of(WrapperType::Lists)
            .call("fromJSON", args!["{broken"])
            .unwrap_err();
        assert!(matches!(err, UnderscoreError::Json(_)));
        assert!(!err.is_dispatch_error());
    }
}

// ============================================================================
// Chains
// ============================================================================

mod chain_tests {
    use super::*;

    #[test]
    fn test_every_breaker_leaves_subject_alone() {
        let u = Underscore::new();
        let breakers: Vec<(&str, Vec<Value>)> = vec![
            ("sum", args![]),
            ("count", args![]),
            ("get", args!["0"]),
            ("toJSON", args![]),
            ("toCSV", args![]),
        ];
        for (method, extra) in breakers {
            let mut list = u.of(WrapperType::Lists).from(numbers(&[1, 2, 3]));
            let outcome = list.call(method, extra).unwrap();
            assert!(outcome.is_broken(), "{} should break the chain", method);
            assert_eq!(list.obtain(), numbers(&[1, 2, 3]), "{} mutated the subject", method);
        }
    }

    #[test]
    fn test_breaker_results() {
        let mut list = Underscore::new().of(WrapperType::Lists).from(numbers(&[1, 2, 3]));
        assert_eq!(list.value("sum", args![]).unwrap(), Value::from(6));
        assert_eq!(list.value("toJSON", args![]).unwrap(), Value::from("[1,2,3]"));
        assert_eq!(list.value("count", args![]).unwrap(), Value::from(3));
    }

    #[test]
    fn test_unchainable_pairs() {
        let lists = Underscore::new().of(WrapperType::Lists);
        let mut list = lists.from(numbers(&[1]));
        match list.call("range", args![5]) {
            Err(UnderscoreError::NonChainable { target, method }) => {
                assert_eq!(target, "Lists");
                assert_eq!(method, "range");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(list.obtain(), numbers(&[1]));
        assert_eq!(lists.call("range", args![5]).unwrap(), numbers(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_subjectless_methods_do_not_receive_the_subject() {
        let strings = Underscore::new().of(WrapperType::Strings);
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        strings.extend("fill", move |args| {
            *recorder.lock() = args;
            Ok(Value::from("filled"))
        });

        let mut subject = strings.from("subject");
        subject.chain("fill", args![1, 2]).unwrap();
        assert_eq!(*seen.lock(), args![1, 2]);
        assert_eq!(subject.obtain(), Value::from("filled"));

        let mut list = Underscore::new().of(WrapperType::Lists).from(numbers(&[9]));
        list.chain("fill", args![0, 2, "x"]).unwrap();
        assert_eq!(list.obtain(), Value::Array(args!["x", "x"]));
    }

    #[test]
    fn test_any_number_of_arguments_reaches_the_method() {
        let lists = Underscore::new().of(WrapperType::Lists);
        lists.extend("arity", |args| Ok(Value::from(args.len())));
        let mut list = lists.from(numbers(&[1]));
        let extra = args![2, 3, 4, 5, 6, 7, 8];
        list.chain("arity", extra).unwrap();
        assert_eq!(list.obtain(), Value::from(8));
    }

    #[test]
    fn test_chain_follows_subject_type() {
        let mut chain = Underscore::new().of(WrapperType::Strings).from("FOO.BAR");
        chain
            .chain("lower", args![])
            .and_then(|c| c.chain("explode", args!["."]))
            .and_then(|c| c.chain("last", args![]))
            .and_then(|c| c.chain("title", args![]))
            .unwrap();
        assert_eq!(chain.obtain(), Value::from("Bar"));
    }

    #[test]
    fn test_non_breaker_replaces_subject() {
        let mut list = Underscore::new().of(WrapperType::Lists).from(numbers(&[3, 1, 2]));
        assert_eq!(list.call("sort", args![]).unwrap(), Outcome::Chained);
        assert_eq!(list.obtain(), numbers(&[1, 2, 3]));
    }
}

// ============================================================================
// Macros
// ============================================================================

mod macro_tests {
    use super::*;

    #[test]
    fn test_macros_are_namespaced_per_type() {
        let u = Underscore::new();
        u.of(WrapperType::Strings).extend("foobar", |_| Ok(Value::from("string")));
        u.of(WrapperType::Lists).extend("foobar", |_| Ok(Value::from("list")));

        assert_eq!(u.of(WrapperType::Strings).call("foobar", args![]).unwrap(), Value::from("string"));
        assert_eq!(u.of(WrapperType::Lists).call("foobar", args![]).unwrap(), Value::from("list"));
        assert!(u.of(WrapperType::Numbers).call("foobar", args![]).is_err());
    }

    #[test]
    fn test_macros_are_scoped_to_their_context() {
        let first = Underscore::new();
        let second = Underscore::new();
        first.of(WrapperType::Lists).extend("only_here", |_| Ok(Value::Null));
        assert!(first.of(WrapperType::Lists).call("only_here", args![]).is_ok());
        assert!(second.of(WrapperType::Lists).call("only_here", args![]).is_err());
    }

    #[test]
    fn test_generic_macro() {
        let u = Underscore::new();
        u.extend("hello", |_| Ok(Value::from("world")));
        assert_eq!(u.call("hello", args![]).unwrap(), Value::from("world"));
        assert!(u.resolver().extensions().lookup(CallTarget::Generic, "hello").is_some());
    }

    #[test]
    fn test_macro_visible_to_existing_wrappers() {
        let u = Underscore::new();
        let mut list = u.of(WrapperType::Lists).from(numbers(&[1, 2]));
        u.of(WrapperType::Lists).extend("double", |args| {
            Ok(Value::Array(
                args[0]
                    .clone()
                    .into_values()
                    .into_iter()
                    .flat_map(|v| vec![v.clone(), v])
                    .collect(),
            ))
        });
        list.chain("double", args![]).unwrap();
        assert_eq!(list.obtain(), numbers(&[1, 1, 2, 2]));
    }
}
