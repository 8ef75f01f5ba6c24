//! `Functions` methods: call limiters and partial application.
//!
//! Every limiter wraps the callable into a new one that owns its state, so two
//! limiters built from the same function never share counts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::value::{Callable, Value};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let functions = MethodCollection::new("Functions")
        .add_method("once", functions_once)
        .add_method("only", functions_only)
        .add_method("after", functions_after)
        .add_method("cache", functions_cache)
        .add_method("throttle", functions_throttle)
        .add_method("partial", functions_partial);

    registry.register_collection(functions);
}

/// Take one slot from `counter` unless `times` are already used.
fn claim(counter: &AtomicU64, times: u64) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            if n < times {
                Some(n + 1)
            } else {
                None
            }
        })
        .is_ok()
}

fn limited(function: Callable, times: u64) -> Callable {
    let calls = Arc::new(AtomicU64::new(0));
    Callable::new(move |args| {
        if !claim(&calls, times) {
            tracing::trace!(function = %function.id(), times, "call refused");
            return Ok(Value::Bool(false));
        }
        function.call(args)
    })
}

fn functions_once(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Function(limited(args.callable(0)?, 1)))
}

fn functions_only(args: Arguments) -> Result<Value, UnderscoreError> {
    let times = args.int(1).max(0) as u64;
    Ok(Value::Function(limited(args.callable(0)?, times)))
}

/// Refuse the first `times` calls, then pass every call through.
fn functions_after(args: Arguments) -> Result<Value, UnderscoreError> {
    let function = args.callable(0)?;
    let times = args.int(1).max(0) as u64;
    let refused = Arc::new(AtomicU64::new(0));
    Ok(Value::Function(Callable::new(move |call_args| {
        if claim(&refused, times) {
            return Ok(Value::Bool(false));
        }
        function.call(call_args)
    })))
}

/// Memoize results per argument list.
fn functions_cache(args: Arguments) -> Result<Value, UnderscoreError> {
    let function = args.callable(0)?;
    let cached: Arc<Mutex<HashMap<String, Value>>> = Arc::new(Mutex::new(HashMap::new()));
    Ok(Value::Function(Callable::new(move |call_args| {
        let signature = format!("{:?}", call_args);
        if let Some(hit) = cached.lock().get(&signature) {
            return Ok(hit.clone());
        }
        let result = function.call(call_args)?;
        cached.lock().insert(signature, result.clone());
        Ok(result)
    })))
}

/// Run at most once per `ms` milliseconds. Refused calls return `false`.
fn functions_throttle(args: Arguments) -> Result<Value, UnderscoreError> {
    let function = args.callable(0)?;
    let window = Duration::from_millis(args.int(1).max(0) as u64);
    let last_called: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
    Ok(Value::Function(Callable::new(move |call_args| {
        let now = Instant::now();
        {
            let mut last = last_called.lock();
            match *last {
                Some(at) if now.duration_since(at) < window => return Ok(Value::Bool(false)),
                _ => *last = Some(now),
            }
        }
        function.call(call_args)
    })))
}

/// Bind leading arguments. `Null` bound slots are holes filled, in order,
/// from the call's arguments. Leftover call arguments are appended.
fn functions_partial(args: Arguments) -> Result<Value, UnderscoreError> {
    let function = args.callable(0)?;
    let bound = args.rest(1);
    Ok(Value::Function(Callable::new(move |call_args| {
        let mut given = call_args.into_iter();
        let mut merged: Vec<Value> = bound
            .iter()
            .map(|b| match b {
                Value::Null => given.next().unwrap_or(Value::Null),
                other => other.clone(),
            })
            .collect();
        merged.extend(given);
        function.call(merged)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn counting() -> (Callable, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let f = Callable::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        });
        (f, hits)
    }

    fn wrap(f: fn(Arguments) -> Result<Value, UnderscoreError>, args: Vec<Value>) -> Callable {
        match f(Arguments::new(args)).unwrap() {
            Value::Function(c) => c,
            other => panic!("expected a function, got {:?}", other),
        }
    }

    #[test]
    fn test_only_limits_calls() {
        let (f, hits) = counting();
        let limited = wrap(functions_only, vec![Value::Function(f), Value::from(3)]);
        for _ in 0..5 {
            limited.call(vec![]).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(limited.call(vec![]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_once_under_concurrent_calls() {
        let (f, hits) = counting();
        let once = wrap(functions_once, vec![Value::Function(f)]);
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let once = once.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        once.call(vec![]).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_limiters_keep_separate_counts() {
        let (f, hits) = counting();
        let first = wrap(functions_only, vec![Value::Function(f.clone()), Value::from(1)]);
        let second = wrap(functions_only, vec![Value::Function(f), Value::from(2)]);
        for _ in 0..3 {
            first.call(vec![]).unwrap();
            second.call(vec![]).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cache_is_per_wrapper() {
        let (f, hits) = counting();
        let first = wrap(functions_cache, vec![Value::Function(f.clone())]);
        let second = wrap(functions_cache, vec![Value::Function(f)]);
        first.call(vec![Value::from(1)]).unwrap();
        first.call(vec![Value::from(1)]).unwrap();
        second.call(vec![Value::from(1)]).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_after_skips_first_calls() {
        let (f, hits) = counting();
        let delayed = wrap(functions_after, vec![Value::Function(f), Value::from(3)]);
        for _ in 0..5 {
            delayed.call(vec![]).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_throttle_refuses_within_window() {
        let (f, hits) = counting();
        let throttled = wrap(functions_throttle, vec![Value::Function(f), Value::from(60_000)]);
        throttled.call(vec![]).unwrap();
        assert_eq!(throttled.call(vec![]).unwrap(), Value::Bool(false));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_partial_fills_holes() {
        let concat = Callable::new(|args| {
            Ok(Value::String(args.iter().map(|v| v.to_string()).collect()))
        });
        let partial = wrap(
            functions_partial,
            vec![Value::Function(concat), Value::from(2), Value::Null, Value::from(6)],
        );
        assert_eq!(partial.call(vec![Value::from(4)]).unwrap(), Value::from("246"));
        assert_eq!(
            partial.call(vec![Value::from(4), Value::from(8)]).unwrap(),
            Value::from("2468")
        );
    }
}
