#![allow(missing_docs, unused_results)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use interpose::{
    Interceptor, InterceptorContext, InvocationError, ObjectKey, PrivateKey, Result, interceptor_fn,
    target_fn,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{Value, json};

/// Interceptor that proceeds exactly once and counts its invocations.
struct Counting {
    calls: AtomicUsize,
}

impl Counting {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Interceptor for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        context.proceed()
    }
}

fn counting_target(counter: &Arc<AtomicUsize>) -> Arc<dyn Interceptor> {
    let counter = Arc::clone(counter);
    target_fn("target", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(json!("result"))
    })
}

#[test]
fn terminal_handler_runs_once_for_any_chain_length() {
    for len in 0..6 {
        let hits = Arc::new(AtomicUsize::new(0));
        let counters: Vec<Arc<Counting>> = (0..len).map(|_| Counting::new()).collect();
        let mut chain: Vec<Arc<dyn Interceptor>> = counters
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn Interceptor>)
            .collect();
        chain.push(counting_target(&hits));

        let mut ctx = InterceptorContext::new();
        ctx.set_interceptors(chain);
        assert_eq!(ctx.proceed().unwrap(), json!("result"));
        assert_eq!(hits.load(Ordering::SeqCst), 1, "chain length {len}");
        assert!(counters.iter().all(|c| c.calls() == 1));
    }
}

#[test]
fn entries_after_a_short_circuit_never_run() {
    let hits = Arc::new(AtomicUsize::new(0));
    let after = Counting::new();
    let mut ctx = InterceptorContext::new();
    ctx.set_interceptors(vec![
        Counting::new() as Arc<dyn Interceptor>,
        interceptor_fn("stop", |_| Ok(json!("short"))),
        Arc::clone(&after) as Arc<dyn Interceptor>,
        counting_target(&hits),
    ]);
    assert_eq!(ctx.proceed().unwrap(), json!("short"));
    assert_eq!(after.calls(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_chain_fails_with_end_of_chain() {
    let mut ctx = InterceptorContext::new();
    ctx.set_interceptors(Vec::<Arc<dyn Interceptor>>::new());
    let err = ctx.proceed().unwrap_err();
    assert!(err.is_end_of_chain());
}

#[test]
fn clone_is_independent_of_original() {
    let hits = Arc::new(AtomicUsize::new(0));
    let paused = Arc::new(Mutex::new(None::<InterceptorContext>));
    let slot = Arc::clone(&paused);

    let mut ctx = InterceptorContext::new();
    ctx.set_interceptors(vec![
        Counting::new() as Arc<dyn Interceptor>,
        interceptor_fn("pause", move |ctx| {
            *slot.lock() = Some(ctx.clone());
            ctx.proceed()
        }),
        Counting::new() as Arc<dyn Interceptor>,
        counting_target(&hits),
    ]);

    // Advance the original by hand to position 2, as if inside "pause".
    let mut original = ctx.clone();
    original.set_interceptor_chain(Some(ctx.interceptors().clone()), 2).unwrap();
    let mut continuation = original.clone();
    assert_eq!(continuation.interceptors().len(), 2);

    assert_eq!(continuation.proceed().unwrap(), json!("result"));
    assert_eq!(original.next_interceptor_index(), 2);

    // The original still resumes from position 2.
    assert_eq!(original.proceed().unwrap(), json!("result"));
    assert_eq!(original.next_interceptor_index(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // The clone taken inside "pause" skips everything already executed.
    assert_eq!(ctx.proceed().unwrap(), json!("result"));
    let mut resumed = paused.lock().take().unwrap();
    assert_eq!(resumed.interceptors().names(), vec!["counting", "target"]);
    assert_eq!(resumed.proceed().unwrap(), json!("result"));
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(ctx.next_interceptor_index(), 0);
}

#[test]
fn typed_private_data_round_trip() {
    #[derive(Debug, PartialEq)]
    struct TxId(u64);

    let mut ctx = InterceptorContext::new();
    ctx.put_private_data_typed(Some(TxId(7)));
    assert_eq!(ctx.private_data_typed::<TxId>().as_deref(), Some(&TxId(7)));

    let previous = ctx.put_private_data_typed::<TxId>(None);
    assert_eq!(previous.as_deref(), Some(&TxId(7)));
    assert!(ctx.private_data_typed::<TxId>().is_none());
}

#[test]
fn value_equal_object_keys_stay_independent() {
    let mut ctx = InterceptorContext::new();
    let a: PrivateKey = ObjectKey::new(String::from("same")).into();
    let b: PrivateKey = ObjectKey::new(String::from("same")).into();

    ctx.put_private_data(a.clone(), Some(Arc::new("first"))).unwrap();
    ctx.put_private_data(b.clone(), Some(Arc::new("second"))).unwrap();

    let first = ctx.private_data(&a).unwrap().downcast::<&str>().unwrap();
    let second = ctx.private_data(&b).unwrap().downcast::<&str>().unwrap();
    assert_eq!(*first, "first");
    assert_eq!(*second, "second");
}

#[test]
fn context_data_readable_only_after_set() {
    let mut ctx = InterceptorContext::new();
    assert_matches!(ctx.context_data(), Err(InvocationError::NotInitialized(_)));
    ctx.set_context_data(HashMap::new());
    assert!(ctx.context_data().unwrap().is_empty());
}

#[test]
fn log_auth_target_scenario() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let target_runs = Arc::new(AtomicUsize::new(0));

    let log_entry = {
        let log = Arc::clone(&log);
        interceptor_fn("log", move |ctx| {
            log.lock().push("log:before".to_string());
            let result = ctx.proceed();
            let seen = result.as_ref().map(ToString::to_string).unwrap_or_default();
            log.lock().push(format!("log:after {seen}"));
            result
        })
    };
    let auth = interceptor_fn("auth", |ctx| {
        if ctx.parameters().get(0) == Some(json!("deny")) {
            return Ok(json!("access denied"));
        }
        ctx.proceed()
    });
    let target = {
        let runs = Arc::clone(&target_runs);
        target_fn("target", move |ctx| {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(json!(format!("hello {}", ctx.parameters().get(0).unwrap_or(Value::Null))))
        })
    };

    let mut ctx = InterceptorContext::new();
    ctx.set_interceptors(vec![log_entry, auth, target]);

    ctx.set_parameter_values(vec![json!("deny")]);
    assert_eq!(ctx.proceed().unwrap(), json!("access denied"));
    assert_eq!(target_runs.load(Ordering::SeqCst), 0);
    assert_eq!(
        *log.lock(),
        vec!["log:before", r#"log:after "access denied""#]
    );

    log.lock().clear();
    ctx.set_parameter_values(vec![json!("alice")]);
    assert_eq!(ctx.proceed().unwrap(), json!(r#"hello "alice""#));
    assert_eq!(target_runs.load(Ordering::SeqCst), 1);
    assert_eq!(log.lock().len(), 2);
}

fn failing_chain(depth: usize, fail: bool) -> Vec<Arc<dyn Interceptor>> {
    let mut chain: Vec<Arc<dyn Interceptor>> = (0..depth)
        .map(|_| Counting::new() as Arc<dyn Interceptor>)
        .collect();
    chain.push(target_fn("target", move |_| {
        if fail {
            Err(InvocationError::rejected("nope"))
        } else {
            Ok(json!(true))
        }
    }));
    chain
}

proptest! {
    #[test]
    fn proceed_restores_cursor_position(depth in 0usize..6, start in 0usize..7, fail in any::<bool>()) {
        let chain = failing_chain(depth, fail);
        let len = chain.len();
        let start = start.min(len);
        let mut ctx = InterceptorContext::new();
        ctx.set_interceptor_chain(Some(chain.into()), start).unwrap();

        let before = ctx.next_interceptor_index();
        let result = ctx.proceed();
        prop_assert_eq!(ctx.next_interceptor_index(), before);

        if start == len {
            let exhausted = matches!(result, Err(InvocationError::EndOfChain));
            prop_assert!(exhausted);
        } else if fail {
            let rejected = matches!(result, Err(InvocationError::Rejected { .. }));
            prop_assert!(rejected);
        } else {
            prop_assert_eq!(result.unwrap(), json!(true));
        }
    }
}
