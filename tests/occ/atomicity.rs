//! Readers never observe a committed value without its TTL.

use crate::common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use watchtx::{from_fn, RetryPolicy, TransactionExecutor, Ttl, Value};

#[test]
fn observer_never_sees_value_without_ttl() {
    let store = seeded_store("counter", 0i64, Duration::from_secs(600));
    let executor = Arc::new(
        TransactionExecutor::new(
            Arc::clone(&store),
            RetryPolicy::new().with_max_attempts(1_000),
        )
        .unwrap(),
    );
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observations = 0usize;
            while !done.load(Ordering::SeqCst) {
                let entry = store.get_versioned(&key("counter")).expect("key stays live");
                assert!(
                    matches!(entry.ttl, Ttl::Remaining(_)),
                    "value {} visible with ttl {}",
                    entry.value,
                    entry.ttl
                );
                observations += 1;
            }
            observations
        })
    };

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                let incr = from_fn(|v| Value::Int(v.and_then(Value::as_int).unwrap_or(0) + 1));
                for _ in 0..100 {
                    assert!(executor.run(&key("counter"), &incr).is_committed());
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    assert!(observer.join().unwrap() > 0);

    assert_eq!(store.get(&key("counter")), Some(Value::Int(400)));
    assert!(store.ttl(&key("counter")).remaining().unwrap() > Duration::from_secs(590));
    let metrics = executor.metrics();
    assert_eq!(metrics.runs_committed, 400);
    assert_eq!(metrics.attempts, 400 + metrics.conflicts);
}
