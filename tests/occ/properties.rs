//! Property tests: TTL preservation, the attempt bound, fatal errors
//! stopping the loop, and transform call counts.

use crate::common::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use watchtx::{from_fn, Error, Outcome, RetryPolicy, TransactionExecutor, Value};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn committed_ttl_matches_committing_attempt(
        ttl_secs in 1u64..100_000,
        intruder_secs in 1u64..100_000,
        conflicts in 0usize..4,
    ) {
        let base = seeded_store("key", "old value", Duration::from_secs(ttl_secs));
        let store = Arc::new(
            InterferingStore::new(Arc::clone(&base))
                .interfere_on(1..=conflicts)
                .intruder_ttl(Duration::from_secs(intruder_secs)),
        );
        let executor = TransactionExecutor::with_default_policy(Arc::clone(&store));

        let info = executor
            .run(&key("key"), &from_fn(|_| Value::from("new value")))
            .into_result()
            .unwrap();

        prop_assert_eq!(info.attempts, conflicts + 1);
        let reads = store.ttl_reads();
        prop_assert_eq!(reads.len(), conflicts + 1);
        prop_assert_eq!(info.ttl, reads[conflicts]);
        assert_ttl_close(base.ttl(&key("key")), info.ttl);
    }

    #[test]
    fn attempts_never_exceed_policy(
        max_attempts in 1usize..8,
        conflicts in 0usize..10,
    ) {
        let base = seeded_store("key", 0i64, Duration::from_secs(60));
        let store = Arc::new(InterferingStore::new(base).interfere_on(1..=conflicts));
        let calls = AtomicUsize::new(0);
        let executor = TransactionExecutor::new(
            Arc::clone(&store),
            RetryPolicy::new().with_max_attempts(max_attempts),
        )
        .unwrap();

        let outcome = executor.run(
            &key("key"),
            &from_fn(|v| {
                calls.fetch_add(1, Ordering::SeqCst);
                Value::Int(v.and_then(Value::as_int).unwrap_or(0) + 1)
            }),
        );

        prop_assert!(store.attempts() <= max_attempts);
        // Every attempt reaches the read exactly once
        prop_assert_eq!(calls.load(Ordering::SeqCst), store.attempts());
        if conflicts >= max_attempts {
            let exhausted = matches!(
                outcome,
                Outcome::ConflictExhausted { attempts, .. } if attempts == max_attempts
            );
            prop_assert!(exhausted);
            prop_assert_eq!(store.attempts(), max_attempts);
        } else {
            prop_assert_eq!(outcome.commit_info().map(|i| i.attempts), Some(conflicts + 1));
        }
    }

    #[test]
    fn backend_error_stops_the_loop(
        fail_on in 1usize..5,
        max_attempts in 5usize..10,
    ) {
        let base = seeded_store("key", "old value", Duration::from_secs(60));
        let store = Arc::new(
            InterferingStore::new(Arc::clone(&base))
                .interfere_always()
                .fail_ttl_on(fail_on),
        );
        let executor = TransactionExecutor::new(
            Arc::clone(&store),
            RetryPolicy::new().with_max_attempts(max_attempts),
        )
        .unwrap();

        let outcome = executor.run(&key("key"), &from_fn(|_| Value::from("new value")));

        prop_assert!(matches!(outcome, Outcome::Fatal(Error::Backend(_))));
        prop_assert_eq!(store.attempts(), fail_on);
        prop_assert_eq!(executor.metrics().attempts, fail_on as u64);
    }
}
