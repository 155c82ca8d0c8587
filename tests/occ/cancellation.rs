//! Cancellation reaching a backend call that is already in flight.

use crate::common::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use watchtx::{CancelSignal, Error, Outcome, Ttl, Value, WatchTx};

const SLOW_REPLY: Duration = Duration::from_millis(500);

fn slow_client() -> (Arc<InterferingStore>, WatchTx<InterferingStore>) {
    let store = seeded_store("key", "old value", Duration::from_secs(60));
    let slow = Arc::new(InterferingStore::new(store).slow_ttl(SLOW_REPLY));
    let tx = WatchTx::builder().store(Arc::clone(&slow)).build().unwrap();
    (slow, tx)
}

#[test]
fn deadline_cuts_short_a_slow_ttl_reply() {
    let (slow, tx) = slow_client();
    let cancel = CancelSignal::with_timeout(Duration::from_millis(10));

    let started = Instant::now();
    let outcome = tx.replace_keep_ttl_with_cancel("key", "new value", &cancel);
    let elapsed = started.elapsed();

    assert!(matches!(outcome, Outcome::Fatal(Error::Cancelled(_))));
    assert!(elapsed < Duration::from_millis(250), "took {:?}", elapsed);
    assert_eq!(slow.attempts(), 1);
    assert!(slow.ttl_reads().is_empty());
    assert_eq!(
        slow.inner().get(&key("key")),
        Some(Value::from("old value"))
    );
    assert_ttl_close(slow.inner().ttl(&key("key")), Ttl::from_secs(60));
}

#[test]
fn cancel_from_another_thread_cuts_short_a_slow_ttl_reply() {
    let (slow, tx) = slow_client();
    let cancel = CancelSignal::new();

    let canceller = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            cancel.cancel();
        })
    };

    let started = Instant::now();
    let outcome = tx.replace_keep_ttl_with_cancel("key", "new value", &cancel);
    let elapsed = started.elapsed();
    canceller.join().unwrap();

    assert!(matches!(outcome, Outcome::Fatal(Error::Cancelled(_))));
    assert!(elapsed < Duration::from_millis(250), "took {:?}", elapsed);
    assert_eq!(
        slow.inner().get(&key("key")),
        Some(Value::from("old value"))
    );
}

#[test]
fn slow_reply_within_deadline_still_commits() {
    let store = seeded_store("key", "old value", Duration::from_secs(60));
    let slow = Arc::new(InterferingStore::new(store).slow_ttl(Duration::from_millis(5)));
    let tx = WatchTx::builder().store(Arc::clone(&slow)).build().unwrap();
    let cancel = CancelSignal::with_timeout(Duration::from_secs(5));

    let outcome = tx.replace_keep_ttl_with_cancel("key", "new value", &cancel);

    assert!(outcome.is_committed());
    assert_eq!(
        slow.inner().get(&key("key")),
        Some(Value::from("new value"))
    );
    assert_ttl_close(slow.inner().ttl(&key("key")), Ttl::from_secs(60));
}
