//! Tests for the lock-guarded engine handle

use super::*;
use std::thread;

#[test]
fn test_shared_process() {
    let shared = SharedDrain::default();

    let first = shared.process("user 5 login ok");
    let second = shared.process("user 7 login ok");

    assert!(first.is_new);
    assert!(!second.is_new);
    assert_eq!(first.cluster_id, second.cluster_id);
    assert_eq!(shared.cluster_count(), 1);
    assert_eq!(
        shared.cluster(first.cluster_id).unwrap().template_string(),
        "user <*> login ok"
    );
}

#[test]
fn test_concurrent_parsing() {
    let shared = SharedDrain::default();
    let mut handles = vec![];

    for i in 0..10 {
        let shared = shared.clone();
        handles.push(thread::spawn(move || {
            for j in 0..100 {
                shared.process(&format!("Request {} from user {}", i, j));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Every line went through exactly one locked process call
    assert_eq!(shared.stats().lines_processed, 1000);
    let total: u64 = shared.clusters().iter().map(|c| c.match_count()).sum();
    assert_eq!(total, 1000);
}

#[test]
fn test_with_exclusive_access() {
    let shared = SharedDrain::default();
    shared.process("delete file");

    let count = shared.with(|drain| {
        drain.process("delete file");
        drain.cluster_count()
    });
    assert_eq!(count, 1);
}

#[test]
fn test_try_into_inner() {
    let shared = SharedDrain::default();
    shared.process("a b c");

    let other = shared.clone();
    let shared = shared.try_into_inner().unwrap_err();
    drop(other);

    let drain = shared.try_into_inner().unwrap();
    assert_eq!(drain.cluster_count(), 1);
}
