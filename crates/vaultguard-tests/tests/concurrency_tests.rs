//! Concurrent access through the shared registry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use vaultguard_core::{AuthError, Money, RegistryError, Secret, SharedRegistry, TxError};
use vaultguard_tests::account_with_pin;

#[test]
fn test_concurrent_failures_lock_exactly_once() {
    let registry = SharedRegistry::new();
    registry.open(account_with_pin("ACC", 100, "1234")).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.validate("ACC", &Secret::from("0000"))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let invalid = results
        .iter()
        .filter(|r| **r == Err(RegistryError::from(AuthError::InvalidCredential)))
        .count();
    let locked = results
        .iter()
        .filter(|r| **r == Err(RegistryError::from(AuthError::Locked)))
        .count();

    // Exactly the threshold's worth of attempts were counted
    assert_eq!(invalid, 3);
    assert_eq!(locked, threads - 3);
    assert!(registry.is_locked("ACC").unwrap());
    assert_eq!(
        registry.with_account("ACC", |a| a.failed_attempts()).unwrap(),
        3
    );
}

#[test]
fn test_concurrent_withdrawals_never_overdraw() {
    let registry = SharedRegistry::new();
    registry.open(account_with_pin("ACC", 10, "1234")).unwrap();

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry.withdraw("ACC", Money::from_major(1), &Secret::from("1234"))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|r| **r == Err(RegistryError::Tx(TxError::InsufficientFunds)))
        .count();

    assert_eq!(succeeded, 10);
    assert_eq!(insufficient, 15);
    assert_eq!(registry.balance("ACC").unwrap(), Money::ZERO);
}

#[test]
fn test_opposing_transfers_conserve_total() {
    let registry = SharedRegistry::new();
    registry.open(account_with_pin("A", 1000, "1111")).unwrap();
    registry.open(account_with_pin("B", 1000, "2222")).unwrap();

    let total = Money::from_major(2000).minor();
    let done = Arc::new(AtomicBool::new(false));

    // Takes both accounts in identifier order, like transfer does
    let reader = {
        let registry = registry.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut samples = 0usize;
            loop {
                let finished = done.load(Ordering::Acquire);
                let sum = registry
                    .with_account("A", |a| {
                        let a = a.balance().unwrap().minor();
                        registry
                            .with_account("B", |b| a + b.balance().unwrap().minor())
                            .unwrap()
                    })
                    .unwrap();
                assert_eq!(sum, total, "torn transfer observed");
                samples += 1;
                if finished {
                    return samples;
                }
            }
        })
    };

    let mut handles = Vec::new();
    for i in 0..20 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            if i % 2 == 0 {
                registry.transfer("A", "B", Money::from_major(7), &Secret::from("1111"))
            } else {
                registry.transfer("B", "A", Money::from_major(5), &Secret::from("2222"))
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    done.store(true, Ordering::Release);
    assert!(reader.join().unwrap() > 0);

    let a = registry.balance("A").unwrap();
    let b = registry.balance("B").unwrap();
    assert_eq!(a.minor() + b.minor(), total);
    assert_eq!(a, Money::from_major(1000 - 70 + 50));
}
