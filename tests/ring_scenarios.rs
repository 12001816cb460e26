//! Cross-thread scenario tests for the ring coordinator, in the spirit of
//! `kaos`'s `test_mpmc_multi_producer_multi_consumer`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use ringcell::Ring;

#[test]
fn test_spsc_preserves_order_across_threads() {
    let ring: Ring<u64> = Ring::new(1024).unwrap();
    let barrier = Barrier::new(2);

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut producer = ring.producer_cursor();
            barrier.wait();
            for i in 0..100_000u64 {
                producer.push(i);
            }
        });
        scope.spawn(|| {
            let mut consumer = ring.consumer_cursor();
            barrier.wait();
            for i in 0..100_000u64 {
                assert_eq!(consumer.pop(), i);
            }
        });
    });
}

#[test]
fn test_mpmc_multi_producer_multi_consumer_sees_every_item_once() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: u64 = 20_000;
    const CAPACITY: usize = 256;

    let ring: Ring<u64> = Ring::new(CAPACITY).unwrap();
    let seen: Vec<AtomicUsize> = (0..(PRODUCERS as u64 * PER_PRODUCER))
        .map(|_| AtomicUsize::new(0))
        .collect();

    thread::scope(|scope| {
        for p in 0..PRODUCERS {
            let mut producer = ring.producer_cursor();
            scope.spawn(move || {
                let base = p as u64 * PER_PRODUCER;
                for i in 0..PER_PRODUCER {
                    producer.push(base + i);
                }
            });
        }
        for _ in 0..CONSUMERS {
            let mut consumer = ring.consumer_cursor();
            let seen = &seen;
            scope.spawn(move || {
                for _ in 0..(PRODUCERS as u64 * PER_PRODUCER / CONSUMERS as u64) {
                    let value = consumer.pop();
                    seen[value as usize].fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    for (i, count) in seen.iter().enumerate() {
        assert_eq!(
            count.load(Ordering::SeqCst),
            1,
            "item {i} was seen {} times",
            count.load(Ordering::SeqCst)
        );
    }
}

#[test]
fn test_polling_producer_must_publish_in_claim_order() {
    let ring: Ring<u32> = Ring::new(8).unwrap();
    let mut a = ring.producer_cursor();
    let mut b = ring.producer_cursor();

    let a_idx = a.poll_claim();
    let b_idx = b.poll_claim();

    assert!(a.poll_ready());
    assert!(b.poll_ready());
    a.poll_write(a_idx, 1);
    b.poll_write(b_idx, 2);

    assert!(!b.poll_commit());
    assert!(a.poll_commit());
    assert!(b.poll_commit());

    let mut consumer = ring.consumer_cursor();
    assert_eq!(consumer.pop(), 1);
    assert_eq!(consumer.pop(), 2);
}

#[test]
fn test_ring_rejects_non_power_of_two_capacity() {
    let result: ringcell::Result<Ring<u8>> = Ring::new(100);
    assert!(result.is_err());
}
