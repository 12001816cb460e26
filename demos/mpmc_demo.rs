//! Multiple producers and consumers sharing one ring, using the polling
//! API so each side can be driven from an external event loop instead of
//! spinning inside the library.

use std::thread;

use ringcell::Ring;

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 4;
const PER_PRODUCER: u64 = 250_000;

fn main() {
    let ring: Ring<u64> = Ring::new(1024).unwrap();

    thread::scope(|scope| {
        for p in 0..PRODUCERS {
            let mut producer = ring.producer_cursor();
            scope.spawn(move || {
                let base = p as u64 * PER_PRODUCER;
                for i in 0..PER_PRODUCER {
                    let idx = producer.poll_claim();
                    while !producer.poll_ready() {
                        std::hint::spin_loop();
                    }
                    producer.poll_write(idx, base + i);
                    while !producer.poll_commit() {
                        std::hint::spin_loop();
                    }
                }
            });
        }
        for _ in 0..CONSUMERS {
            let mut consumer = ring.consumer_cursor();
            scope.spawn(move || {
                let mut received = 0u64;
                for _ in 0..(PRODUCERS as u64 * PER_PRODUCER / CONSUMERS as u64) {
                    let idx = consumer.poll_claim();
                    while !consumer.poll_ready() {
                        std::hint::spin_loop();
                    }
                    let _ = consumer.poll_read(idx);
                    while !consumer.poll_commit() {
                        std::hint::spin_loop();
                    }
                    received += 1;
                }
                println!("consumer received {received} items");
            });
        }
    });
}
