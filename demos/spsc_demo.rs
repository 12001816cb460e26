//! Single-producer/single-consumer throughput smoke test over `Ring<u64>`.

use std::thread;
use std::time::Instant;

use ringcell::Ring;

const ITEMS: u64 = 5_000_000;

fn main() {
    let ring: Ring<u64> = Ring::new(1 << 16).unwrap();
    let start = Instant::now();

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut producer = ring.producer_cursor();
            for i in 0..ITEMS {
                producer.push(i);
            }
        });
        scope.spawn(|| {
            let mut consumer = ring.consumer_cursor();
            let mut sum = 0u64;
            for _ in 0..ITEMS {
                sum = sum.wrapping_add(consumer.pop());
            }
            println!("checksum: {sum}");
        });
    });

    let elapsed = start.elapsed();
    println!(
        "{ITEMS} items in {elapsed:?} ({:.1} Mops/s)",
        ITEMS as f64 / elapsed.as_secs_f64() / 1e6
    );
}
