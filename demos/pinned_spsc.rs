//! SPSC demo with each thread pinned to a distinct CPU core, matching
//! `flux`/`kaos`'s benchmarking binaries' use of `nix::sched` for
//! cross-core latency measurements.

use std::thread;

use nix::sched::{sched_setaffinity, CpuSet};
use nix::unistd::Pid;

use ringcell::Ring;

const ITEMS: u64 = 2_000_000;

fn pin_to(core: usize) {
    let mut set = CpuSet::new();
    if set.set(core).is_err() {
        return;
    }
    let _ = sched_setaffinity(Pid::from_raw(0), &set);
}

fn main() {
    let ring: Ring<u64> = Ring::new(1 << 14).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            pin_to(0);
            let mut producer = ring.producer_cursor();
            for i in 0..ITEMS {
                producer.push(i);
            }
        });
        scope.spawn(|| {
            pin_to(1);
            let mut consumer = ring.consumer_cursor();
            for i in 0..ITEMS {
                assert_eq!(consumer.pop(), i);
            }
        });
    });

    println!("pinned spsc: {ITEMS} items transferred");
}
