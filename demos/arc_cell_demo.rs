//! Config-hot-swap pattern: a background thread publishes new snapshots of
//! a config struct while readers keep dereferencing whatever snapshot they
//! last loaded.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ringcell::AtomicArc;

#[derive(Debug)]
struct Config {
    version: u64,
    max_connections: u32,
}

fn main() {
    let config = Arc::new(AtomicArc::new(Config {
        version: 0,
        max_connections: 100,
    }));

    thread::scope(|scope| {
        let writer_config = Arc::clone(&config);
        scope.spawn(move || {
            for v in 1..=20u64 {
                thread::sleep(Duration::from_millis(5));
                writer_config.store(Config {
                    version: v,
                    max_connections: 100 + v as u32,
                });
            }
        });

        for reader_id in 0..3 {
            let reader_config = Arc::clone(&config);
            scope.spawn(move || {
                for _ in 0..10 {
                    let snapshot = reader_config.load().unwrap();
                    println!(
                        "reader {reader_id} sees version {} max_connections {}",
                        snapshot.version, snapshot.max_connections
                    );
                    thread::sleep(Duration::from_millis(8));
                }
            });
        }
    });
}
