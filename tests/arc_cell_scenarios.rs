//! Cross-thread scenario tests for the ARC cell.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use ringcell::AtomicArc;

#[test]
fn test_concurrent_stores_each_become_visible() {
    let cell = Arc::new(AtomicArc::new(0u64));
    let mut handles = Vec::new();
    for i in 1..=8u64 {
        let cell = Arc::clone(&cell);
        handles.push(thread::spawn(move || {
            cell.store(i);
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    let guard = cell.load().unwrap();
    assert!((1..=8).contains(&*guard));
}

#[test]
fn test_readers_never_observe_a_freed_value() {
    struct Droppy(Arc<AtomicUsize>);
    impl Drop for Droppy {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let cell = Arc::new(AtomicArc::new(Droppy(Arc::clone(&drops))));

    thread::scope(|scope| {
        for _ in 0..4 {
            let cell = Arc::clone(&cell);
            let drops = Arc::clone(&drops);
            scope.spawn(move || {
                for _ in 0..5000 {
                    let guard = cell.load().unwrap();
                    // Touch the value; if it had been freed this would be a
                    // use-after-free under a sanitizer.
                    let _ = guard.0.load(Ordering::SeqCst);
                    let _ = &drops;
                }
            });
        }
        for i in 0..4usize {
            let cell = Arc::clone(&cell);
            let drops = Arc::clone(&drops);
            scope.spawn(move || {
                cell.store(Droppy(Arc::clone(&drops)));
                let _ = i;
            });
        }
    });

    drop(cell);
    assert!(drops.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_is_equal_distinguishes_successive_stores() {
    use ringcell::ArcCell;

    unsafe fn noop(_ctx: *mut ()) {}

    let mut a = 1i32;
    let mut b = 2i32;
    let block_a = ringcell::ControlBlock::new(std::ptr::null_mut(), noop);
    let block_b = ringcell::ControlBlock::new(std::ptr::null_mut(), noop);

    let cell: ArcCell<i32> = ArcCell::arc_new(&block_a, &mut a as *mut i32);
    let first = cell.atomic_load().unwrap();
    unsafe { cell.atomic_store(&block_b, &mut b as *mut i32) };
    let second = cell.atomic_load().unwrap();

    assert!(!ArcCell::is_equal(&first, &second));
    unsafe {
        ArcCell::<i32>::release(first);
        ArcCell::<i32>::release(second);
    }
}
