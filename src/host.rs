//! The hardware atomic contract the core is built on.
//!
//! Five primitives, matching the spec's "Required host primitives": atomic
//! increment/decrement of a 32-bit signed value, a 32-bit CAS, a 128-bit CAS
//! over a naturally aligned pair of 64-bit fields, and a full memory fence.
//! A `no_std` port only needs to replace this module.
//!
//! The 32-bit primitives are swapped for `loom`'s instrumented equivalents
//! under `cfg(loom)` so that `tests/loom_ring.rs` exercises the real
//! `RingState`/`StreamCursor` claim/commit path under loom's model checker
//! instead of a hand-rolled stand-in. The 128-bit CAS has no loom
//! equivalent and stays on `portable_atomic` either way.

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{fence, AtomicI32, Ordering};

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{fence, AtomicI32, Ordering};

use portable_atomic::AtomicU128;

/// Atomically increments `counter` and returns the new value.
#[inline]
pub fn increment(counter: &AtomicI32) -> i32 {
    counter.fetch_add(1, Ordering::AcqRel) + 1
}

/// Atomically decrements `counter` and returns the new value.
#[inline]
pub fn decrement(counter: &AtomicI32) -> i32 {
    counter.fetch_sub(1, Ordering::AcqRel) - 1
}

/// 32-bit compare-and-swap. Returns `Ok(current)` on success, `Err(current)` on failure.
#[inline]
pub fn cas32(cell: &AtomicI32, current: i32, new: i32) -> Result<i32, i32> {
    cell.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
}

/// 128-bit compare-and-swap over a naturally aligned pair of 64-bit fields.
#[inline]
pub fn cas128(cell: &AtomicU128, current: u128, new: u128) -> Result<u128, u128> {
    cell.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
}

/// A full memory fence: re-read every stale cached value on the next load.
#[inline]
pub fn full_fence() {
    fence(Ordering::SeqCst);
}

/// Hint to the CPU that this thread is in a busy-wait spin loop.
#[inline]
pub fn spin_hint() {
    #[cfg(not(loom))]
    std::hint::spin_loop();
    #[cfg(loom)]
    loom::hint::spin_loop();
}
