//! Zero-cost-when-disabled observability hooks. Mirrors `kaos::insights`:
//! every call compiles to nothing unless the `tracing` feature is on, so
//! the hot claim/commit paths never pay for instrumentation they don't use.

#[cfg(feature = "tracing")]
#[inline]
pub fn record_claim(op: &'static str, pos: i32) {
    tracing::trace!(op, pos, "ring claim");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_claim(_op: &'static str, _pos: i32) {}

#[cfg(feature = "tracing")]
#[inline]
pub fn record_commit(op: &'static str, pos: i32) {
    tracing::trace!(op, pos, "ring commit");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_commit(_op: &'static str, _pos: i32) {}

#[cfg(feature = "tracing")]
#[inline]
pub fn record_destroy(strong_count_was: i32) {
    tracing::trace!(strong_count_was, "arc cell destroy");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_destroy(_strong_count_was: i32) {}

/// Iteration count past which a spin loop is considered suspiciously long.
/// Diagnostic only — never used to abort a wait.
#[cfg(feature = "tracing")]
const LONG_SPIN_THRESHOLD: u32 = 10_000;

/// Called once per spin iteration; emits a single `trace!` the first time a
/// given wait crosses `LONG_SPIN_THRESHOLD` iterations. `iterations` is the
/// caller's own running count, reset when the wait resolves.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_long_spin(op: &'static str, iterations: u32) {
    if iterations == LONG_SPIN_THRESHOLD {
        tracing::trace!(op, iterations, "long spin");
    }
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_long_spin(_op: &'static str, _iterations: u32) {}
