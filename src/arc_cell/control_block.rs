//! A caller-owned reference count and destructor, kept separate from the
//! data pointer it governs. The ARC cell never allocates or frees data
//! itself — it only decides, via the refcount here, when the caller's
//! `destroy_fn` should run.

use std::sync::atomic::{AtomicI32, Ordering};

/// A caller-supplied teardown hook, invoked with `destroy_context` when the
/// last reference to the governed value is dropped.
pub type DestroyFn = unsafe fn(destroy_context: *mut ());

/// The refcount and destructor for one value managed by an [`ArcCell`](super::cell::ArcCell).
/// One `ControlBlock` is paired with exactly one data pointer for its
/// lifetime; the pairing is what `atomic_store` swaps atomically.
pub struct ControlBlock {
    refcount: AtomicI32,
    destroy_context: *mut (),
    destroy_fn: DestroyFn,
}

impl ControlBlock {
    /// Starts the block at a refcount of 1, representing the reference the
    /// caller is about to install into the cell.
    pub fn new(destroy_context: *mut (), destroy_fn: DestroyFn) -> Self {
        Self {
            refcount: AtomicI32::new(1),
            destroy_context,
            destroy_fn,
        }
    }

    /// Increments the refcount. Called whenever a new handle is handed out
    /// for the value this block governs.
    pub(crate) fn incref(&self) -> i32 {
        crate::host::increment(&self.refcount)
    }

    /// Decrements the refcount and returns the new value. A return of `0`
    /// means the caller must run `destroy`.
    pub(crate) fn decref(&self) -> i32 {
        crate::host::decrement(&self.refcount)
    }

    /// The current refcount, for diagnostics only — it can change the
    /// instant this call returns. Not part of the spec's §4 ops; supplied
    /// as a debug accessor.
    pub fn strong_count(&self) -> i32 {
        self.refcount.load(Ordering::Acquire)
    }

    /// Runs the destructor. Caller must guarantee this runs exactly once,
    /// only after `decref` observed a refcount of zero.
    pub(crate) unsafe fn destroy(&self) {
        crate::insights::record_destroy(self.strong_count());
        (self.destroy_fn)(self.destroy_context)
    }
}

// SAFETY: `destroy_context` is only ever dereferenced inside `destroy_fn`,
// which the caller supplies and which runs on whichever thread happens to
// drop the last reference; the caller is responsible for that context
// being safe to send across threads.
unsafe impl Send for ControlBlock {}
unsafe impl Sync for ControlBlock {}
