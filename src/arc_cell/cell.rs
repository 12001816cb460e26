//! The lock-free ARC cell: a single 128-bit word holding a
//! `(control_block_ptr, data_ptr)` pair, swapped with a single double-word
//! CAS. A transient `BUSY = (1, 0)` sentinel value stands in for the pair
//! while a loader is in the middle of incrementing the refcount it's about
//! to hand out, so a concurrent store can never free a value out from under
//! a load that's still in flight.
//!
//! Grounded on the debt-avoidance discussion in the `arc-swap` reference
//! material (`kata-containers` vendor copy) for the "make concurrent
//! readers safe without a lock" problem, re-expressed here as the spec's
//! explicit lock-then-restore-or-replace protocol rather than a debt list.

use std::marker::PhantomData;
use std::sync::atomic::Ordering;

use bytemuck::{Pod, Zeroable};
use portable_atomic::AtomicU128;

use crate::host;

/// A raw `(control_block_ptr, data_ptr)` pair, the unit the cell's CAS
/// operates on. Null (`0, 0`) means the cell holds nothing.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
struct Pair {
    control_block: u64,
    data: u64,
}

impl Pair {
    const NULL: Pair = Pair {
        control_block: 0,
        data: 0,
    };

    /// The transient sentinel installed while a load or store holds the
    /// cell's single logical lock.
    const BUSY: Pair = Pair {
        control_block: 1,
        data: 0,
    };

    fn to_bits(self) -> u128 {
        bytemuck::cast(self)
    }

    fn from_bits(bits: u128) -> Self {
        bytemuck::cast(bits)
    }
}

/// A value currently held by an [`ArcCell`], with the refcount already
/// incremented on its behalf. Release it with [`ArcCell::release`] (or let
/// `Drop` do it, once a concrete `T` handle wraps this — the bare cell
/// never runs destructors for you).
pub struct Held<T> {
    control_block: *const super::control_block::ControlBlock,
    data: *mut T,
}

impl<T> Held<T> {
    pub fn data(&self) -> *mut T {
        self.data
    }

    pub fn control_block(&self) -> &super::control_block::ControlBlock {
        // SAFETY: the cell incremented this block's refcount before handing
        // out this `Held`, so the block outlives it.
        unsafe { &*self.control_block }
    }
}

/// A lock-free reference-counted cell over a single untyped value pair.
/// Does not own the value it holds — the caller's `destroy_fn` on the
/// control block is what actually frees it.
pub struct ArcCell<T> {
    word: AtomicU128,
    _marker: PhantomData<T>,
}

impl<T> ArcCell<T> {
    /// Creates an empty cell. Use [`ArcCell::atomic_store`] to install the
    /// first value.
    pub fn empty() -> Self {
        Self {
            word: AtomicU128::new(Pair::NULL.to_bits()),
            _marker: PhantomData,
        }
    }

    /// Creates a cell already holding `control_block`/`data`, at whatever
    /// refcount the control block starts at (normally 1, from
    /// `ControlBlock::new`). This is the spec's `arc_new`.
    pub fn arc_new(control_block: *const super::control_block::ControlBlock, data: *mut T) -> Self {
        let pair = Pair {
            control_block: control_block as u64,
            data: data as u64,
        };
        Self {
            word: AtomicU128::new(pair.to_bits()),
            _marker: PhantomData,
        }
    }

    /// CAS the cell's word from `current` to `BUSY`, the lock-acquire half
    /// of both `atomic_load` and `atomic_store`. Returns the pair that was
    /// locked on success.
    fn atomic_begin(&self) -> Pair {
        let mut spins = 0u32;
        loop {
            let current = Pair::from_bits(self.word.load(Ordering::Acquire));
            if current == Pair::BUSY {
                host::spin_hint();
                spins = spins.wrapping_add(1);
                crate::insights::record_long_spin("arc_cell_acquire", spins);
                continue;
            }
            if self
                .word
                .compare_exchange(
                    current.to_bits(),
                    Pair::BUSY.to_bits(),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return current;
            }
            host::spin_hint();
            spins = spins.wrapping_add(1);
            crate::insights::record_long_spin("arc_cell_acquire", spins);
        }
    }

    /// CAS the cell's word from `BUSY` to `next`, the lock-release half.
    /// Never contended — only the thread that set `BUSY` ever clears it —
    /// so this always succeeds on the first try.
    fn atomic_commit(&self, next: Pair) {
        let ok = self
            .word
            .compare_exchange(
                Pair::BUSY.to_bits(),
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        debug_assert!(ok, "atomic_commit raced with a non-lock-holder");
    }

    /// Reads the currently held value and increments its refcount on the
    /// caller's behalf. Returns `None` if the cell is empty.
    pub fn atomic_load(&self) -> Option<Held<T>> {
        let current = self.atomic_begin();
        if current == Pair::NULL {
            self.atomic_commit(current);
            return None;
        }
        // SAFETY: `current` was read while the cell's logical lock is held,
        // so the control block it names cannot be destroyed until we
        // release the lock below.
        let block = unsafe { &*(current.control_block as *const super::control_block::ControlBlock) };
        block.incref();
        self.atomic_commit(current);
        Some(Held {
            control_block: current.control_block as *const super::control_block::ControlBlock,
            data: current.data as *mut T,
        })
    }

    /// Atomically replaces the cell's value with a clone of
    /// `(control_block, data)`, discounting the cell's own reference to
    /// whatever it held before — destroying it if that was the last
    /// reference. The cell takes out a second, independent reference on
    /// `control_block` (the spec's `clone(new_local)` pre-bump); the caller
    /// keeps whatever reference it already held and is responsible for
    /// releasing that reference itself, exactly as with `atomic_load`'s
    /// result.
    ///
    /// # Safety
    /// `control_block`/`data` must be a pair the caller already holds a
    /// live reference to (fresh from `arc_new`, or from a prior
    /// `atomic_load`/`clone_handle`).
    pub unsafe fn atomic_store(
        &self,
        control_block: *const super::control_block::ControlBlock,
        data: *mut T,
    ) {
        (*control_block).incref();
        let next = Pair {
            control_block: control_block as u64,
            data: data as u64,
        };
        let previous = self.atomic_begin();
        if previous == Pair::NULL {
            self.atomic_commit(next);
            return;
        }
        let old_block = &*(previous.control_block as *const super::control_block::ControlBlock);
        let old_rc = old_block.decref();
        self.atomic_commit(next);
        if old_rc == 0 {
            old_block.destroy();
        }
    }

    /// True if `a` and `b` were loaded from the same cell state — same
    /// control block identity. Does not touch refcounts.
    pub fn is_equal(a: &Held<T>, b: &Held<T>) -> bool {
        a.control_block == b.control_block
    }

    /// Releases a handle obtained from `atomic_load`/`atomic_store`,
    /// decrementing its refcount and running `destroy` if it reached zero.
    /// # Safety
    /// `held` must not be used after this call.
    pub unsafe fn release(held: Held<T>) {
        let block = &*held.control_block;
        if block.decref() == 0 {
            block.destroy();
        }
    }

    /// Increments the refcount of an already-held value, producing a
    /// second independent handle to the same data. The spec's `arc_clone`.
    pub fn clone_handle(held: &Held<T>) -> Held<T> {
        held.control_block().incref();
        Held {
            control_block: held.control_block,
            data: held.data,
        }
    }
}
