//! `Ring<T>` pairs a [`RingState`] with its own backing storage. The bare
//! coordinator is storage-agnostic; this wrapper is the ergonomic default
//! for callers who don't need to own the slots themselves.
//!
//! Grounded on `kaos::disruptor::ring_buffer_core::RingBufferCore`: a boxed
//! slice of `UnsafeCell<T>` slots, written and read through volatile
//! pointer access so the compiler can't fold away the single producer/
//! single consumer access to a given slot.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::state::{RingState, StreamCursor};
use crate::error::Result;

struct Slots<T> {
    data: Box<[UnsafeCell<T>]>,
}

// SAFETY: access to a given slot is mediated entirely by the claim/commit
// watermarks in `RingState`; only the cursor holding an uncommitted claim on
// a slot ever touches it.
unsafe impl<T: Send> Sync for Slots<T> {}

/// A ring with its own storage. One `Ring` is shared by every producer and
/// consumer cursor through `&self`.
pub struct Ring<T> {
    state: RingState,
    slots: Slots<T>,
    producers_registered: AtomicUsize,
    consumers_registered: AtomicUsize,
}

impl<T: Default> Ring<T> {
    /// `capacity` must be a power of two and at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        let state = RingState::new(capacity)?;
        let data: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect();
        Ok(Self {
            state,
            slots: Slots { data },
            producers_registered: AtomicUsize::new(0),
            consumers_registered: AtomicUsize::new(0),
        })
    }
}

impl<T> Ring<T> {
    pub fn capacity(&self) -> usize {
        self.state.capacity()
    }

    /// Hands out a new producer cursor. Debug builds assert the spec's
    /// capacity/2 participant bound; release builds trust the caller.
    pub fn producer_cursor(&self) -> ProducerCursor<'_, T> {
        let registered = self.producers_registered.fetch_add(1, Ordering::Relaxed) + 1;
        debug_assert!(
            registered <= self.capacity() / 2,
            "more producers registered than the ring's capacity/2 bound supports"
        );
        ProducerCursor {
            cursor: StreamCursor::new(&self.state),
            slots: &self.slots,
        }
    }

    /// Hands out a new consumer cursor. Same participant bound as
    /// `producer_cursor`, tracked independently.
    pub fn consumer_cursor(&self) -> ConsumerCursor<'_, T> {
        let registered = self.consumers_registered.fetch_add(1, Ordering::Relaxed) + 1;
        debug_assert!(
            registered <= self.capacity() / 2,
            "more consumers registered than the ring's capacity/2 bound supports"
        );
        ConsumerCursor {
            cursor: StreamCursor::new(&self.state),
            slots: &self.slots,
        }
    }

}

/// A producer's view of a [`Ring`]: a `StreamCursor` plus access to the
/// slots it claims.
pub struct ProducerCursor<'a, T> {
    cursor: StreamCursor<'a>,
    slots: &'a Slots<T>,
}

impl<'a, T> ProducerCursor<'a, T> {
    /// Claims a slot, spins until it is writable, writes `value`, and
    /// publishes. Combines `begin_write` + `commit_write`.
    pub fn push(&mut self, value: T) {
        let idx = self.cursor.begin_write();
        // SAFETY: `idx` is the slot just claimed by `begin_write`.
        unsafe { ptr::write_volatile(self.slots.data[idx].get(), value) };
        self.cursor.commit_write();
    }

    /// Non-blocking push state machine: claims a slot, returns it with the
    /// value written once ready, `None` if not yet ready. Call repeatedly
    /// with the same pending claim until it returns `Some` and publish with
    /// `commit`.
    pub fn poll_claim(&mut self) -> usize {
        self.cursor.poll_begin_write()
    }

    pub fn poll_ready(&self) -> bool {
        self.cursor.poll_write_ready()
    }

    /// Writes into the slot claimed by the last `poll_claim`. Caller must
    /// have observed `poll_ready() == true` first.
    pub fn poll_write(&mut self, index: usize, value: T) {
        // SAFETY: caller holds the claim on `index` from `poll_claim`.
        unsafe { ptr::write_volatile(self.slots.data[index].get(), value) };
    }

    pub fn poll_commit(&mut self) -> bool {
        self.cursor.poll_commit_write()
    }
}

/// A consumer's view of a [`Ring`].
pub struct ConsumerCursor<'a, T> {
    cursor: StreamCursor<'a>,
    slots: &'a Slots<T>,
}

impl<'a, T> ConsumerCursor<'a, T> {
    /// Claims a slot, spins until an element is available, reads it, and
    /// publishes the read watermark. Combines `begin_read` + `commit_read`.
    pub fn pop(&mut self) -> T {
        let idx = self.cursor.begin_read();
        // SAFETY: `idx` is published by its producer by the time
        // `begin_read`'s wait loop returns.
        let value = unsafe { ptr::read_volatile(self.slots.data[idx].get()) };
        self.cursor.commit_read();
        value
    }

    pub fn poll_claim(&mut self) -> usize {
        self.cursor.poll_begin_read()
    }

    pub fn poll_ready(&self) -> bool {
        self.cursor.poll_read_ready()
    }

    /// Reads the slot claimed by the last `poll_claim`. Caller must have
    /// observed `poll_ready() == true` first.
    pub fn poll_read(&mut self, index: usize) -> T {
        // SAFETY: caller observed readiness via `poll_ready`.
        unsafe { ptr::read_volatile(self.slots.data[index].get()) }
    }

    pub fn poll_commit(&mut self) -> bool {
        self.cursor.poll_commit_read()
    }
}
