//! The bare ring coordinator: hands out claims and publishes commits in
//! sequence order. Owns no storage — the caller indexes its own array of
//! `capacity` slots with the index each operation returns.

use crate::constants::UNCLAIMED;
use crate::error::{Result, RingCellError};
use crate::host;
use crate::host::{AtomicI32, Ordering};
use crate::insights;

/// Shared coordinator state for one ring. One instance per ring, referenced
/// by every producer and consumer `StreamCursor`.
pub struct RingState {
    pub(crate) capacity: usize,
    pub(crate) mask: usize,
    pub(crate) next_write: AtomicI32,
    pub(crate) last_write: AtomicI32,
    pub(crate) next_read: AtomicI32,
    pub(crate) last_read: AtomicI32,
}

impl RingState {
    /// `capacity` must be a power of two and at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(RingCellError::config(
                "ring capacity must be a power of two and at least 2",
            ));
        }
        Ok(Self {
            capacity,
            mask: capacity - 1,
            next_write: AtomicI32::new(UNCLAIMED),
            last_write: AtomicI32::new(UNCLAIMED),
            next_read: AtomicI32::new(UNCLAIMED),
            last_read: AtomicI32::new(UNCLAIMED),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn slot_index(&self, pos: i32) -> usize {
        (pos as u32 as usize) & self.mask
    }

    /// The write watermark, for diagnostics and tests only — it can change
    /// the instant this call returns.
    pub fn last_write(&self) -> i32 {
        self.last_write.load(Ordering::Acquire)
    }

    /// The read watermark, for diagnostics and tests only — it can change
    /// the instant this call returns.
    pub fn last_read(&self) -> i32 {
        self.last_read.load(Ordering::Acquire)
    }
}

/// A per-thread handle into a ring: a sequence number and nothing else.
/// Producers and consumers each hold their own cursor over the same
/// `RingState`.
pub struct StreamCursor<'a> {
    state: &'a RingState,
    current_pos: i32,
}

impl<'a> StreamCursor<'a> {
    pub fn new(state: &'a RingState) -> Self {
        Self {
            state,
            current_pos: UNCLAIMED,
        }
    }

    /// The sequence number most recently claimed by this cursor.
    pub fn current_pos(&self) -> i32 {
        self.current_pos
    }

    fn writable_space(&self, pos: i32) -> i32 {
        (self.state.capacity as i32)
            .wrapping_add(self.state.last_read())
            .wrapping_sub(pos)
            .wrapping_add(1)
    }

    fn readable_count(&self, pos: i32) -> i32 {
        self.state
            .last_write()
            .wrapping_sub(pos)
            .wrapping_add(1)
    }

    // ---- synchronous producer API ----

    /// Claims the next write sequence number, spinning until the slot is
    /// writable. Returns the slot index to write into.
    pub fn begin_write(&mut self) -> usize {
        let pos = host::increment(&self.state.next_write);
        self.current_pos = pos;
        let mut spins = 0u32;
        while self.writable_space(pos) < 1 {
            host::full_fence();
            host::spin_hint();
            spins = spins.wrapping_add(1);
            insights::record_long_spin("begin_write", spins);
        }
        insights::record_claim("begin_write", pos);
        self.state.slot_index(pos)
    }

    /// Publishes the claim held by this cursor, spinning until the
    /// predecessor has published and the single CAS to advance the
    /// watermark succeeds.
    pub fn commit_write(&mut self) {
        let pos = self.current_pos;
        let mut spins = 0u32;
        loop {
            host::full_fence();
            if self.state.last_write() == pos.wrapping_sub(1)
                && host::cas32(&self.state.last_write, pos.wrapping_sub(1), pos).is_ok()
            {
                insights::record_commit("commit_write", pos);
                return;
            }
            host::spin_hint();
            spins = spins.wrapping_add(1);
            insights::record_long_spin("commit_write", spins);
        }
    }

    // ---- synchronous consumer API ----

    /// Claims the next read sequence number, spinning until a published
    /// element is available. Returns the slot index to read from.
    pub fn begin_read(&mut self) -> usize {
        let pos = host::increment(&self.state.next_read);
        self.current_pos = pos;
        let mut spins = 0u32;
        while self.readable_count(pos) < 1 {
            host::full_fence();
            host::spin_hint();
            spins = spins.wrapping_add(1);
            insights::record_long_spin("begin_read", spins);
        }
        insights::record_claim("begin_read", pos);
        self.state.slot_index(pos)
    }

    /// Publishes the read claim held by this cursor, spinning until the
    /// predecessor has published and the single CAS to advance the
    /// watermark succeeds.
    pub fn commit_read(&mut self) {
        let pos = self.current_pos;
        let mut spins = 0u32;
        loop {
            host::full_fence();
            if self.state.last_read() == pos.wrapping_sub(1)
                && host::cas32(&self.state.last_read, pos.wrapping_sub(1), pos).is_ok()
            {
                insights::record_commit("commit_read", pos);
                return;
            }
            host::spin_hint();
            spins = spins.wrapping_add(1);
            insights::record_long_spin("commit_read", spins);
        }
    }

    // ---- polling producer API ----

    /// Claims the next write sequence number without waiting. The slot is
    /// not yet writable; callers must poll `write_ready` before touching it
    /// and must eventually call `poll_commit_write` to completion — a claim
    /// that is never committed stalls every later commit on this ring.
    pub fn poll_begin_write(&mut self) -> usize {
        let pos = host::increment(&self.state.next_write);
        self.current_pos = pos;
        self.state.slot_index(pos)
    }

    /// Full fence, then report whether the currently claimed write slot is
    /// ready to be written.
    pub fn poll_write_ready(&self) -> bool {
        host::full_fence();
        self.writable_space(self.current_pos) >= 1
    }

    /// Attempt a single CAS to advance `last_write` to this cursor's claim.
    /// Returns `false` if the predecessor hasn't published yet or the CAS
    /// lost a race; callers must re-invoke later.
    pub fn poll_commit_write(&mut self) -> bool {
        let pos = self.current_pos;
        host::cas32(&self.state.last_write, pos.wrapping_sub(1), pos).is_ok()
    }

    // ---- polling consumer API ----

    /// Claims the next read sequence number without waiting.
    pub fn poll_begin_read(&mut self) -> usize {
        let pos = host::increment(&self.state.next_read);
        self.current_pos = pos;
        self.state.slot_index(pos)
    }

    /// Full fence, then report whether the currently claimed read slot has
    /// been published by its producer.
    pub fn poll_read_ready(&self) -> bool {
        host::full_fence();
        self.readable_count(self.current_pos) >= 1
    }

    /// Attempt a single CAS to advance `last_read` to this cursor's claim.
    pub fn poll_commit_read(&mut self) -> bool {
        let pos = self.current_pos;
        host::cas32(&self.state.last_read, pos.wrapping_sub(1), pos).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_power_of_two() {
        assert!(RingState::new(3).is_err());
        assert!(RingState::new(1).is_err());
        assert!(RingState::new(0).is_err());
    }

    #[test]
    fn test_new_accepts_power_of_two() {
        let state = RingState::new(8).unwrap();
        assert_eq!(state.capacity(), 8);
    }

    #[test]
    fn test_first_claim_is_zero() {
        let state = RingState::new(8).unwrap();
        let mut cursor = StreamCursor::new(&state);
        let idx = cursor.begin_write();
        assert_eq!(idx, 0);
        assert_eq!(cursor.current_pos(), 0);
    }

    #[test]
    fn test_single_thread_write_then_read_round_trip() {
        let state = RingState::new(8).unwrap();
        let mut writer = StreamCursor::new(&state);
        let mut reader = StreamCursor::new(&state);

        let idx = writer.begin_write();
        assert_eq!(idx, 0);
        writer.commit_write();

        let ridx = reader.begin_read();
        assert_eq!(ridx, 0);
        reader.commit_read();

        assert_eq!(state.last_write(), 0);
        assert_eq!(state.last_read(), 0);
    }

    #[test]
    fn test_wraps_around_capacity() {
        let state = RingState::new(4).unwrap();
        let mut writer = StreamCursor::new(&state);
        let mut reader = StreamCursor::new(&state);
        for i in 0..10usize {
            let widx = writer.begin_write();
            assert_eq!(widx, i % 4);
            writer.commit_write();
            let ridx = reader.begin_read();
            assert_eq!(ridx, i % 4);
            reader.commit_read();
        }
    }

    #[test]
    fn test_poll_commit_requires_predecessor_published() {
        let state = RingState::new(8).unwrap();
        let mut a = StreamCursor::new(&state);
        let mut b = StreamCursor::new(&state);

        let _ = a.poll_begin_write(); // claims 0
        let _ = b.poll_begin_write(); // claims 1

        // b cannot publish before a does.
        assert!(!b.poll_commit_write());
        assert!(a.poll_commit_write());
        assert!(b.poll_commit_write());
    }
}
