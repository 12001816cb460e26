//! Core constants shared by the ring coordinator and the ARC cell.

/// Default ring capacity used by `Ring::new` callers that don't override it.
pub const DEFAULT_RING_CAPACITY: usize = 1024;

/// The only valid "no claim yet" value for a watermark or claim counter.
pub const UNCLAIMED: i32 = -1;
