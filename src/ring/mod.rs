//! The ring buffer coordinator: bare sequence-number state in [`state`] and
//! an externally-owned-storage convenience wrapper in [`buffer`].

mod buffer;
mod state;

pub use buffer::{ConsumerCursor, ProducerCursor, Ring};
pub use state::{RingState, StreamCursor};
