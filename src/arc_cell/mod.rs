//! The ARC cell: a lock-free atomically reference-counted slot, built on a
//! 128-bit double-word CAS. [`cell`] is the bare untyped primitive; [`handle`]
//! is the ergonomic `Arc`-like wrapper most callers want.

pub mod cell;
pub mod control_block;
mod handle;

pub use cell::{ArcCell, Held};
pub use control_block::{ControlBlock, DestroyFn};
pub use handle::AtomicArc;
