//! Lock-free ring buffer coordination and an atomically reference-counted
//! cell, both built on a small, explicit set of host atomic primitives
//! ([`host`]) so either can be ported to a `no_std`/kernel environment by
//! replacing that one module.
//!
//! - [`ring`] — a bounded single-slot-per-claim MPMC coordinator over
//!   externally (or, via [`ring::Ring`], internally) owned storage, with
//!   both a spin-until-ready synchronous API and a caller-driven polling
//!   API.
//! - [`arc_cell`] — a lock-free atomically reference-counted cell, swapped
//!   with a single 128-bit CAS.

pub mod arc_cell;
pub mod constants;
pub mod error;
pub mod host;
pub mod insights;
pub mod ring;

pub use arc_cell::{ArcCell, AtomicArc, ControlBlock, Held};
pub use error::{Result, RingCellError};
pub use ring::{ConsumerCursor, ProducerCursor, Ring, RingState, StreamCursor};
