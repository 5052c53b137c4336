//! Synchronization primitives
//!
//! The building blocks underneath the ring buffers:
//!
//! - [`SpinLock`] / [`SharedSpinLock`] - busy-wait locks for very short
//!   critical sections
//! - [`ManualResetEvent`] / [`AutoResetEvent`] - one-directional wake-ups for
//!   the lock-free paths
//! - [`CounterLock`] / [`HysteresisCounterLock`] - occupancy counters with
//!   producer/consumer gates for the blocking paths
//! - [`Rendezvous`] - reusable thread barrier with a dynamic participant count
//! - [`PaddedCursor`] - cache-line padded atomic index

pub mod spin;
pub mod event;
pub mod counter;
pub mod barrier;
pub mod padding;

pub use spin::{ SpinLock, SpinGuard, SharedSpinLock, SharedSpinReadGuard, SharedSpinWriteGuard };
pub use event::{ ManualResetEvent, AutoResetEvent };
pub use counter::{ CounterLock, HysteresisCounterLock };
pub use barrier::Rendezvous;
pub use padding::{ PaddedCursor, PaddedCounter };
