//! Whirl - fixed-capacity SPSC ring buffers and the primitives beneath them
//!
//! Single-producer / single-consumer message passing where throughput and
//! latency matter and neither side should busy-wait while the buffer is empty
//! or full.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `ring` | `BlockingRing<T>`, `OverwritingRing<T>`, `RecycleRing<T>` |
//! | `sync` | spin locks, resettable events, counter locks, rendezvous barrier |
//! | `cyclic` | modular integer, sliding-window reassembler |
//!
//! ## Picking a ring
//!
//! - `BlockingRing` when no element may be lost: the producer parks on a full
//!   buffer, the consumer on an empty one, with hysteresis thresholds to keep
//!   the two sides from waking each other on every element.
//! - `OverwritingRing` when the producer must never stall and a stale prefix
//!   may be dropped (telemetry, market data fan-in).
//! - `RecycleRing` when elements own buffers worth reusing: push and pop
//!   exchange slot contents instead of copying, so neither side allocates in
//!   steady state.
//!
//! Every blocking operation has `_for`/`_until` timed variants and honors the
//! one-way `terminate` signal: all waiters wake and subsequent operations
//! return [`WhirlError::Terminated`](error::WhirlError::Terminated) without
//! touching the buffer.
//!
//! ## Safety
//!
//! The rings use `unsafe` for direct slot access. Each instance tolerates
//! exactly one producer thread and one consumer thread; running more on either
//! side is a contract violation.

pub mod constants;
pub mod error;
pub mod sync;
pub mod ring;
pub mod cyclic;

pub use error::{ Result, WhirlError };

pub use ring::{ BlockingRing, OverwritingRing, RecycleRing };

pub use sync::{
    SpinLock,
    SharedSpinLock,
    ManualResetEvent,
    AutoResetEvent,
    CounterLock,
    HysteresisCounterLock,
    Rendezvous,
};

pub use cyclic::{ CyclicNumber, Reassembler, BlockingReassembler };
