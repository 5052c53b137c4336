//! Whirl tuning constants
//!
//! Core constants used by the ring buffer and synchronization primitives.

/// Smallest ring buffer capacity that keeps a reader and a writer apart
pub const MIN_RING_CAPACITY: usize = 2;

/// Default unlock threshold for the lock-free recyclable ring
pub const DEFAULT_UNLOCK_THRESHOLD: usize = 1;

/// Default number of slots the producer steps over the reader on overrun
pub const DEFAULT_OVERWRITING_STEP: usize = 1;

/// Default hysteresis thresholds (plain counter-lock behavior)
pub const DEFAULT_HYSTERESIS_THRESHOLD: usize = 1;

/// Cache line size for alignment (64 bytes on most CPUs)
pub const CACHE_LINE_SIZE: usize = 64;
