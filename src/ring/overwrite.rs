//! Lock-free overwriting SPSC ring buffers
//!
//! The producer never blocks: when it laps the consumer, the oldest entries are
//! stepped over and lost. The consumer parks on a manual-reset event while the
//! buffer is empty. Two flavors:
//!
//! - [`OverwritingRing`] resolves producer/consumer collisions with a single
//!   compare-and-swap on the read cursor and copies values in and out. Under
//!   sustained overrun the consumer may observe stale or torn cells; the
//!   `T: Copy` bound and volatile slot access confine that to harmless
//!   plain-old-data copies. Use it where dropping a prefix is acceptable and
//!   the producer must never stall.
//! - [`RecycleRing`] arbitrates collisions with a [`SpinLock`] and exchanges
//!   slot contents instead of copying, so both sides can recycle their cells
//!   without allocating. It also takes an `unlock_threshold` (the consumer is
//!   not signalled until that many items are buffered) and an
//!   `overwriting_step` (how far the producer jumps the read cursor on a lap).
//!
//! Single producer, single consumer; the cursors assume exactly one mutator per
//! side (apart from the producer stepping the read cursor on overrun).

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::time::{ Duration, Instant };

use crate::config_error;
use crate::constants::{ DEFAULT_OVERWRITING_STEP, DEFAULT_UNLOCK_THRESHOLD, MIN_RING_CAPACITY };
use crate::error::{ Result, WhirlError };
use crate::sync::{ ManualResetEvent, PaddedCounter, PaddedCursor, SpinLock };

#[inline]
fn advance(index: usize, capacity: usize) -> usize {
    if index + 1 == capacity {
        0
    } else {
        index + 1
    }
}

/// CAS-arbitrated overwriting SPSC ring for plain-old-data elements
pub struct OverwritingRing<T: Copy> {
    capacity: usize,
    slots: Box<[UnsafeCell<T>]>,

    /// Producer-owned cursor
    write_point: PaddedCursor,
    /// Consumer cursor; the producer CASes it forward when it laps the reader
    read_point: PaddedCursor,
    occupancy: PaddedCounter,

    terminated: AtomicBool,
    read_enable: ManualResetEvent,
}

unsafe impl<T: Copy + Send> Send for OverwritingRing<T> {}
unsafe impl<T: Copy + Send> Sync for OverwritingRing<T> {}

impl<T: Copy + Default> OverwritingRing<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_RING_CAPACITY {
            return Err(config_error!("Ring capacity {} below minimum {}", capacity, MIN_RING_CAPACITY));
        }

        let slots: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            capacity,
            slots,
            write_point: PaddedCursor::new(0),
            read_point: PaddedCursor::new(0),
            occupancy: PaddedCounter::new(0),
            terminated: AtomicBool::new(false),
            read_enable: ManualResetEvent::new(false),
        })
    }
}

impl<T: Copy> OverwritingRing<T> {
    /// Push without ever blocking; laps the reader and drops the oldest entry
    /// when the buffer is full
    pub fn push(&self, value: T) -> Result<()> {
        if self.is_terminated() {
            return Err(WhirlError::Terminated);
        }

        let index = self.write_point.index.load(Ordering::Relaxed);
        unsafe {
            ptr::write_volatile(self.slots[index].get(), value);
        }

        let next = advance(index, self.capacity);
        self.write_point.index.store(next, Ordering::Release);

        // Lap detection: the reader sitting exactly at the new write point
        // means the buffer looked full; step it past the oldest entry. A
        // failed CAS means the reader moved on its own, the common case.
        let lapped = self.read_point.index
            .compare_exchange(
                next,
                advance(next, self.capacity),
                Ordering::AcqRel,
                Ordering::Relaxed
            )
            .is_ok();

        if !lapped {
            self.occupancy.count.fetch_add(1, Ordering::AcqRel);
        }

        if !self.read_enable.is_set() && self.occupancy.count.load(Ordering::Acquire) > 0 {
            self.read_enable.set();
        }

        Ok(())
    }

    /// Pop the oldest surviving element, blocking while the buffer is empty
    pub fn pop(&self) -> Result<T> {
        if !self.wait_for_data() {
            return Err(WhirlError::Terminated);
        }

        // Claim loop: a concurrent lap by the producer invalidates the read,
        // so the value only counts once the cursor CAS lands.
        let value = loop {
            let index = self.read_point.index.load(Ordering::Acquire);
            let value = unsafe { ptr::read_volatile(self.slots[index].get()) };

            if
                self.read_point.index
                    .compare_exchange(
                        index,
                        advance(index, self.capacity),
                        Ordering::AcqRel,
                        Ordering::Acquire
                    )
                    .is_ok()
            {
                break value;
            }
        };

        if self.occupancy.count.fetch_sub(1, Ordering::AcqRel) == 1 && !self.is_terminated() {
            self.read_enable.reset();

            // An element published between the decrement and the reset would
            // otherwise strand: re-arm the event if data is already back.
            if self.occupancy.count.load(Ordering::Acquire) > 0 {
                self.read_enable.set();
            }
        }

        Ok(value)
    }

    /// Block until data is available; false once terminated with nothing left
    pub fn wait_for_data(&self) -> bool {
        loop {
            if self.occupancy.count.load(Ordering::Acquire) > 0 {
                return true;
            }
            if self.is_terminated() {
                return false;
            }

            if self.read_enable.is_set() {
                // Stale signal from a fully drained burst; clear and re-check.
                self.read_enable.reset();
                if self.occupancy.count.load(Ordering::Acquire) > 0 {
                    self.read_enable.set();
                }
                continue;
            }

            self.read_enable.wait();
        }
    }

    pub fn wait_for_data_for(&self, rel_time: Duration) -> bool {
        self.wait_for_data_until(Instant::now() + rel_time)
    }

    pub fn wait_for_data_until(&self, deadline: Instant) -> bool {
        loop {
            if self.occupancy.count.load(Ordering::Acquire) > 0 {
                return true;
            }
            if self.is_terminated() {
                return false;
            }

            if self.read_enable.is_set() {
                self.read_enable.reset();
                if self.occupancy.count.load(Ordering::Acquire) > 0 {
                    self.read_enable.set();
                }
                continue;
            }

            if !self.read_enable.wait_until(deadline) {
                return self.occupancy.count.load(Ordering::Acquire) > 0;
            }
        }
    }

    /// Wake the consumer and make every subsequent operation a no-op
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
        self.read_enable.set();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Approximate occupancy; may lag under overrun
    pub fn len(&self) -> usize {
        self.occupancy.count.load(Ordering::Acquire).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Spin-arbitrated overwriting SPSC ring with slot-swap semantics
pub struct RecycleRing<T> {
    capacity: usize,
    unlock_threshold: usize,
    overwriting_step: usize,
    slots: Box<[UnsafeCell<T>]>,

    /// Producer-owned cursor
    write_point: PaddedCursor,
    /// Consumer cursor; stepped by the producer under `sync` on overrun
    read_point: PaddedCursor,
    occupancy: PaddedCounter,

    sync: SpinLock,
    terminated: AtomicBool,
    read_enable: ManualResetEvent,
}

unsafe impl<T: Send> Send for RecycleRing<T> {}
unsafe impl<T: Send> Sync for RecycleRing<T> {}

impl<T: Default> RecycleRing<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_tuning(capacity, DEFAULT_UNLOCK_THRESHOLD, DEFAULT_OVERWRITING_STEP)
    }

    /// Create a ring with explicit wake-up and overrun tuning.
    ///
    /// The consumer is not signalled until `unlock_threshold` items are
    /// buffered; on a lap the producer jumps the read cursor forward by
    /// `overwriting_step` slots, discarding that many unconsumed entries.
    pub fn with_tuning(
        capacity: usize,
        unlock_threshold: usize,
        overwriting_step: usize
    ) -> Result<Self> {
        if capacity < MIN_RING_CAPACITY {
            return Err(config_error!("Ring capacity {} below minimum {}", capacity, MIN_RING_CAPACITY));
        }
        if unlock_threshold == 0 || unlock_threshold > capacity {
            return Err(
                config_error!("Unlock threshold {} out of range [1, {}]", unlock_threshold, capacity)
            );
        }
        if overwriting_step == 0 || overwriting_step > capacity {
            return Err(
                config_error!("Overwriting step {} out of range [1, {}]", overwriting_step, capacity)
            );
        }

        let slots: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            capacity,
            unlock_threshold,
            overwriting_step,
            slots,
            write_point: PaddedCursor::new(0),
            read_point: PaddedCursor::new(0),
            occupancy: PaddedCounter::new(0),
            sync: SpinLock::new(),
            terminated: AtomicBool::new(false),
            read_enable: ManualResetEvent::new(false),
        })
    }

    /// Pop the oldest element, refilling the slot with `T::default()`
    pub fn pop(&self) -> Result<T> {
        self.pop_swap(T::default())
    }
}

impl<T> RecycleRing<T> {
    /// Push by exchanging the slot content with `value`; never blocks.
    ///
    /// Returns the displaced slot content for recycling. When the producer
    /// laps the consumer, the read cursor jumps `overwriting_step` slots and
    /// the overwritten entries are lost.
    pub fn push_swap(&self, value: T) -> Result<T> {
        if self.is_terminated() {
            return Err(WhirlError::Terminated);
        }

        let index = self.write_point.index.load(Ordering::Relaxed);
        let displaced = unsafe { ptr::replace(self.slots[index].get(), value) };

        let next = advance(index, self.capacity);
        self.write_point.index.store(next, Ordering::Release);

        let mut overrun = false;
        if self.read_point.index.load(Ordering::Acquire) == next {
            let _guard = self.sync.lock();

            // Re-check under the lock; the consumer may have moved first.
            if self.read_point.index.load(Ordering::Relaxed) == next {
                let jumped = (next + self.overwriting_step) % self.capacity;
                self.read_point.index.store(jumped, Ordering::Release);

                // One pushed, `overwriting_step` dropped.
                self.occupancy.count.fetch_sub(
                    self.overwriting_step as isize - 1,
                    Ordering::AcqRel
                );
                overrun = true;
            }
        }

        if !overrun {
            self.occupancy.count.fetch_add(1, Ordering::AcqRel);
        }

        if
            !self.read_enable.is_set() &&
            self.occupancy.count.load(Ordering::Acquire) >= (self.unlock_threshold as isize)
        {
            self.read_enable.set();
        }

        Ok(displaced)
    }

    /// Push, dropping the displaced slot content
    pub fn push(&self, value: T) -> Result<()> {
        self.push_swap(value).map(drop)
    }

    /// Pop by exchanging the slot content with `value`, blocking while empty
    pub fn pop_swap(&self, value: T) -> Result<T> {
        if !self.wait_for_data() {
            return Err(WhirlError::Terminated);
        }

        let taken = {
            let _guard = self.sync.lock();

            let index = self.read_point.index.load(Ordering::Relaxed);
            let taken = unsafe { ptr::replace(self.slots[index].get(), value) };
            self.read_point.index.store(advance(index, self.capacity), Ordering::Release);

            taken
        };

        if self.occupancy.count.fetch_sub(1, Ordering::AcqRel) == 1 && !self.is_terminated() {
            self.read_enable.reset();

            // An element published between the decrement and the reset would
            // otherwise strand; re-arm under the producer's threshold rule.
            if self.occupancy.count.load(Ordering::Acquire) >= (self.unlock_threshold as isize) {
                self.read_enable.set();
            }
        }

        Ok(taken)
    }

    /// Block until data is available; false once terminated with nothing left.
    ///
    /// With an `unlock_threshold` above 1 this returns only after the producer
    /// has buffered at least that many items (or on the terminate signal).
    pub fn wait_for_data(&self) -> bool {
        loop {
            if self.occupancy.count.load(Ordering::Acquire) > 0 && self.read_enable.is_set() {
                return true;
            }
            if self.is_terminated() {
                return self.occupancy.count.load(Ordering::Acquire) > 0;
            }

            if self.read_enable.is_set() {
                // Signalled but drained; clear the stale signal and re-check.
                self.read_enable.reset();
                if self.occupancy.count.load(Ordering::Acquire) >= (self.unlock_threshold as isize) {
                    self.read_enable.set();
                }
                continue;
            }

            self.read_enable.wait();
        }
    }

    pub fn wait_for_data_for(&self, rel_time: Duration) -> bool {
        self.wait_for_data_until(Instant::now() + rel_time)
    }

    pub fn wait_for_data_until(&self, deadline: Instant) -> bool {
        loop {
            if self.occupancy.count.load(Ordering::Acquire) > 0 && self.read_enable.is_set() {
                return true;
            }
            if self.is_terminated() {
                return self.occupancy.count.load(Ordering::Acquire) > 0;
            }

            if self.read_enable.is_set() {
                self.read_enable.reset();
                if self.occupancy.count.load(Ordering::Acquire) >= (self.unlock_threshold as isize) {
                    self.read_enable.set();
                }
                continue;
            }

            if !self.read_enable.wait_until(deadline) {
                return self.occupancy.count.load(Ordering::Acquire) > 0 && self.read_enable.is_set();
            }
        }
    }

    /// Wake the consumer and make every subsequent operation a no-op
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
        self.read_enable.set();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Approximate occupancy; may lag under overrun
    pub fn len(&self) -> usize {
        self.occupancy.count.load(Ordering::Acquire).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
