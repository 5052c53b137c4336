//! Blocking SPSC ring buffer
//!
//! The producer blocks while the buffer is full and the consumer blocks while
//! it is empty. All coordination lives in a [`HysteresisCounterLock`] holding
//! the occupancy: `push` waits on the producer gate, writes its slot, then
//! increments; `pop` is symmetric. With hysteresis thresholds above 1 a parked
//! side is woken only after the other side has made enough progress, which cuts
//! wake-up churn under bursty flow.
//!
//! Single producer, single consumer. Only the producer advances `write_point`
//! and only the consumer advances `read_point`; running two producers or two
//! consumers against one ring is a contract violation.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::time::{ Duration, Instant };

use crate::config_error;
use crate::constants::MIN_RING_CAPACITY;
use crate::error::{ Result, WhirlError };
use crate::sync::HysteresisCounterLock;

/// Fixed-capacity blocking SPSC ring buffer
pub struct BlockingRing<T> {
    capacity: usize,
    slots: Box<[UnsafeCell<T>]>,

    /// Producer-owned cursor
    write_point: AtomicUsize,
    /// Consumer-owned cursor
    read_point: AtomicUsize,

    occupancy: HysteresisCounterLock,
}

unsafe impl<T: Send> Send for BlockingRing<T> {}
unsafe impl<T: Send> Sync for BlockingRing<T> {}

impl<T: Default> BlockingRing<T> {
    /// Create a ring with plain counter-lock wake-up (thresholds of 1)
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_thresholds(capacity, 1, 1)
    }

    /// Create a ring with hysteresis wake-up thresholds.
    ///
    /// The consumer is not woken until occupancy reaches `threshold_down`; the
    /// producer is not woken until occupancy falls back to
    /// `capacity - threshold_up`.
    pub fn with_thresholds(
        capacity: usize,
        threshold_down: usize,
        threshold_up: usize
    ) -> Result<Self> {
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
            write_point: AtomicUsize::new(0),
            read_point: AtomicUsize::new(0),
            occupancy: HysteresisCounterLock::new(capacity, threshold_down, threshold_up, 0)?,
        })
    }
}

impl<T> BlockingRing<T> {
    /// Push an element, blocking while the buffer is full.
    ///
    /// The displaced slot content is dropped. After `terminate` the value is
    /// discarded and `Err(Terminated)` returned.
    pub fn push(&self, value: T) -> Result<()> {
        self.push_swap(value).map(drop)
    }

    /// Push by exchanging the slot content with `value`.
    ///
    /// Returns whatever previously occupied the slot so the caller can recycle
    /// it instead of allocating a fresh element per push.
    pub fn push_swap(&self, value: T) -> Result<T> {
        if !self.occupancy.wait_for_add() {
            return Err(WhirlError::Terminated);
        }

        let index = self.write_point.load(Ordering::Relaxed);
        let displaced = unsafe { ptr::replace(self.slots[index].get(), value) };
        self.write_point.store(Self::advance(index, self.capacity), Ordering::Relaxed);

        // Publishes the slot write to the consumer via the counter's mutex.
        if !self.occupancy.add() {
            return Err(WhirlError::Terminated);
        }

        Ok(displaced)
    }

    /// Pop by exchanging the slot content with `value`
    pub fn pop_swap(&self, value: T) -> Result<T> {
        if !self.occupancy.wait_for_sub() {
            return Err(WhirlError::Terminated);
        }

        let index = self.read_point.load(Ordering::Relaxed);
        let taken = unsafe { ptr::replace(self.slots[index].get(), value) };
        self.read_point.store(Self::advance(index, self.capacity), Ordering::Relaxed);

        if !self.occupancy.sub() {
            return Err(WhirlError::Terminated);
        }

        Ok(taken)
    }

    /// Block until the buffer has room; false once terminated
    pub fn wait_for_space(&self) -> bool {
        self.occupancy.wait_for_add()
    }

    pub fn wait_for_space_for(&self, rel_time: Duration) -> bool {
        self.occupancy.wait_for_add_for(rel_time)
    }

    pub fn wait_for_space_until(&self, deadline: Instant) -> bool {
        self.occupancy.wait_for_add_until(deadline)
    }

    /// Block until the buffer has data; false once terminated
    pub fn wait_for_data(&self) -> bool {
        self.occupancy.wait_for_sub()
    }

    pub fn wait_for_data_for(&self, rel_time: Duration) -> bool {
        self.occupancy.wait_for_sub_for(rel_time)
    }

    pub fn wait_for_data_until(&self, deadline: Instant) -> bool {
        self.occupancy.wait_for_sub_until(deadline)
    }

    /// Unblock all waiters; subsequent push/pop become no-ops
    pub fn terminate(&self) {
        self.occupancy.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.occupancy.is_terminated()
    }

    /// Current occupancy; approximate while either side is mid-operation
    pub fn len(&self) -> usize {
        self.occupancy.value()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn advance(index: usize, capacity: usize) -> usize {
        if index + 1 == capacity {
            0
        } else {
            index + 1
        }
    }
}

impl<T: Default> BlockingRing<T> {
    /// Pop an element, blocking while the buffer is empty.
    ///
    /// The slot is refilled with `T::default()`.
    pub fn pop(&self) -> Result<T> {
        self.pop_swap(T::default())
    }
}
