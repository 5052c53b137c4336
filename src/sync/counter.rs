//! Counter locks
//!
//! A counter lock holds an occupancy count in `[0, max]` together with two
//! gates: `add_lock` blocks producers while the counter sits at `max`,
//! `sub_lock` blocks consumers while it sits at zero. The blocking ring buffers
//! delegate all of their producer/consumer coordination to one of these.
//!
//! `HysteresisCounterLock` re-opens the gates asymmetrically: the consumer gate
//! opens only once the count has risen to `threshold_down`, the producer gate
//! only once it has fallen to `max - threshold_up`. Distinct close/open points
//! suppress notification ping-pong under bursty flow. Gates always close at the
//! extremes.
//!
//! With both thresholds at 1 the hysteresis rule degenerates to the plain
//! counter-lock rule, so `CounterLock` is a thin wrapper over the hysteresis
//! variant.

use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::time::{ Duration, Instant };

use parking_lot::{ Condvar, Mutex };

use crate::config_error;
use crate::error::Result;

struct GateState {
    value: usize,
    add_lock: bool,
    sub_lock: bool,
}

/// Counter lock with asymmetric gate-release thresholds
pub struct HysteresisCounterLock {
    max_value: usize,
    threshold_down: usize,
    threshold_up: usize,

    state: Mutex<GateState>,
    cv: Condvar,

    // Relaxed mirror of the counter for monitoring; authoritative value lives
    // under the mutex.
    monitor: AtomicUsize,
    terminated: AtomicBool,
}

impl HysteresisCounterLock {
    /// Create a counter lock with explicit release thresholds.
    ///
    /// Requires `max_value >= 1`, `1 <= threshold_down <= max_value`,
    /// `1 <= threshold_up <= max_value` and `initial_value <= max_value`.
    pub fn new(
        max_value: usize,
        threshold_down: usize,
        threshold_up: usize,
        initial_value: usize
    ) -> Result<Self> {
        if max_value == 0 {
            return Err(config_error!("Counter maximum must be at least 1"));
        }
        if threshold_down == 0 || threshold_down > max_value {
            return Err(
                config_error!("Threshold down {} out of range [1, {}]", threshold_down, max_value)
            );
        }
        if threshold_up == 0 || threshold_up > max_value {
            return Err(
                config_error!("Threshold up {} out of range [1, {}]", threshold_up, max_value)
            );
        }
        if initial_value > max_value {
            return Err(
                config_error!("Initial value {} exceeds maximum {}", initial_value, max_value)
            );
        }

        Ok(Self {
            max_value,
            threshold_down,
            threshold_up,
            state: Mutex::new(GateState {
                value: initial_value,
                add_lock: initial_value == max_value,
                sub_lock: initial_value == 0,
            }),
            cv: Condvar::new(),
            monitor: AtomicUsize::new(initial_value),
            terminated: AtomicBool::new(false),
        })
    }

    /// Wake every waiter and make all future operations no-ops.
    ///
    /// One-way transition; the gates themselves are left untouched.
    pub fn terminate(&self) {
        let _state = self.state.lock();

        self.terminated.store(true, Ordering::Release);
        self.cv.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Approximate counter value for monitoring; racy by design
    pub fn value(&self) -> usize {
        self.monitor.load(Ordering::Acquire)
    }

    /// Block while the producer gate is closed, then increment.
    ///
    /// Closes `add_lock` when the counter reaches `max_value`; opens `sub_lock`
    /// (waking consumers) once the counter has risen to `threshold_down`.
    /// Returns false without mutating if terminated.
    pub fn add(&self) -> bool {
        let mut state = self.state.lock();

        while state.add_lock && !self.is_terminated() {
            self.cv.wait(&mut state);
        }

        if self.is_terminated() {
            return false;
        }

        state.value += 1;
        self.monitor.store(state.value, Ordering::Release);

        if state.value == self.max_value {
            state.add_lock = true;
        }

        if state.sub_lock && state.value >= self.threshold_down {
            state.sub_lock = false;
            self.cv.notify_all();
        }

        true
    }

    /// Block while the consumer gate is closed, then decrement.
    ///
    /// Closes `sub_lock` when the counter reaches zero; opens `add_lock`
    /// (waking producers) once the counter has fallen to
    /// `max_value - threshold_up`. Returns false without mutating if
    /// terminated.
    pub fn sub(&self) -> bool {
        let mut state = self.state.lock();

        while state.sub_lock && !self.is_terminated() {
            self.cv.wait(&mut state);
        }

        if self.is_terminated() {
            return false;
        }

        state.value -= 1;
        self.monitor.store(state.value, Ordering::Release);

        if state.value == 0 {
            state.sub_lock = true;
        }

        if state.add_lock && state.value <= self.max_value - self.threshold_up {
            state.add_lock = false;
            self.cv.notify_all();
        }

        true
    }

    /// Block until the producer gate is open; false if terminated
    pub fn wait_for_add(&self) -> bool {
        let mut state = self.state.lock();

        while state.add_lock && !self.is_terminated() {
            self.cv.wait(&mut state);
        }

        !self.is_terminated()
    }

    /// Timed [`wait_for_add`](Self::wait_for_add); false on timeout or termination
    pub fn wait_for_add_for(&self, rel_time: Duration) -> bool {
        self.wait_for_add_until(Instant::now() + rel_time)
    }

    pub fn wait_for_add_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();

        while state.add_lock && !self.is_terminated() {
            if self.cv.wait_until(&mut state, deadline).timed_out() {
                return !state.add_lock && !self.is_terminated();
            }
        }

        !self.is_terminated()
    }

    /// Block until the consumer gate is open; false if terminated
    pub fn wait_for_sub(&self) -> bool {
        let mut state = self.state.lock();

        while state.sub_lock && !self.is_terminated() {
            self.cv.wait(&mut state);
        }

        !self.is_terminated()
    }

    /// Timed [`wait_for_sub`](Self::wait_for_sub); false on timeout or termination
    pub fn wait_for_sub_for(&self, rel_time: Duration) -> bool {
        self.wait_for_sub_until(Instant::now() + rel_time)
    }

    pub fn wait_for_sub_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();

        while state.sub_lock && !self.is_terminated() {
            if self.cv.wait_until(&mut state, deadline).timed_out() {
                return !state.sub_lock && !self.is_terminated();
            }
        }

        !self.is_terminated()
    }

    #[cfg(test)]
    fn gates(&self) -> (bool, bool) {
        let state = self.state.lock();
        (state.add_lock, state.sub_lock)
    }
}

/// Plain counter lock: gates re-open on every increment/decrement
///
/// Equivalent to a [`HysteresisCounterLock`] with both thresholds at 1.
pub struct CounterLock {
    inner: HysteresisCounterLock,
}

impl CounterLock {
    /// Create a counter lock over `[0, max_value]`
    pub fn new(max_value: usize, initial_value: usize) -> Result<Self> {
        Ok(Self {
            inner: HysteresisCounterLock::new(max_value, 1, 1, initial_value)?,
        })
    }

    pub fn terminate(&self) {
        self.inner.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    pub fn value(&self) -> usize {
        self.inner.value()
    }

    pub fn add(&self) -> bool {
        self.inner.add()
    }

    pub fn sub(&self) -> bool {
        self.inner.sub()
    }

    pub fn wait_for_add(&self) -> bool {
        self.inner.wait_for_add()
    }

    pub fn wait_for_add_for(&self, rel_time: Duration) -> bool {
        self.inner.wait_for_add_for(rel_time)
    }

    pub fn wait_for_add_until(&self, deadline: Instant) -> bool {
        self.inner.wait_for_add_until(deadline)
    }

    pub fn wait_for_sub(&self) -> bool {
        self.inner.wait_for_sub()
    }

    pub fn wait_for_sub_for(&self, rel_time: Duration) -> bool {
        self.inner.wait_for_sub_for(rel_time)
    }

    pub fn wait_for_sub_until(&self, deadline: Instant) -> bool {
        self.inner.wait_for_sub_until(deadline)
    }
}
