//! Resettable events
//!
//! One-directional wake-up primitives used by the lock-free rings to park the
//! consumer while the buffer is empty. The event state is an atomic boolean so
//! `is_set` stays lock-free on the hot path; transitions and waits are
//! serialized by a mutex and condition variable.
//!
//! Two reset policies:
//!
//! | Type | `wait` behavior |
//! |------|-----------------|
//! | `ManualResetEvent` | observes a set state without consuming it |
//! | `AutoResetEvent` | atomically consumes the set state; one waiter per `set` |
//!
//! `set` notifies all waiters if and only if it flipped the state from false to
//! true. `reset` never wakes anyone. Termination is not part of the event;
//! callers signal it by setting the event and checking their own flag.

use std::sync::atomic::{ AtomicBool, Ordering };
use std::time::{ Duration, Instant };

use parking_lot::{ Condvar, Mutex };

/// Event that stays signaled until explicitly reset
pub struct ManualResetEvent {
    state: AtomicBool,
    guard: Mutex<()>,
    cv: Condvar,
}

impl ManualResetEvent {
    /// Create an event with the given initial state
    pub fn new(initial_state: bool) -> Self {
        Self {
            state: AtomicBool::new(initial_state),
            guard: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    /// Observe the current state without blocking
    #[inline]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }

    /// Signal the event, waking all waiters if the state flipped
    pub fn set(&self) {
        let _guard = self.guard.lock();

        if !self.state.swap(true, Ordering::AcqRel) {
            self.cv.notify_all();
        }
    }

    /// Clear the state; never wakes anyone
    pub fn reset(&self) {
        let _guard = self.guard.lock();
        self.state.store(false, Ordering::Release);
    }

    /// Block until the state is observed true; does not consume it
    pub fn wait(&self) {
        let mut guard = self.guard.lock();

        while !self.state.load(Ordering::Acquire) {
            self.cv.wait(&mut guard);
        }
    }

    /// Block until set or until `rel_time` elapses.
    ///
    /// Returns the state observed on exit, so a set that lands exactly at the
    /// deadline still reports true.
    pub fn wait_for(&self, rel_time: Duration) -> bool {
        self.wait_until(Instant::now() + rel_time)
    }

    /// Block until set or until the deadline passes
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut guard = self.guard.lock();

        while !self.state.load(Ordering::Acquire) {
            if self.cv.wait_until(&mut guard, deadline).timed_out() {
                return self.state.load(Ordering::Acquire);
            }
        }

        true
    }
}

/// Event whose `wait` consumes the signaled state
///
/// Exactly one waiter succeeds per `set`; the state flips back to false as the
/// waiter leaves. Spurious wakeups re-enter the wait loop.
pub struct AutoResetEvent {
    state: AtomicBool,
    guard: Mutex<()>,
    cv: Condvar,
}

impl AutoResetEvent {
    /// Create an event with the given initial state
    pub fn new(initial_state: bool) -> Self {
        Self {
            state: AtomicBool::new(initial_state),
            guard: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    /// Observe the current state without blocking or consuming
    #[inline]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }

    /// Signal the event, waking all waiters if the state flipped
    ///
    /// All waiters race to consume the state; one wins, the rest re-loop.
    pub fn set(&self) {
        let _guard = self.guard.lock();

        if !self.state.swap(true, Ordering::AcqRel) {
            self.cv.notify_all();
        }
    }

    /// Clear the state; never wakes anyone
    pub fn reset(&self) {
        let _guard = self.guard.lock();
        self.state.store(false, Ordering::Release);
    }

    /// Block until this waiter consumes a set state
    pub fn wait(&self) {
        let mut guard = self.guard.lock();

        while !self.state.swap(false, Ordering::AcqRel) {
            self.cv.wait(&mut guard);
        }
    }

    /// Block until consumed or until `rel_time` elapses.
    ///
    /// On timeout a last-chance consumption attempt decides the return value.
    pub fn wait_for(&self, rel_time: Duration) -> bool {
        self.wait_until(Instant::now() + rel_time)
    }

    /// Block until consumed or until the deadline passes
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut guard = self.guard.lock();

        while !self.state.swap(false, Ordering::AcqRel) {
            if self.cv.wait_until(&mut guard, deadline).timed_out() {
                return self.state.swap(false, Ordering::AcqRel);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_manual_event_does_not_consume() {
        let event = ManualResetEvent::new(false);
        assert!(!event.is_set());

        event.set();
        assert!(event.is_set());

        event.wait();
        event.wait();
        assert!(event.is_set());

        event.reset();
        assert!(!event.is_set());
    }

    #[test]
    fn test_auto_event_consumes_once() {
        let event = AutoResetEvent::new(false);

        event.set();
        event.wait();
        assert!(!event.is_set());

        // A second wait would block; the timed variant reports the miss.
        assert!(!event.wait_for(Duration::from_millis(5)));
    }

    #[test]
    fn test_manual_event_wakes_all_waiters() {
        let event = Arc::new(ManualResetEvent::new(false));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let event = event.clone();
                thread::spawn(move || {
                    event.wait();
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        event.set();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_auto_event_one_winner_per_set() {
        let event = Arc::new(AutoResetEvent::new(false));
        let winners = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let event = event.clone();
                let winners = winners.clone();
                thread::spawn(move || {
                    if event.wait_for(Duration::from_millis(200)) {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        event.set();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_timed_wait_reports_timeout() {
        let event = ManualResetEvent::new(false);
        assert!(!event.wait_for(Duration::from_millis(5)));

        event.set();
        assert!(event.wait_for(Duration::from_millis(5)));
        assert!(event.wait_until(Instant::now()));
    }

    #[test]
    fn test_reset_never_wakes() {
        let event = Arc::new(ManualResetEvent::new(false));
        let woke = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let waiter = {
            let event = event.clone();
            let woke = woke.clone();
            thread::spawn(move || {
                event.wait();
                woke.store(true, Ordering::Release);
            })
        };

        event.reset();
        thread::sleep(Duration::from_millis(30));
        assert!(!woke.load(Ordering::Acquire));

        event.set();
        waiter.join().unwrap();
        assert!(woke.load(Ordering::Acquire));
    }
}
