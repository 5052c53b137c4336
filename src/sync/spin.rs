//! Busy-wait locks
//!
//! `SpinLock` is a single-bit test-and-set lock used to arbitrate the very
//! short critical sections on the lock-free ring's overrun path. `SharedSpinLock`
//! adds a reader/writer state machine on a single signed counter.
//!
//! Both locks busy-wait and never yield to the scheduler. Neither promises
//! fairness or starvation freedom; keep the critical sections tiny.

use std::sync::atomic::{ AtomicBool, AtomicI32, Ordering };

/// Busy-wait mutual exclusion on a single atomic bit
pub struct SpinLock {
    locked: AtomicBool,
}

/// RAII guard for [`SpinLock`]; releases on drop
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl SpinLock {
    /// Create an unlocked spin lock
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Busy-wait until the lock is acquired
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_> {
        while
            self.locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
        {
            std::hint::spin_loop();
        }

        SpinGuard { lock: self }
    }

    /// Acquire the lock only if it is free right now
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        if
            self.locked
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

/// Reader/writer busy-wait lock on a single signed counter
///
/// State: `0` idle, `n > 0` means `n` readers, `-1` means one writer.
/// Writers busy-wait while any reader is present.
pub struct SharedSpinLock {
    state: AtomicI32,
}

/// Shared (reader) guard for [`SharedSpinLock`]
pub struct SharedSpinReadGuard<'a> {
    lock: &'a SharedSpinLock,
}

/// Exclusive (writer) guard for [`SharedSpinLock`]
pub struct SharedSpinWriteGuard<'a> {
    lock: &'a SharedSpinLock,
}

const WRITER: i32 = -1;
const IDLE: i32 = 0;

impl SharedSpinLock {
    /// Create an idle lock
    pub const fn new() -> Self {
        Self {
            state: AtomicI32::new(IDLE),
        }
    }

    /// Busy-wait for shared access
    pub fn read(&self) -> SharedSpinReadGuard<'_> {
        let mut observed = self.state.load(Ordering::Relaxed);

        loop {
            // While a writer holds the lock, retry from idle.
            if observed == WRITER {
                std::hint::spin_loop();
                observed = IDLE;
            }

            match
                self.state.compare_exchange_weak(
                    observed,
                    observed + 1,
                    Ordering::Acquire,
                    Ordering::Relaxed
                )
            {
                Ok(_) => {
                    return SharedSpinReadGuard { lock: self };
                }
                Err(current) => {
                    observed = current;
                }
            }
        }
    }

    /// Acquire shared access only if no writer is present
    pub fn try_read(&self) -> Option<SharedSpinReadGuard<'_>> {
        let mut observed = self.state.load(Ordering::Relaxed);

        loop {
            if observed == WRITER {
                return None;
            }

            match
                self.state.compare_exchange(
                    observed,
                    observed + 1,
                    Ordering::Acquire,
                    Ordering::Relaxed
                )
            {
                Ok(_) => {
                    return Some(SharedSpinReadGuard { lock: self });
                }
                Err(current) => {
                    observed = current;
                }
            }
        }
    }

    /// Busy-wait for exclusive access; starves while readers are present
    pub fn write(&self) -> SharedSpinWriteGuard<'_> {
        while
            self.state
                .compare_exchange_weak(IDLE, WRITER, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
        {
            std::hint::spin_loop();
        }

        SharedSpinWriteGuard { lock: self }
    }

    /// Acquire exclusive access only if the lock is idle right now
    pub fn try_write(&self) -> Option<SharedSpinWriteGuard<'_>> {
        if
            self.state
                .compare_exchange(IDLE, WRITER, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        {
            Some(SharedSpinWriteGuard { lock: self })
        } else {
            None
        }
    }
}

impl Default for SharedSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SharedSpinReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.state.fetch_sub(1, Ordering::Release);
    }
}

impl Drop for SharedSpinWriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.state.store(IDLE, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_spin_lock_mutual_exclusion() {
        let lock = Arc::new(SpinLock::new());
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let _guard = lock.lock();
                        let v = counter.load(Ordering::Relaxed);
                        counter.store(v + 1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::Relaxed), 4000);
    }

    #[test]
    fn test_spin_lock_try_lock() {
        let lock = SpinLock::new();

        let guard = lock.try_lock();
        assert!(guard.is_some());
        assert!(lock.try_lock().is_none());

        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_shared_lock_many_readers() {
        let lock = SharedSpinLock::new();

        let r1 = lock.try_read();
        let r2 = lock.try_read();
        assert!(r1.is_some());
        assert!(r2.is_some());

        // A writer cannot enter while readers are present.
        assert!(lock.try_write().is_none());

        drop(r1);
        drop(r2);
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn test_shared_lock_writer_excludes_readers() {
        let lock = SharedSpinLock::new();

        let w = lock.try_write();
        assert!(w.is_some());
        assert!(lock.try_read().is_none());
        assert!(lock.try_write().is_none());

        drop(w);
        assert!(lock.try_read().is_some());
    }
}
