//! Thread rendezvous
//!
//! `Rendezvous` parks a known set of participants until the last one arrives,
//! then releases them all together. Unlike `std::sync::Barrier` the expected
//! thread count can change while the barrier is live, arrivals can give up on a
//! deadline, and the whole barrier can be terminated so that every present and
//! future `sync` returns false.
//!
//! Arrivals wait on a generation counter rather than a bare notification, so a
//! spurious wakeup or a late thread from a previous round can never slip
//! through an in-progress rendezvous.

use std::sync::atomic::{ AtomicBool, Ordering };
use std::time::{ Duration, Instant };

use parking_lot::{ Condvar, Mutex };

struct RendezvousState {
    n_threads: usize,
    n_involved: usize,
    generation: u64,
}

/// Reusable barrier for a configurable number of threads
pub struct Rendezvous {
    state: Mutex<RendezvousState>,
    cv: Condvar,
    terminated: AtomicBool,
}

impl Rendezvous {
    /// Create a barrier expecting `n_threads` participants per round
    pub fn new(n_threads: usize) -> Self {
        Self {
            state: Mutex::new(RendezvousState {
                n_threads,
                n_involved: 0,
                generation: 0,
            }),
            cv: Condvar::new(),
            terminated: AtomicBool::new(false),
        }
    }

    /// Number of participants expected per round
    pub fn thread_count(&self) -> usize {
        self.state.lock().n_threads
    }

    /// Change the expected participant count.
    ///
    /// If threads are already waiting and the new target is met, the round
    /// completes immediately.
    pub fn set_thread_count(&self, count: usize) {
        let mut state = self.state.lock();

        state.n_threads = count;
        self.release_if_complete(&mut state);
    }

    /// Grow the expected participant count by one
    pub fn register_thread(&self) {
        let mut state = self.state.lock();
        state.n_threads += 1;
    }

    /// Shrink the expected participant count by one, releasing the current
    /// round if the remaining waiters now satisfy it
    pub fn unregister_thread(&self) {
        let mut state = self.state.lock();

        state.n_threads = state.n_threads.saturating_sub(1);
        self.release_if_complete(&mut state);
    }

    /// Wake all waiters and make every subsequent `sync` return false
    pub fn terminate(&self) {
        let mut state = self.state.lock();

        self.terminated.store(true, Ordering::Release);
        state.n_involved = 0;
        self.cv.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Rendezvous with the other participants.
    ///
    /// Returns true if the round completed normally, false if the barrier was
    /// terminated or is mis-configured (zero expected threads).
    pub fn sync(&self) -> bool {
        let mut state = self.state.lock();

        if self.is_terminated() || state.n_threads == 0 {
            return false;
        }

        state.n_involved += 1;

        if state.n_involved >= state.n_threads {
            state.n_involved = 0;
            state.generation += 1;
            self.cv.notify_all();
        } else {
            let arrival_generation = state.generation;
            while state.generation == arrival_generation && !self.is_terminated() {
                self.cv.wait(&mut state);
            }
        }

        !self.is_terminated()
    }

    /// Timed [`sync`](Self::sync); a timed-out arrival withdraws itself so the
    /// round's headcount stays consistent
    pub fn sync_for(&self, rel_time: Duration) -> bool {
        self.sync_until(Instant::now() + rel_time)
    }

    pub fn sync_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();

        if self.is_terminated() || state.n_threads == 0 {
            return false;
        }

        state.n_involved += 1;

        if state.n_involved >= state.n_threads {
            state.n_involved = 0;
            state.generation += 1;
            self.cv.notify_all();
        } else {
            let arrival_generation = state.generation;
            while state.generation == arrival_generation && !self.is_terminated() {
                if self.cv.wait_until(&mut state, deadline).timed_out() {
                    if state.generation == arrival_generation {
                        state.n_involved -= 1;
                        return false;
                    }
                    break;
                }
            }
        }

        !self.is_terminated()
    }

    fn release_if_complete(&self, state: &mut RendezvousState) {
        if state.n_involved > 0 && state.n_involved >= state.n_threads {
            state.n_involved = 0;
            state.generation += 1;
            self.cv.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_all_threads_release_together() {
        let barrier = Arc::new(Rendezvous::new(3));
        let released = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let barrier = barrier.clone();
                let released = released.clone();
                thread::spawn(move || {
                    let ok = barrier.sync();
                    released.fetch_add(1, Ordering::Relaxed);
                    ok
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(released.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_none_release_before_all_arrive() {
        let barrier = Arc::new(Rendezvous::new(3));
        let released = Arc::new(AtomicUsize::new(0));

        let early: Vec<_> = (0..2)
            .map(|_| {
                let barrier = barrier.clone();
                let released = released.clone();
                thread::spawn(move || {
                    barrier.sync();
                    released.fetch_add(1, Ordering::Relaxed);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(30));
        assert_eq!(released.load(Ordering::Relaxed), 0);

        assert!(barrier.sync());

        for handle in early {
            handle.join().unwrap();
        }
        assert_eq!(released.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_barrier_is_reusable() {
        let barrier = Arc::new(Rendezvous::new(2));

        for _ in 0..5 {
            let other = {
                let barrier = barrier.clone();
                thread::spawn(move || barrier.sync())
            };

            assert!(barrier.sync());
            assert!(other.join().unwrap());
        }
    }

    #[test]
    fn test_timeout_withdraws_arrival() {
        let barrier = Arc::new(Rendezvous::new(2));

        assert!(!barrier.sync_for(Duration::from_millis(10)));

        // The timed-out arrival left no residue: a fresh pair still syncs.
        let other = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.sync())
        };
        assert!(barrier.sync());
        assert!(other.join().unwrap());
    }

    #[test]
    fn test_terminate_releases_and_disables() {
        let barrier = Arc::new(Rendezvous::new(2));

        let waiter = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.sync())
        };

        thread::sleep(Duration::from_millis(20));
        barrier.terminate();

        assert!(!waiter.join().unwrap());
        assert!(!barrier.sync());
        assert!(!barrier.sync_for(Duration::from_millis(5)));
    }

    #[test]
    fn test_unregister_releases_waiting_round() {
        let barrier = Arc::new(Rendezvous::new(2));

        let waiter = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.sync())
        };

        thread::sleep(Duration::from_millis(20));
        barrier.unregister_thread();

        assert!(waiter.join().unwrap());
        assert_eq!(barrier.thread_count(), 1);
    }

    #[test]
    fn test_zero_threads_is_misconfigured() {
        let barrier = Rendezvous::new(0);
        assert!(!barrier.sync());
    }
}
