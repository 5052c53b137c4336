use std::sync::atomic::{ AtomicIsize, AtomicUsize };

/// Cache-line padded atomic cursor to prevent false sharing.
///
/// The producer and consumer cursors of the lock-free rings are written from
/// different threads at high rates. Padding each cursor to a full cache line
/// (128 bytes covers adjacent-line prefetching on modern CPUs) keeps one side's
/// stores from invalidating the other side's line.
#[repr(align(128))]
pub struct PaddedCursor {
    pub index: AtomicUsize,
    _padding: [u8; 120], // 128 - 8 bytes for AtomicUsize
}

impl PaddedCursor {
    pub fn new(initial: usize) -> Self {
        Self {
            index: AtomicUsize::new(initial),
            _padding: [0; 120],
        }
    }
}

/// Cache-line padded signed occupancy counter.
///
/// Signed so that the overwriting rings can apply their lap-step adjustment
/// (`fetch_sub(step - 1)`) without wrap-around hazards when a racing consumer
/// decrement lands in between.
#[repr(align(128))]
pub struct PaddedCounter {
    pub count: AtomicIsize,
    _padding: [u8; 120], // 128 - 8 bytes for AtomicIsize
}

impl PaddedCounter {
    pub fn new(initial: isize) -> Self {
        Self {
            count: AtomicIsize::new(initial),
            _padding: [0; 120],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_is_cache_aligned() {
        assert_eq!(std::mem::align_of::<PaddedCursor>(), 128);
        assert!(std::mem::size_of::<PaddedCursor>() >= 128);
    }

    #[test]
    fn test_cursor_round_trip() {
        let cursor = PaddedCursor::new(7);
        assert_eq!(cursor.index.load(std::sync::atomic::Ordering::Relaxed), 7);
    }

    #[test]
    fn test_counter_is_cache_aligned() {
        assert_eq!(std::mem::align_of::<PaddedCounter>(), 128);
        let counter = PaddedCounter::new(-1);
        assert_eq!(counter.count.load(std::sync::atomic::Ordering::Relaxed), -1);
    }
}
