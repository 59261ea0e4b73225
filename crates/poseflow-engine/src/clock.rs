//! Clock implementations for the PoseFlow engine
//!
//! The engine takes `now` as an argument on every tick. Hosts get it from
//! a `Clock`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use poseflow_core::Timestamp;

/// Source of tick timestamps.
/// INVARIANT: successive `now()` values never decrease
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall clock backed by `Instant`, zero at construction
pub struct MonotonicClock {
    reference: Instant,
    offset: Timestamp,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::starting_at(Timestamp::ZERO)
    }

    /// Clock whose first reading is `offset`
    pub fn starting_at(offset: Timestamp) -> Self {
        MonotonicClock {
            reference: Instant::now(),
            offset,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.reference.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.offset.saturating_add(self.reference.elapsed())
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep a
/// handle while a session owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    value: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(t: Timestamp) -> Self {
        let clock = Self::new();
        clock.value.set(t);
        clock
    }

    /// Move to `t`. Earlier values are ignored.
    pub fn set(&self, t: Timestamp) {
        if t > self.value.get() {
            self.value.set(t);
        }
    }

    pub fn advance(&self, dt: Duration) -> Timestamp {
        let next = self.value.get().saturating_add(dt);
        self.value.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::starting_at(Timestamp::from_millis(500));

        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();

        assert!(t1 >= Timestamp::from_millis(500));
        assert!(t2 > t1);
    }

    #[test]
    fn test_manual_clock_shared_handle() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), Timestamp::from_millis(250));

        // Never moves backwards
        handle.set(Timestamp::from_millis(100));
        assert_eq!(clock.now(), Timestamp::from_millis(250));

        handle.set(Timestamp::from_secs(2));
        assert_eq!((&clock).now(), Timestamp::from_secs(2));
    }
}
