//! Transition timer - fixed countdown between a completed hold and the next pose

use std::time::Duration;

use poseflow_core::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionProgress {
    pub done: bool,
    /// Whole seconds left, rounded up
    pub remaining_secs: u32,
}

/// Purely time-driven; knows nothing about confidence
#[derive(Clone, Debug, Default)]
pub struct TransitionTimer {
    started_at: Option<Timestamp>,
}

impl TransitionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Timestamp) {
        self.started_at = Some(now);
    }

    /// Countdown at `now`. An unstarted timer reports the full duration.
    pub fn tick(&self, now: Timestamp, duration: Duration) -> TransitionProgress {
        let elapsed = match self.started_at {
            Some(start) => now - start,
            None => Duration::ZERO,
        };
        let remaining = duration.saturating_sub(elapsed).as_secs_f64().ceil() as u32;

        TransitionProgress {
            done: remaining == 0,
            remaining_secs: remaining,
        }
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_rounds_up() {
        let mut timer = TransitionTimer::new();
        let duration = Duration::from_secs(3);
        timer.start(Timestamp::from_secs(10));

        assert_eq!(timer.tick(Timestamp::from_secs(10), duration).remaining_secs, 3);
        assert_eq!(timer.tick(Timestamp::from_millis(10_100), duration).remaining_secs, 3);
        assert_eq!(timer.tick(Timestamp::from_millis(11_000), duration).remaining_secs, 2);
        assert_eq!(timer.tick(Timestamp::from_millis(12_999), duration).remaining_secs, 1);

        let end = timer.tick(Timestamp::from_secs(13), duration);
        assert!(end.done);
        assert_eq!(end.remaining_secs, 0);
    }

    #[test]
    fn test_zero_duration_is_done_immediately() {
        let mut timer = TransitionTimer::new();
        timer.start(Timestamp::from_secs(1));
        assert!(timer.tick(Timestamp::from_secs(1), Duration::ZERO).done);
    }

    #[test]
    fn test_unstarted_timer() {
        let timer = TransitionTimer::new();
        let p = timer.tick(Timestamp::from_secs(100), Duration::from_millis(1500));
        assert!(!p.done);
        assert_eq!(p.remaining_secs, 2);
        assert!(!timer.is_running());
    }
}
