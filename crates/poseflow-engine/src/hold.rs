//! Hold timer - how long the expected pose has been held without a break

use std::time::Duration;

use poseflow_core::{ThresholdMode, Timestamp};

/// Result of feeding one sample to the hold timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldProgress {
    /// Threshold met on this tick
    pub holding: bool,
    /// This tick began a new hold
    pub started: bool,
    /// Hold time still needed
    pub remaining: Duration,
}

impl HoldProgress {
    #[inline]
    pub fn remaining_secs(&self) -> f64 {
        self.remaining.as_secs_f64()
    }

    /// Held on this tick with nothing left to wait for
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.holding && self.remaining.is_zero()
    }
}

/// Tracks a continuous hold. Any miss discards the accumulated time.
#[derive(Clone, Debug)]
pub struct HoldTimer {
    duration: Duration,
    started_at: Option<Timestamp>,
}

impl HoldTimer {
    pub fn new(duration: Duration) -> Self {
        HoldTimer {
            duration,
            started_at: None,
        }
    }

    /// Compare `confidence` to `threshold` and update
    pub fn on_sample(
        &mut self,
        confidence: f32,
        threshold: f32,
        mode: ThresholdMode,
        now: Timestamp,
    ) -> HoldProgress {
        self.update(mode.is_met(confidence, threshold), now)
    }

    /// Update with an already-made threshold decision
    pub fn update(&mut self, met: bool, now: Timestamp) -> HoldProgress {
        if !met {
            self.started_at = None;
            return HoldProgress {
                holding: false,
                started: false,
                remaining: self.duration,
            };
        }

        match self.started_at {
            None => {
                self.started_at = Some(now);
                HoldProgress {
                    holding: true,
                    started: true,
                    remaining: self.duration,
                }
            }
            Some(start) => HoldProgress {
                holding: true,
                started: false,
                remaining: self.duration.saturating_sub(now - start),
            },
        }
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Timestamp {
        Timestamp::from_secs(s)
    }

    #[test]
    fn test_hold_counts_down() {
        let mut timer = HoldTimer::new(Duration::from_secs(3));
        let mode = ThresholdMode::Inclusive;

        let p0 = timer.on_sample(0.9, 0.5, mode, secs(0));
        assert!(p0.started && p0.holding);
        assert_eq!(p0.remaining, Duration::from_secs(3));
        assert!(!p0.is_complete());

        let p2 = timer.on_sample(0.9, 0.5, mode, secs(2));
        assert!(!p2.started);
        assert_eq!(p2.remaining_secs(), 1.0);

        let p3 = timer.on_sample(0.9, 0.5, mode, secs(3));
        assert!(p3.is_complete());

        // Overshoot clamps to zero
        let p5 = timer.on_sample(0.9, 0.5, mode, secs(5));
        assert_eq!(p5.remaining, Duration::ZERO);
    }

    #[test]
    fn test_drop_resets() {
        let mut timer = HoldTimer::new(Duration::from_secs(3));
        let mode = ThresholdMode::Inclusive;

        timer.on_sample(0.9, 0.5, mode, secs(0));
        timer.on_sample(0.9, 0.5, mode, secs(2));
        let miss = timer.on_sample(0.3, 0.5, mode, secs(2));
        assert!(!miss.holding);
        assert!(timer.started_at().is_none());

        let again = timer.on_sample(0.9, 0.5, mode, secs(3));
        assert!(again.started);
        assert_eq!(again.remaining, Duration::from_secs(3));
        assert_eq!(timer.started_at(), Some(secs(3)));
    }

    #[test]
    fn test_threshold_tie_break() {
        let mut inclusive = HoldTimer::new(Duration::from_secs(1));
        assert!(inclusive.on_sample(0.5, 0.5, ThresholdMode::Inclusive, secs(0)).holding);

        let mut exclusive = HoldTimer::new(Duration::from_secs(1));
        assert!(!exclusive.on_sample(0.5, 0.5, ThresholdMode::Exclusive, secs(0)).holding);
    }

    #[test]
    fn test_clock_regression_does_not_complete() {
        let mut timer = HoldTimer::new(Duration::from_secs(2));
        timer.update(true, secs(10));

        let p = timer.update(true, secs(9));
        assert_eq!(p.remaining, Duration::from_secs(2));
        assert!(!p.is_complete());
    }
}
