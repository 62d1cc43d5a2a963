//! Cosmetic fetch progress.
//!
//! The percentage only reflects wall-clock time spent waiting: it climbs in
//! fixed steps up to a ceiling and jumps to 100 once the fetch really
//! completes. It says nothing about how much of the fetch is actually done.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosmeticProgress {
    step: Duration,
    increment: u8,
    ceiling: u8,
}

impl Default for CosmeticProgress {
    fn default() -> Self {
        CosmeticProgress {
            step: Duration::from_millis(100),
            increment: 10,
            ceiling: 90,
        }
    }
}

impl CosmeticProgress {
    pub const COMPLETE: u8 = 100;

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Percentage to show after `elapsed` of waiting.
    pub fn percent_at(&self, elapsed: Duration) -> u8 {
        let steps = elapsed.as_millis() / self.step.as_millis().max(1);
        let percent = steps.saturating_mul(u128::from(self.increment));
        percent.min(u128::from(self.ceiling)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climbs_in_steps_and_stops_at_ceiling() {
        let progress = CosmeticProgress::default();
        assert_eq!(progress.percent_at(Duration::ZERO), 0);
        assert_eq!(progress.percent_at(Duration::from_millis(99)), 0);
        assert_eq!(progress.percent_at(Duration::from_millis(100)), 10);
        assert_eq!(progress.percent_at(Duration::from_millis(450)), 40);
        assert_eq!(progress.percent_at(Duration::from_secs(1)), 90);
        assert_eq!(progress.percent_at(Duration::from_secs(60)), 90);
    }

    #[test]
    fn never_decreases() {
        let progress = CosmeticProgress::default();
        let mut last = 0;
        for ms in (0..2_000).step_by(37) {
            let now = progress.percent_at(Duration::from_millis(ms));
            assert!(now >= last);
            last = now;
        }
    }
}
