//! Per-move search time from the remaining overage time.
//!
//! A step function with no smoothing: every query is budgeted from the live
//! observation alone.

use serde::{Deserialize, Serialize};

/// One step of the budget: below `below` seconds remaining, search for
/// `movetime_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeTier {
    pub below: f64,
    pub movetime_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBudgetPolicy {
    /// Budget when no tier applies
    pub default_ms: u64,
    pub tiers: Vec<TimeTier>,
}

impl Default for TimeBudgetPolicy {
    fn default() -> Self {
        Self {
            default_ms: 175,
            tiers: vec![
                TimeTier {
                    below: 3.675,
                    movetime_ms: 175,
                },
                TimeTier {
                    below: 1.875,
                    movetime_ms: 90,
                },
                TimeTier {
                    below: 1.0,
                    movetime_ms: 75,
                },
            ],
        }
    }
}

impl TimeBudgetPolicy {
    /// Search time in milliseconds for `remaining_secs` of overage time left.
    ///
    /// The tightest tier whose threshold lies above `remaining_secs` wins.
    /// NaN counts as out of time.
    pub fn move_time_ms(&self, remaining_secs: f64) -> u64 {
        let tightest = self
            .tiers
            .iter()
            .filter(|t| remaining_secs.is_nan() || remaining_secs < t.below)
            .min_by(|a, b| a.below.total_cmp(&b.below));
        tightest.map_or(self.default_ms, |t| t.movetime_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_boundaries() {
        let policy = TimeBudgetPolicy::default();
        let cases = [
            (60.0, 175),
            (3.675, 175),
            (3.674, 175),
            (1.875, 175),
            (1.874, 90),
            (1.0, 90),
            (0.999, 75),
            (0.0, 75),
            (-2.5, 75),
        ];
        for (remaining, expected) in cases {
            assert_eq!(policy.move_time_ms(remaining), expected, "remaining={remaining}");
        }
    }

    #[test]
    fn nan_is_critical() {
        assert_eq!(TimeBudgetPolicy::default().move_time_ms(f64::NAN), 75);
    }

    #[test]
    fn tier_order_does_not_matter() {
        let mut policy = TimeBudgetPolicy::default();
        policy.tiers.reverse();
        assert_eq!(policy.move_time_ms(1.5), 90);
        assert_eq!(policy.move_time_ms(0.5), 75);
        assert_eq!(policy.move_time_ms(5.0), 175);
    }

    #[test]
    fn no_tiers_uses_default() {
        let policy = TimeBudgetPolicy {
            default_ms: 200,
            tiers: Vec::new(),
        };
        assert_eq!(policy.move_time_ms(0.1), 200);
        assert_eq!(policy.move_time_ms(f64::NAN), 200);
    }
}
