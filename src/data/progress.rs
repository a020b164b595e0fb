//! Progress ratios, bar fill, and color levels.

/// Ratios below this are low progress.
pub const MID_PROGRESS_THRESHOLD: f64 = 0.5;

/// Ratios at or above this are complete.
pub const COMPLETE_THRESHOLD: f64 = 0.8;

/// Color level of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressLevel {
    Low,
    Mid,
    Complete,
}

impl ProgressLevel {
    /// Classify a ratio. The ratio is clamped to `[0, 1]` first; both
    /// thresholds are inclusive lower bounds.
    pub fn from_ratio(ratio: f64) -> Self {
        let ratio = clamp_ratio(ratio);
        if ratio >= COMPLETE_THRESHOLD {
            ProgressLevel::Complete
        } else if ratio >= MID_PROGRESS_THRESHOLD {
            ProgressLevel::Mid
        } else {
            ProgressLevel::Low
        }
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Produced/target pair for one category or for the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub produced: u64,
    pub target: u64,
}

impl Progress {
    pub fn new(produced: u64, target: u64) -> Self {
        Self { produced, target }
    }

    /// `produced / target`, unclamped. Zero when the target is zero.
    pub fn raw_ratio(&self) -> f64 {
        if self.target == 0 {
            0.0
        } else {
            self.produced as f64 / self.target as f64
        }
    }

    /// Ratio clamped to `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        clamp_ratio(self.raw_ratio())
    }

    pub fn level(&self) -> ProgressLevel {
        ProgressLevel::from_ratio(self.raw_ratio())
    }

    /// Number of filled blocks in a bar of `width` blocks.
    pub fn filled_blocks(&self, width: usize) -> usize {
        let filled = (self.ratio() * width as f64).floor() as usize;
        filled.min(width)
    }

    /// Whole percentage for the label. Not clamped, so over-target work
    /// reads above 100%.
    pub fn percent(&self) -> u64 {
        (self.raw_ratio() * 100.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(ProgressLevel::from_ratio(0.49999), ProgressLevel::Low);
        assert_eq!(ProgressLevel::from_ratio(0.5), ProgressLevel::Mid);
        assert_eq!(ProgressLevel::from_ratio(0.79999), ProgressLevel::Mid);
        assert_eq!(ProgressLevel::from_ratio(0.8), ProgressLevel::Complete);
        assert_eq!(ProgressLevel::from_ratio(1.0), ProgressLevel::Complete);
    }

    #[test]
    fn test_boundaries_through_integer_counts() {
        assert_eq!(Progress::new(1, 2).level(), ProgressLevel::Mid);
        assert_eq!(Progress::new(4, 5).level(), ProgressLevel::Complete);
        assert_eq!(Progress::new(49_999, 100_000).level(), ProgressLevel::Low);
    }

    #[test]
    fn test_out_of_range_ratios_are_clamped() {
        assert_eq!(ProgressLevel::from_ratio(-0.4), ProgressLevel::Low);
        assert_eq!(ProgressLevel::from_ratio(3.0), ProgressLevel::Complete);
        assert_eq!(ProgressLevel::from_ratio(f64::NAN), ProgressLevel::Low);
    }

    #[test]
    fn test_zero_target_is_an_empty_bar() {
        let p = Progress::new(0, 0);
        assert_eq!(p.ratio(), 0.0);
        assert_eq!(p.filled_blocks(25), 0);
        assert_eq!(p.percent(), 0);
        assert_eq!(p.level(), ProgressLevel::Low);

        // Produced items without any target still do not divide by zero
        assert_eq!(Progress::new(3, 0).filled_blocks(25), 0);
    }

    #[test]
    fn test_filled_blocks_floor() {
        assert_eq!(Progress::new(5, 10).filled_blocks(25), 12);
        assert_eq!(Progress::new(3, 3).filled_blocks(25), 25);
        assert_eq!(Progress::new(1, 3).filled_blocks(25), 8);
    }

    #[test]
    fn test_over_target_caps_bar_but_not_percent() {
        let p = Progress::new(12, 10);
        assert_eq!(p.filled_blocks(25), 25);
        assert_eq!(p.percent(), 120);
        assert_eq!(p.level(), ProgressLevel::Complete);
    }
}
