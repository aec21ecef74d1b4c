//! Walk-forward window generation.
//!
//! Generates fixed-length training windows over row indices, each followed by
//! the single row it is used to forecast.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A single walk-forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Step number (0-indexed).
    pub step: usize,
    /// First training row.
    pub train_start: usize,
    /// Last training row (inclusive).
    pub train_end: usize,
    /// Row being forecast, always `train_end + 1`.
    pub target: usize,
}

impl Window {
    /// Training rows as a slice range.
    pub fn train_range(&self) -> Range<usize> {
        self.train_start..self.train_end + 1
    }

    /// Number of training rows.
    pub fn len(&self) -> usize {
        self.train_end + 1 - self.train_start
    }

    /// Number of (t, t+1) regression pairs inside the window.
    pub fn pairs(&self) -> usize {
        self.len() - 1
    }
}

/// Generator for walk-forward windows.
pub struct WalkForwardWindows {
    window_size: usize,
    n_rows: usize,
}

impl WalkForwardWindows {
    pub fn new(window_size: usize, n_rows: usize) -> Self {
        Self {
            window_size,
            n_rows,
        }
    }

    /// Generate all windows, advancing one row per step.
    pub fn generate(&self) -> Vec<Window> {
        if self.window_size == 0 {
            return Vec::new();
        }

        (self.window_size..self.n_rows)
            .enumerate()
            .map(|(step, target)| Window {
                step,
                train_start: target - self.window_size,
                train_end: target - 1,
                target,
            })
            .collect()
    }

    /// Number of windows `generate` will produce.
    pub fn expected_windows(&self) -> usize {
        if self.window_size == 0 {
            return 0;
        }
        self.n_rows.saturating_sub(self.window_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_generation() {
        let windows = WalkForwardWindows::new(3, 7).generate();

        assert_eq!(windows.len(), 4);
        assert_eq!(
            windows[0],
            Window {
                step: 0,
                train_start: 0,
                train_end: 2,
                target: 3,
            }
        );
        assert_eq!(windows[3].target, 6);
        assert_eq!(windows[3].train_range(), 3..6);
    }

    #[test]
    fn test_window_pairs() {
        let windows = WalkForwardWindows::new(6, 10).generate();
        assert!(windows.iter().all(|w| w.len() == 6 && w.pairs() == 5));
    }

    #[test]
    fn test_expected_windows() {
        assert_eq!(WalkForwardWindows::new(6, 10).expected_windows(), 4);
        assert_eq!(WalkForwardWindows::new(6, 6).expected_windows(), 0);
        assert_eq!(WalkForwardWindows::new(6, 2).expected_windows(), 0);
        assert!(WalkForwardWindows::new(6, 2).generate().is_empty());
    }

    #[test]
    fn test_windows_advance_by_one() {
        let windows = WalkForwardWindows::new(4, 20).generate();
        for pair in windows.windows(2) {
            assert_eq!(pair[1].train_start, pair[0].train_start + 1);
            assert_eq!(pair[1].target, pair[0].target + 1);
        }
    }
}
