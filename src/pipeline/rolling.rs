//! Trailing-window statistics over optional samples
//!
//! The window always spans the last `window` rows; undefined samples occupy
//! a slot but do not count toward `min_periods`.

use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Rolling mean / sample standard deviation
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: usize,
    min_periods: usize,
    values: VecDeque<Option<f64>>,
}

impl RollingWindow {
    /// Create a window; sizes are clamped to at least 1 and
    /// `min_periods` to at most `window`
    pub fn new(window: usize, min_periods: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            min_periods: min_periods.clamp(1, window),
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a sample, evicting the oldest when full
    fn push(&mut self, value: Option<f64>) {
        self.values.push_back(value.filter(|v| v.is_finite()));
        if self.values.len() > self.window {
            self.values.pop_front();
        }
    }

    fn defined(&self) -> Option<Vec<f64>> {
        let data: Vec<f64> = self.values.iter().flatten().copied().collect();
        (data.len() >= self.min_periods).then_some(data)
    }

    /// Push and return `(mean, std_dev)` of the updated window
    pub fn update(&mut self, value: Option<f64>) -> (Option<f64>, Option<f64>) {
        self.push(value);
        match self.defined() {
            Some(data) => (finite(data.iter().mean()), finite(data.iter().std_dev())),
            None => (None, None),
        }
    }

    /// Rolling `(mean, std_dev)` for a whole series
    pub fn compute(
        window: usize,
        min_periods: usize,
        values: &[Option<f64>],
    ) -> Vec<(Option<f64>, Option<f64>)> {
        let mut rolling = Self::new(window, min_periods);
        values.iter().map(|&v| rolling.update(v)).collect()
    }
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}
