//! Per-series indicators: percentage change, rolling z-score, Wilder RSI

use super::rolling::RollingWindow;

/// Day-over-day change in percent
///
/// Undefined for the first sample and wherever either neighbour is undefined.
pub fn pct_change(rates: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(rates.len());
    let mut prev: Option<f64> = None;
    for &rate in rates {
        let change = match (prev, rate) {
            (Some(p), Some(r)) if p != 0.0 => Some((r - p) / p * 100.0),
            _ => None,
        };
        out.push(change.filter(|c| c.is_finite()));
        prev = rate;
    }
    out
}

/// Rolling z-score of each value against its trailing window
///
/// `None` when the value is undefined, fewer than `min_periods` values are
/// defined in the window, or the window deviation is zero.
pub fn rolling_zscore(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let mut rolling = RollingWindow::new(window, min_periods);
    values
        .iter()
        .map(|&value| {
            let (mean, sd) = rolling.update(value);
            match (value, mean, sd) {
                (Some(v), Some(m), Some(sd)) if sd > 0.0 => Some((v - m) / sd),
                _ => None,
            }
        })
        .collect()
}

/// Relative Strength Index with Wilder smoothing
///
/// Gains and losses are smoothed with a recursive exponential average,
/// `alpha = 1 / period`, seeded by the first price change. A value is
/// reported once `period` prices have been seen. Undefined prices are
/// skipped: they neither produce a value nor update the averages.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    period: usize,
    alpha: f64,
    prev: Option<f64>,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    samples: usize,
}

impl WilderRsi {
    /// Create new RSI with given period (typically 14)
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            alpha: 1.0 / period as f64,
            prev: None,
            avg_gain: None,
            avg_loss: None,
            samples: 0,
        }
    }

    /// Feed the next price
    pub fn update(&mut self, price: Option<f64>) -> Option<f64> {
        let price = price.filter(|p| p.is_finite())?;
        self.samples += 1;

        if let Some(prev) = self.prev {
            let delta = price - prev;
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            self.avg_gain = Some(self.smooth(self.avg_gain, gain));
            self.avg_loss = Some(self.smooth(self.avg_loss, loss));
        }
        self.prev = Some(price);

        if self.samples < self.period {
            return None;
        }
        self.current()
    }

    fn smooth(&self, avg: Option<f64>, x: f64) -> f64 {
        match avg {
            Some(avg) => (1.0 - self.alpha) * avg + self.alpha * x,
            None => x,
        }
    }

    /// RSI of the averages so far, ignoring the warm-up rule
    ///
    /// Zero average loss saturates at exactly 100.
    pub fn current(&self) -> Option<f64> {
        let (gain, loss) = (self.avg_gain?, self.avg_loss?);
        if loss == 0.0 {
            return Some(100.0);
        }
        let rs = gain / loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }

    /// RSI for a whole series
    pub fn compute(period: usize, prices: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut rsi = Self::new(period);
        prices.iter().map(|&p| rsi.update(p)).collect()
    }
}
