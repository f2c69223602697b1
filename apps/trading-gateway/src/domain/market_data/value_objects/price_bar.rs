//! OHLCV price bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Series are ordered ascending by `time`.
///
/// Bar values are `f64`: they only feed indicator math, never order sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time.
    pub time: DateTime<Utc>,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl PriceBar {
    /// Create a bar.
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_high_minus_low() {
        let bar = PriceBar::new(Utc::now(), 10.0, 12.5, 9.5, 11.0, 1000.0);
        assert!((bar.range() - 3.0).abs() < f64::EPSILON);
    }
}
