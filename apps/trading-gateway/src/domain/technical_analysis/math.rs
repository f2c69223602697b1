//! Rolling indicator math over `f64` series.
//!
//! Every function returns the most recent value of the rolling
//! computation, or `None` if the series is shorter than the window.

/// Simple moving average of the last `window` values.
#[must_use]
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    let tail = tail(values, window)?;
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Recursive EMA series seeded at the first value, `alpha = 2 / (window + 1)`.
#[must_use]
pub fn ema_series(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut series = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return series;
    };
    let mut current = first;
    series.push(current);
    for &value in iter {
        current += alpha * (value - current);
        series.push(current);
    }
    series
}

/// Latest EMA once at least `window` values are available.
#[must_use]
pub fn ema(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    ema_series(values, window).last().copied()
}

/// Linearly weighted moving average; the newest value has weight `window`.
#[must_use]
pub fn wma(values: &[f64], window: usize) -> Option<f64> {
    let tail = tail(values, window)?;
    let weighted: f64 = tail
        .iter()
        .enumerate()
        .map(|(i, value)| (i + 1) as f64 * value)
        .sum();
    let weights = (window * (window + 1)) as f64 / 2.0;
    Some(weighted / weights)
}

/// Relative strength index with Wilder smoothing (`alpha = 1 / window`).
///
/// Averages are seeded with the first price change. Returns 100 when the
/// average loss is zero.
#[must_use]
pub fn rsi(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < 2 {
        return None;
    }
    let n = window as f64;
    let mut changes = values.windows(2).map(|pair| pair[1] - pair[0]);

    let first = changes.next()?;
    let mut avg_gain = first.max(0.0);
    let mut avg_loss = (-first).max(0.0);
    for change in changes {
        avg_gain += (change.max(0.0) - avg_gain) / n;
        avg_loss += ((-change).max(0.0) - avg_loss) / n;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal and histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    /// Fast EMA minus slow EMA.
    pub line: f64,
    /// EMA of the line.
    pub signal: f64,
    /// Line minus signal.
    pub histogram: f64,
}

/// MACD with the given fast/slow/signal windows.
///
/// The signal EMA starts at the bar where the slow window first fills.
#[must_use]
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdPoint> {
    if fast == 0 || slow == 0 || signal == 0 || values.len() < slow + signal - 1 {
        return None;
    }
    let fast_series = ema_series(values, fast);
    let slow_series = ema_series(values, slow);
    let line: Vec<f64> = fast_series
        .iter()
        .zip(&slow_series)
        .skip(slow - 1)
        .map(|(f, s)| f - s)
        .collect();

    let signal_value = *ema_series(&line, signal).last()?;
    let line_value = *line.last()?;
    Some(MacdPoint {
        line: line_value,
        signal: signal_value,
        histogram: line_value - signal_value,
    })
}

/// Upper, middle and lower Bollinger band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    /// Middle plus `width` standard deviations.
    pub upper: f64,
    /// Simple moving average.
    pub mid: f64,
    /// Middle minus `width` standard deviations.
    pub lower: f64,
}

/// Bollinger bands with population standard deviation.
#[must_use]
pub fn bollinger(values: &[f64], window: usize, width: f64) -> Option<Bands> {
    let tail = tail(values, window)?;
    let mid = tail.iter().sum::<f64>() / window as f64;
    let variance = tail.iter().map(|v| (v - mid).powi(2)).sum::<f64>() / window as f64;
    let deviation = variance.sqrt() * width;
    Some(Bands {
        upper: mid + deviation,
        mid,
        lower: mid - deviation,
    })
}

/// Average true range.
///
/// The first true range is `high - low`; the first ATR is the mean of the
/// first `window` true ranges, then Wilder smoothing.
#[must_use]
pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Option<f64> {
    let len = high.len().min(low.len()).min(close.len());
    if window == 0 || len < window {
        return None;
    }

    let true_ranges: Vec<f64> = (0..len)
        .map(|i| {
            let range = high[i] - low[i];
            if i == 0 {
                return range;
            }
            let prev_close = close[i - 1];
            range
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs())
        })
        .collect();

    let n = window as f64;
    let mut value = true_ranges[..window].iter().sum::<f64>() / n;
    for tr in &true_ranges[window..] {
        value = (value * (n - 1.0) + tr) / n;
    }
    Some(value)
}

/// Round to three fractional digits.
#[must_use]
pub fn round3(value: f64) -> f64 {
    let scaled = value * 1000.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 1000.0
}

fn tail(values: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(&values[values.len() - window..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sma_uses_last_window() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), Some(4.0));
        assert_eq!(sma(&[1.0, 2.0], 3), None);
        assert_eq!(sma(&[1.0], 0), None);
    }

    #[test]
    fn ema_seeded_at_first_value() {
        let series = ema_series(&[1.0, 2.0, 3.0], 3);
        assert_eq!(series, vec![1.0, 1.5, 2.25]);
        assert_eq!(ema(&[1.0, 2.0, 3.0], 3), Some(2.25));
        assert_eq!(ema(&[1.0, 2.0], 3), None);
        assert!(ema_series(&[], 3).is_empty());
    }

    #[test]
    fn wma_weights_newest_highest() {
        let value = wma(&[1.0, 2.0, 3.0], 3).unwrap();
        assert!(close_to(value, 14.0 / 6.0));
    }

    #[test]
    fn rsi_extremes() {
        let rising: Vec<f64> = (1..=20).map(f64::from).collect();
        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));
        assert_eq!(rsi(&falling, 14), Some(0.0));
        assert_eq!(rsi(&[1.0], 14), None);
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        // Seeds: gain 1, loss 0. After one Wilder step both averages are 0.5.
        let value = rsi(&[10.0, 11.0, 10.0], 2).unwrap();
        assert!(close_to(value, 50.0));
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let flat = vec![10.0; 40];
        let point = macd(&flat, 12, 26, 9).unwrap();
        assert!(close_to(point.line, 0.0));
        assert!(close_to(point.signal, 0.0));
        assert!(close_to(point.histogram, 0.0));
    }

    #[test]
    fn macd_needs_slow_plus_signal_bars() {
        let values: Vec<f64> = (0..33).map(f64::from).collect();
        assert!(macd(&values, 12, 26, 9).is_none());
        let values: Vec<f64> = (0..34).map(f64::from).collect();
        let point = macd(&values, 12, 26, 9).unwrap();
        // Fast EMA leads on a rising series
        assert!(point.line > 0.0);
    }

    #[test]
    fn bollinger_population_deviation() {
        let bands = bollinger(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8, 2.0).unwrap();
        assert!(close_to(bands.mid, 5.0));
        assert!(close_to(bands.upper, 9.0));
        assert!(close_to(bands.lower, 1.0));
    }

    #[test]
    fn atr_constant_range() {
        let high = vec![11.0; 20];
        let low = vec![9.0; 20];
        let close = vec![10.0; 20];
        assert_eq!(atr(&high, &low, &close, 14), Some(2.0));
    }

    #[test]
    fn atr_uses_gap_from_previous_close() {
        let high = [11.0, 21.0];
        let low = [9.0, 19.0];
        let close = [10.0, 20.0];
        // Second true range is |21 - 10| = 11
        assert_eq!(atr(&high, &low, &close, 2), Some(6.5));
    }

    #[test]
    fn round3_rounds_half_away_from_zero() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(-1.23449), -1.234);
    }

    #[test]
    fn round3_keeps_values_too_large_to_scale() {
        assert_eq!(round3(1e307), 1e307);
        assert_eq!(round3(-1e307), -1e307);
    }
}
