//! Indicator Engine
//!
//! Computes a requested set of indicators over an ordered bar series.
//! Pure and `Send + Sync`; every specifier is computed independently.

use super::math;
use super::outcome::{IndicatorOutcome, IndicatorReport, IndicatorValue};
use super::specifier::{
    BOLLINGER_WIDTH, BOLLINGER_WINDOW, IndicatorSpec, MACD_FAST, MACD_SIGNAL, MACD_SLOW,
    SpecifierError,
};
use crate::domain::market_data::PriceBar;

/// Indicator Engine - stateless indicator computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute every specifier over `bars` (ascending by time).
    ///
    /// Duplicate specifiers (ignoring case) are reported once.
    #[must_use]
    pub fn compute<S: AsRef<str>>(&self, bars: &[PriceBar], specifiers: &[S]) -> IndicatorReport {
        let series = Series::from_bars(bars);
        let mut report = IndicatorReport::new();

        for raw in specifiers {
            let raw = raw.as_ref();
            if report.get(raw).is_some() {
                continue;
            }
            let outcome = compute_one(&series, raw);
            if let IndicatorOutcome::Error { message } = &outcome {
                tracing::warn!(indicator = %raw, error = %message, "Failed to compute indicator");
            }
            report.insert(raw.trim(), outcome);
        }

        report
    }
}

/// Column view of a bar series.
struct Series {
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl Series {
    fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            volume: bars.iter().map(|b| b.volume).collect(),
        }
    }

    fn len(&self) -> usize {
        self.close.len()
    }
}

fn compute_one(series: &Series, raw: &str) -> IndicatorOutcome {
    let spec = match IndicatorSpec::parse(raw) {
        Ok(spec) => spec,
        Err(SpecifierError::Unrecognized) => return IndicatorOutcome::Unrecognized,
        Err(SpecifierError::Malformed(message)) => return IndicatorOutcome::Error { message },
    };

    let required = spec.required_bars();
    if series.len() < required {
        return IndicatorOutcome::InsufficientData {
            required,
            available: series.len(),
        };
    }

    let Some(value) = evaluate(spec, series) else {
        return IndicatorOutcome::Error {
            message: format!("{spec} could not be computed"),
        };
    };
    let value = round(value);
    if !value.is_finite() {
        return IndicatorOutcome::Error {
            message: format!("{spec} produced a non-finite result"),
        };
    }

    IndicatorOutcome::Value { value }
}

fn evaluate(spec: IndicatorSpec, series: &Series) -> Option<IndicatorValue> {
    let close = &series.close;
    let value = match spec {
        IndicatorSpec::Sma(n) => IndicatorValue::Scalar(math::sma(close, n)?),
        IndicatorSpec::Ema(n) => IndicatorValue::Scalar(math::ema(close, n)?),
        IndicatorSpec::Wma(n) => IndicatorValue::Scalar(math::wma(close, n)?),
        IndicatorSpec::Rsi(n) => IndicatorValue::Scalar(math::rsi(close, n)?),
        IndicatorSpec::VolumeSma(n) => IndicatorValue::Scalar(math::sma(&series.volume, n)?),
        IndicatorSpec::Atr(n) => {
            IndicatorValue::Scalar(math::atr(&series.high, &series.low, close, n)?)
        }
        IndicatorSpec::Macd => {
            let point = math::macd(close, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;
            IndicatorValue::Macd {
                line: point.line,
                signal: point.signal,
                histogram: point.histogram,
            }
        }
        IndicatorSpec::Bollinger => {
            let bands = math::bollinger(close, BOLLINGER_WINDOW, BOLLINGER_WIDTH)?;
            IndicatorValue::Bands {
                upper: bands.upper,
                mid: bands.mid,
                lower: bands.lower,
            }
        }
    };
    Some(value)
}

fn round(value: IndicatorValue) -> IndicatorValue {
    match value {
        IndicatorValue::Scalar(v) => IndicatorValue::Scalar(math::round3(v)),
        IndicatorValue::Macd {
            line,
            signal,
            histogram,
        } => IndicatorValue::Macd {
            line: math::round3(line),
            signal: math::round3(signal),
            histogram: math::round3(histogram),
        },
        IndicatorValue::Bands { upper, mid, lower } => IndicatorValue::Bands {
            upper: math::round3(upper),
            mid: math::round3(mid),
            lower: math::round3(lower),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Deterministic oscillating series.
    fn bars(count: usize) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    close - 0.5,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000.0 + i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn rsi_is_bounded() {
        let report = IndicatorEngine::new().compute(&bars(50), &["RSI_14"]);
        let value = report.get("RSI_14").unwrap().value().unwrap().as_scalar().unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn bollinger_bands_are_ordered() {
        let report = IndicatorEngine::new().compute(&bars(50), &["BOLL"]);
        let Some(IndicatorValue::Bands { upper, mid, lower }) = report.get("BOLL").unwrap().value()
        else {
            panic!("expected bands");
        };
        assert!(upper >= mid && mid >= lower);
    }

    #[test]
    fn window_longer_than_series_is_insufficient() {
        let report = IndicatorEngine::new().compute(&bars(50), &["SMA_500"]);
        assert_eq!(
            report.get("SMA_500"),
            Some(&IndicatorOutcome::InsufficientData {
                required: 500,
                available: 50
            })
        );
    }

    #[test]
    fn unknown_specifier_does_not_affect_others() {
        let report = IndicatorEngine::new().compute(&bars(50), &["UNKNOWN_X", "SMA_20"]);
        assert_eq!(report.get("UNKNOWN_X"), Some(&IndicatorOutcome::Unrecognized));
        assert!(report.get("SMA_20").unwrap().is_value());
    }

    #[test]
    fn malformed_parameter_is_error() {
        let report = IndicatorEngine::new().compute(&bars(50), &["EMA_abc", "EMA_10"]);
        assert!(matches!(
            report.get("EMA_abc"),
            Some(IndicatorOutcome::Error { .. })
        ));
        assert!(report.get("EMA_10").unwrap().is_value());
    }

    #[test]
    fn non_finite_input_is_error() {
        let mut series = bars(30);
        series[29].close = f64::NAN;
        let report = IndicatorEngine::new().compute(&series, &["SMA_5"]);
        assert!(matches!(
            report.get("SMA_5"),
            Some(IndicatorOutcome::Error { .. })
        ));
    }

    #[test]
    fn huge_values_stay_finite_numbers() {
        let mut series = bars(5);
        for bar in &mut series {
            bar.volume = 1e307;
        }
        let report = IndicatorEngine::new().compute(&series, &["VOL_SMA_5", "SMA_5"]);
        let volume = report
            .get("VOL_SMA_5")
            .unwrap()
            .value()
            .unwrap()
            .as_scalar()
            .unwrap();
        assert!(volume.is_finite());
        assert!((volume / 1e307 - 1.0).abs() < 1e-9);
        assert!(report.get("SMA_5").unwrap().is_value());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["VOL_SMA_5"]["status"], "VALUE");
        assert!(json["VOL_SMA_5"]["value"].is_number());
    }

    #[test]
    fn values_are_rounded_to_three_digits() {
        let report = IndicatorEngine::new().compute(&bars(60), &["SMA_7", "MACD", "ATR", "VOL_SMA_5"]);
        for entry in report.entries() {
            let values: Vec<f64> = match entry.outcome.value().unwrap() {
                IndicatorValue::Scalar(v) => vec![*v],
                IndicatorValue::Macd {
                    line,
                    signal,
                    histogram,
                } => vec![*line, *signal, *histogram],
                IndicatorValue::Bands { upper, mid, lower } => vec![*upper, *mid, *lower],
            };
            for v in values {
                assert_eq!(math::round3(v), v, "{} not rounded", entry.specifier);
            }
        }
    }

    #[test]
    fn macd_boundary_at_34_bars() {
        let engine = IndicatorEngine::new();
        assert!(matches!(
            engine.compute(&bars(33), &["MACD"]).get("MACD"),
            Some(IndicatorOutcome::InsufficientData { required: 34, .. })
        ));
        assert!(engine.compute(&bars(34), &["MACD"]).get("MACD").unwrap().is_value());
    }

    #[test]
    fn duplicates_are_reported_once() {
        let report = IndicatorEngine::new().compute(&bars(30), &["SMA_5", "sma_5", "RSI"]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0].specifier, "SMA_5");
    }

    #[test]
    fn empty_series_marks_everything_insufficient() {
        let report = IndicatorEngine::new().compute(&[], &["RSI_14", "MACD", "NOPE"]);
        assert!(matches!(
            report.get("RSI_14"),
            Some(IndicatorOutcome::InsufficientData { available: 0, .. })
        ));
        assert_eq!(report.get("NOPE"), Some(&IndicatorOutcome::Unrecognized));
    }

    #[test]
    fn volume_sma_uses_volume() {
        let report = IndicatorEngine::new().compute(&bars(10), &["VOL_SMA_2"]);
        // Last two volumes are 1008 and 1009
        assert_eq!(
            report.get("VOL_SMA_2").unwrap().value().unwrap().as_scalar(),
            Some(1008.5)
        );
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IndicatorEngine>();
    }
}
