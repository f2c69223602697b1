//! Per-specifier results.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A computed indicator value, rounded to three fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    /// Single number.
    Scalar(f64),
    /// MACD triple.
    Macd {
        /// Fast EMA minus slow EMA.
        #[serde(rename = "MACD_LINE")]
        line: f64,
        /// EMA of the line.
        #[serde(rename = "MACD_SIGNAL")]
        signal: f64,
        /// Line minus signal.
        #[serde(rename = "MACD_HIST")]
        histogram: f64,
    },
    /// Bollinger bands.
    Bands {
        /// Upper band.
        #[serde(rename = "BOLL_UPPER")]
        upper: f64,
        /// Middle band.
        #[serde(rename = "BOLL_MID")]
        mid: f64,
        /// Lower band.
        #[serde(rename = "BOLL_LOWER")]
        lower: f64,
    },
}

impl IndicatorValue {
    /// The scalar, if this is one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_finite(),
            Self::Macd {
                line,
                signal,
                histogram,
            } => line.is_finite() && signal.is_finite() && histogram.is_finite(),
            Self::Bands { upper, mid, lower } => {
                upper.is_finite() && mid.is_finite() && lower.is_finite()
            }
        }
    }
}

/// Result for one specifier. Failures never affect other specifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorOutcome {
    /// Computed.
    Value {
        /// The value.
        value: IndicatorValue,
    },
    /// Fewer bars than the indicator's window.
    InsufficientData {
        /// Bars the indicator needs.
        required: usize,
        /// Bars supplied.
        available: usize,
    },
    /// Unknown indicator family.
    Unrecognized,
    /// Malformed parameter or non-finite result.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl IndicatorOutcome {
    /// The value, if computed.
    #[must_use]
    pub const fn value(&self) -> Option<&IndicatorValue> {
        match self {
            Self::Value { value } => Some(value),
            _ => None,
        }
    }

    /// Returns true if computed.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}

/// One entry of an [`IndicatorReport`], keyed by the caller's spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEntry {
    /// Specifier as requested.
    pub specifier: String,
    /// Outcome.
    pub outcome: IndicatorOutcome,
}

/// Ordered specifier → outcome mapping.
///
/// Serializes as a JSON object in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorReport {
    entries: Vec<IndicatorEntry>,
}

impl IndicatorReport {
    /// Empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome unless the specifier is already present.
    ///
    /// Returns false for a duplicate.
    pub fn insert(&mut self, specifier: impl Into<String>, outcome: IndicatorOutcome) -> bool {
        let specifier = specifier.into();
        if self.get(&specifier).is_some() {
            return false;
        }
        self.entries.push(IndicatorEntry { specifier, outcome });
        true
    }

    /// Look up a specifier, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn get(&self, specifier: &str) -> Option<&IndicatorOutcome> {
        let wanted = specifier.trim();
        self.entries
            .iter()
            .find(|entry| entry.specifier.trim().eq_ignore_ascii_case(wanted))
            .map(|entry| &entry.outcome)
    }

    /// Entries in request order.
    #[must_use]
    pub fn entries(&self) -> &[IndicatorEntry] {
        &self.entries
    }

    /// Number of distinct specifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no specifier was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for IndicatorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.specifier, &entry.outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_skips_duplicates_case_insensitively() {
        let mut report = IndicatorReport::new();
        assert!(report.insert("SMA_20", IndicatorOutcome::Unrecognized));
        assert!(!report.insert("sma_20", IndicatorOutcome::Unrecognized));
        assert_eq!(report.len(), 1);
        assert!(report.get(" Sma_20 ").is_some());
    }

    #[test]
    fn finite_checks_every_component() {
        assert!(IndicatorValue::Scalar(1.0).is_finite());
        assert!(!IndicatorValue::Scalar(f64::NAN).is_finite());
        assert!(
            !IndicatorValue::Bands {
                upper: f64::INFINITY,
                mid: 1.0,
                lower: 0.0
            }
            .is_finite()
        );
    }

    #[test]
    fn report_serializes_as_ordered_object() {
        let mut report = IndicatorReport::new();
        report.insert(
            "RSI_14",
            IndicatorOutcome::Value {
                value: IndicatorValue::Scalar(55.5),
            },
        );
        report.insert(
            "MACD",
            IndicatorOutcome::Value {
                value: IndicatorValue::Macd {
                    line: 1.0,
                    signal: 0.5,
                    histogram: 0.5,
                },
            },
        );
        report.insert("FOO", IndicatorOutcome::Unrecognized);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["RSI_14"]["status"], "VALUE");
        assert_eq!(json["RSI_14"]["value"], 55.5);
        assert_eq!(json["MACD"]["value"]["MACD_HIST"], 0.5);
        assert_eq!(json["FOO"]["status"], "UNRECOGNIZED");

        let text = serde_json::to_string(&report).unwrap();
        assert!(text.find("RSI_14").unwrap() < text.find("MACD").unwrap());
    }
}
