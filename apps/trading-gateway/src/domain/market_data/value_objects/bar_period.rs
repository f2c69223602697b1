//! Bar (candlestick) period.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Aggregation period of a price bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarPeriod {
    /// One minute.
    #[serde(rename = "1m")]
    OneMinute,
    /// Three minutes.
    #[serde(rename = "3m")]
    ThreeMinutes,
    /// Five minutes.
    #[serde(rename = "5m")]
    FiveMinutes,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// Sixty minutes.
    #[serde(rename = "60m")]
    SixtyMinutes,
    /// One trading day.
    #[serde(rename = "1d")]
    Day,
    /// One week.
    #[serde(rename = "1w")]
    Week,
    /// One month.
    #[serde(rename = "1M")]
    Month,
    /// One year.
    #[serde(rename = "1y")]
    Year,
}

impl BarPeriod {
    /// Every supported period, shortest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::OneMinute,
            Self::ThreeMinutes,
            Self::FiveMinutes,
            Self::FifteenMinutes,
            Self::ThirtyMinutes,
            Self::SixtyMinutes,
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Year,
        ]
    }

    /// Short label ("1m", "1d", "1M", ...).
    ///
    /// Minutes are lowercase `m`, months uppercase `M`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::SixtyMinutes => "60m",
            Self::Day => "1d",
            Self::Week => "1w",
            Self::Month => "1M",
            Self::Year => "1y",
        }
    }

    /// Returns true for intraday periods.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::OneMinute
                | Self::ThreeMinutes
                | Self::FiveMinutes
                | Self::FifteenMinutes
                | Self::ThirtyMinutes
                | Self::SixtyMinutes
        )
    }

    /// Lenient lookup used for caller-supplied analysis periods.
    ///
    /// Exact labels win, then a case-insensitive match (with "1h" as an
    /// alias of "60m"). Anything else falls back to [`BarPeriod::Day`].
    #[must_use]
    pub fn parse_or_daily(raw: &str) -> Self {
        raw.parse()
            .or_else(|_| raw.trim().to_lowercase().parse())
            .unwrap_or(Self::Day)
    }
}

impl FromStr for BarPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "1h" {
            return Ok(Self::SixtyMinutes);
        }
        Self::all()
            .iter()
            .copied()
            .find(|period| period.label() == trimmed)
            .ok_or_else(|| DomainError::invalid("period", format!("Unsupported bar period '{s}'")))
    }
}

impl fmt::Display for BarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1m", BarPeriod::OneMinute)]
    #[test_case("15m", BarPeriod::FifteenMinutes)]
    #[test_case("60m", BarPeriod::SixtyMinutes)]
    #[test_case("1h", BarPeriod::SixtyMinutes)]
    #[test_case("1d", BarPeriod::Day)]
    #[test_case("1M", BarPeriod::Month)]
    #[test_case(" 1y ", BarPeriod::Year)]
    fn parse_exact(raw: &str, expected: BarPeriod) {
        assert_eq!(raw.parse::<BarPeriod>().unwrap(), expected);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("2d".parse::<BarPeriod>().is_err());
        assert!("1D".parse::<BarPeriod>().is_err());
    }

    #[test_case("1D", BarPeriod::Day ; "uppercase day")]
    #[test_case("1H", BarPeriod::SixtyMinutes ; "uppercase hour")]
    #[test_case("1M", BarPeriod::Month ; "month keeps case")]
    #[test_case("weekly", BarPeriod::Day ; "unknown falls back")]
    #[test_case("", BarPeriod::Day ; "empty falls back")]
    fn parse_or_daily(raw: &str, expected: BarPeriod) {
        assert_eq!(BarPeriod::parse_or_daily(raw), expected);
    }

    #[test]
    fn labels_round_trip() {
        for period in BarPeriod::all() {
            assert_eq!(period.label().parse::<BarPeriod>().unwrap(), *period);
        }
    }

    #[test]
    fn serde_uses_label() {
        assert_eq!(serde_json::to_string(&BarPeriod::Month).unwrap(), "\"1M\"");
        let parsed: BarPeriod = serde_json::from_str("\"5m\"").unwrap();
        assert_eq!(parsed, BarPeriod::FiveMinutes);
    }

    #[test]
    fn intraday_classification() {
        assert!(BarPeriod::SixtyMinutes.is_intraday());
        assert!(!BarPeriod::Day.is_intraday());
    }
}
