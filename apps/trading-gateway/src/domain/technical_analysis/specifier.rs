//! Indicator specifiers ("SMA_20", "RSI", "MACD", ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default RSI window.
pub const DEFAULT_RSI_WINDOW: usize = 14;
/// Default ATR window.
pub const DEFAULT_ATR_WINDOW: usize = 14;
/// MACD fast EMA window.
pub const MACD_FAST: usize = 12;
/// MACD slow EMA window.
pub const MACD_SLOW: usize = 26;
/// MACD signal EMA window.
pub const MACD_SIGNAL: usize = 9;
/// Bollinger band window.
pub const BOLLINGER_WINDOW: usize = 20;
/// Bollinger band width in standard deviations.
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// A parsed indicator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorSpec {
    /// Simple moving average of close.
    Sma(usize),
    /// Exponential moving average of close.
    Ema(usize),
    /// Linearly weighted moving average of close.
    Wma(usize),
    /// Relative strength index of close.
    Rsi(usize),
    /// MACD 12/26/9 of close.
    Macd,
    /// Bollinger bands 20, ±2σ of close.
    Bollinger,
    /// Average true range.
    Atr(usize),
    /// Simple moving average of volume.
    VolumeSma(usize),
}

/// Why a specifier could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    /// No such indicator family.
    Unrecognized,
    /// Known family, bad parameter.
    Malformed(String),
}

impl IndicatorSpec {
    /// Parse a specifier, case-insensitively.
    ///
    /// # Errors
    ///
    /// `SpecifierError::Unrecognized` for unknown families,
    /// `SpecifierError::Malformed` for a non-numeric or zero window.
    pub fn parse(raw: &str) -> Result<Self, SpecifierError> {
        let upper = raw.trim().to_uppercase();

        match upper.as_str() {
            "MACD" => return Ok(Self::Macd),
            "BOLL" | "BBANDS" => return Ok(Self::Bollinger),
            "RSI" => return Ok(Self::Rsi(DEFAULT_RSI_WINDOW)),
            "ATR" => return Ok(Self::Atr(DEFAULT_ATR_WINDOW)),
            _ => {}
        }

        let (family, param) = match upper.strip_prefix("VOL_SMA_") {
            Some(param) => ("VOL_SMA", param),
            None => upper.split_once('_').ok_or(SpecifierError::Unrecognized)?,
        };

        let build: fn(usize) -> Self = match family {
            "SMA" => Self::Sma,
            "EMA" => Self::Ema,
            "WMA" => Self::Wma,
            "RSI" => Self::Rsi,
            "ATR" => Self::Atr,
            "VOL_SMA" => Self::VolumeSma,
            _ => return Err(SpecifierError::Unrecognized),
        };

        let window: usize = param.parse().map_err(|_| {
            SpecifierError::Malformed(format!("invalid window '{param}' in {upper}"))
        })?;
        if window == 0 {
            return Err(SpecifierError::Malformed(format!(
                "window must be positive in {upper}"
            )));
        }

        Ok(build(window))
    }

    /// Minimum number of bars before the indicator is reported.
    #[must_use]
    pub const fn required_bars(&self) -> usize {
        match self {
            Self::Sma(n) | Self::Ema(n) | Self::Wma(n) | Self::Atr(n) | Self::VolumeSma(n) => *n,
            // At least one price change
            Self::Rsi(n) => {
                if *n < 2 {
                    2
                } else {
                    *n
                }
            }
            Self::Macd => MACD_SLOW + MACD_SIGNAL - 1,
            Self::Bollinger => BOLLINGER_WINDOW,
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma(n) => write!(f, "SMA_{n}"),
            Self::Ema(n) => write!(f, "EMA_{n}"),
            Self::Wma(n) => write!(f, "WMA_{n}"),
            Self::Rsi(n) => write!(f, "RSI_{n}"),
            Self::Macd => write!(f, "MACD"),
            Self::Bollinger => write!(f, "BOLL"),
            Self::Atr(n) => write!(f, "ATR_{n}"),
            Self::VolumeSma(n) => write!(f, "VOL_SMA_{n}"),
        }
    }
}
