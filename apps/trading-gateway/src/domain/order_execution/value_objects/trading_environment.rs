//! Trading environment (simulated or real money).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Environment every trade-channel call is tagged with.
///
/// Fixed from configuration for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingEnvironment {
    /// Paper trading.
    #[default]
    Simulated,
    /// Real money.
    Real,
}

impl TradingEnvironment {
    /// Returns true for the real-money environment.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        matches!(self, Self::Real)
    }

    /// Configuration spelling ("paper" or "live").
    #[must_use]
    pub const fn config_label(&self) -> &'static str {
        match self {
            Self::Simulated => "paper",
            Self::Real => "live",
        }
    }
}

impl FromStr for TradingEnvironment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paper" | "simulate" | "simulated" => Ok(Self::Simulated),
            "live" | "real" => Ok(Self::Real),
            other => Err(DomainError::invalid(
                "environment",
                format!("expected 'paper' or 'live', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for TradingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "SIMULATED"),
            Self::Real => write!(f, "REAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("paper", TradingEnvironment::Simulated)]
    #[test_case("PAPER", TradingEnvironment::Simulated)]
    #[test_case("simulate", TradingEnvironment::Simulated)]
    #[test_case("live", TradingEnvironment::Real)]
    #[test_case(" Real ", TradingEnvironment::Real)]
    fn parse(raw: &str, expected: TradingEnvironment) {
        assert_eq!(raw.parse::<TradingEnvironment>().unwrap(), expected);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("sandbox".parse::<TradingEnvironment>().is_err());
    }

    #[test]
    fn default_is_simulated() {
        assert_eq!(TradingEnvironment::default(), TradingEnvironment::Simulated);
        assert!(!TradingEnvironment::default().is_real());
    }

    #[test]
    fn config_label_round_trips() {
        for env in [TradingEnvironment::Simulated, TradingEnvironment::Real] {
            assert_eq!(env.config_label().parse::<TradingEnvironment>().unwrap(), env);
        }
    }
}
