//! Listed option contracts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Symbol;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// One contract of an option chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Contract symbol.
    pub symbol: Symbol,
    /// Underlying security.
    pub underlying: Symbol,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike_price: Decimal,
    /// Last trading day.
    pub expiry: NaiveDate,
    /// Shares per contract.
    pub lot_size: u32,
}

impl OptionContract {
    /// Returns true if the contract expires within `[start, end]`.
    #[must_use]
    pub fn expires_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        (start..=end).contains(&self.expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn contract(expiry: NaiveDate) -> OptionContract {
        OptionContract {
            symbol: Symbol::normalize("HK.TCH261127C400000", "HK").unwrap(),
            underlying: Symbol::normalize("00700", "HK").unwrap(),
            option_type: OptionType::Call,
            strike_price: dec!(400),
            expiry,
            lot_size: 100,
        }
    }

    #[test]
    fn expiry_range_is_inclusive() {
        let option = contract(date(27));
        assert!(option.expires_within(date(27), date(27)));
        assert!(option.expires_within(date(1), date(30)));
        assert!(!option.expires_within(date(1), date(26)));
    }

    #[test]
    fn contract_serializes_expiry_as_date() {
        let json = serde_json::to_value(contract(date(27))).unwrap();
        assert_eq!(json["expiry"], "2026-11-27");
        assert_eq!(json["option_type"], "CALL");
    }
}
