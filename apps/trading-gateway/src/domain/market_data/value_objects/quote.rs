//! Quote, market snapshot and the valuation figures it carries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Real-time quote for a subscribed symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol.
    pub symbol: Symbol,
    /// Last traded price.
    pub last_price: Decimal,
    /// Session open.
    pub open_price: Decimal,
    /// Session high.
    pub high_price: Decimal,
    /// Session low.
    pub low_price: Decimal,
    /// Previous close.
    pub prev_close_price: Decimal,
    /// Shares traded in the session.
    pub volume: u64,
    /// Turnover in quote currency.
    pub turnover: Decimal,
    /// Board lot size (shares per lot). Zero if unknown.
    pub lot_size: u32,
    /// Quote timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Change versus previous close, as a fraction.
    #[must_use]
    pub fn change_ratio(&self) -> Option<Decimal> {
        if self.prev_close_price.is_zero() {
            return None;
        }
        Some((self.last_price - self.prev_close_price) / self.prev_close_price)
    }
}

/// Point-in-time snapshot; requires no subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol.
    pub symbol: Symbol,
    /// Last traded price.
    pub last_price: Decimal,
    /// Previous close.
    pub prev_close_price: Decimal,
    /// Shares traded in the session.
    pub volume: u64,
    /// Turnover in quote currency.
    pub turnover: Decimal,
    /// Board lot size.
    pub lot_size: u32,
    /// Trading suspended.
    pub suspended: bool,
    /// Valuation ratios, where the daemon has them.
    #[serde(flatten)]
    pub valuation: Valuation,
    /// Snapshot timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Fundamental figures of this snapshot.
    #[must_use]
    pub fn financials(&self) -> Financials {
        Financials {
            symbol: self.symbol.clone(),
            last_price: self.last_price,
            valuation: self.valuation,
        }
    }
}

/// Valuation ratios published with a snapshot. Absent for instruments
/// without earnings or book value (funds, warrants, loss-making issuers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Price over trailing twelve-month earnings.
    pub pe_ttm: Option<Decimal>,
    /// Price over last fiscal year earnings.
    pub pe_lyr: Option<Decimal>,
    /// Price over book value.
    pub pb_ratio: Option<Decimal>,
    /// Total market capitalization.
    pub total_market_value: Option<Decimal>,
}

/// Fundamental data for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    /// Symbol.
    pub symbol: Symbol,
    /// Last traded price.
    pub last_price: Decimal,
    /// Valuation ratios.
    #[serde(flatten)]
    pub valuation: Valuation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(last: Decimal, prev: Decimal) -> Quote {
        Quote {
            symbol: Symbol::normalize("00700", "HK").unwrap(),
            last_price: last,
            open_price: prev,
            high_price: last,
            low_price: prev,
            prev_close_price: prev,
            volume: 1_000,
            turnover: dec!(400000),
            lot_size: 100,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn change_ratio_against_prev_close() {
        assert_eq!(quote(dec!(110), dec!(100)).change_ratio(), Some(dec!(0.1)));
    }

    #[test]
    fn change_ratio_none_without_prev_close() {
        assert_eq!(quote(dec!(110), Decimal::ZERO).change_ratio(), None);
    }

    #[test]
    fn financials_flatten_valuation() {
        let snapshot = MarketSnapshot {
            symbol: Symbol::normalize("00700", "HK").unwrap(),
            last_price: dec!(400),
            prev_close_price: dec!(395),
            volume: 1_000,
            turnover: dec!(400000),
            lot_size: 100,
            suspended: false,
            valuation: Valuation {
                pe_ttm: Some(dec!(18.5)),
                pe_lyr: None,
                pb_ratio: Some(dec!(3.2)),
                total_market_value: Some(dec!(3800000000000)),
            },
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(snapshot.financials()).unwrap();
        assert_eq!(json["symbol"], "HK.00700");
        assert_eq!(json["pe_ttm"], "18.5");
        assert!(json["pe_lyr"].is_null());
        assert_eq!(json["pb_ratio"], "3.2");
    }
}
