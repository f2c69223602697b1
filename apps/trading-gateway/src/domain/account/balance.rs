//! Account funds and holdings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order_execution::TradingEnvironment;
use crate::domain::shared::Symbol;

/// Margin risk level the daemon assigns to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// No margin exposure at all.
    AbsolutelySafe,
    /// Within margin requirements.
    #[default]
    Safe,
    /// Close to a margin call.
    Warning,
    /// Margin call in effect.
    Danger,
    /// Not reported for this account type.
    Unknown,
}

impl RiskLevel {
    /// Returns true if the account is at or past a margin call.
    #[must_use]
    pub const fn is_margin_call(&self) -> bool {
        matches!(self, Self::Danger)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsolutelySafe => write!(f, "ABSOLUTELY_SAFE"),
            Self::Safe => write!(f, "SAFE"),
            Self::Warning => write!(f, "WARNING"),
            Self::Danger => write!(f, "DANGER"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Account funds summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Settled cash.
    pub cash: Decimal,
    /// Buying power.
    pub power: Decimal,
    /// Total assets (cash plus market value).
    pub total_assets: Decimal,
    /// Total assets less liabilities.
    pub net_assets: Decimal,
    /// Market value of holdings.
    pub market_value: Decimal,
    /// Deficit to cover before the margin call is lifted. Zero when none.
    pub margin_call_margin: Decimal,
    /// Margin risk level.
    pub risk_level: RiskLevel,
    /// Account currency.
    pub currency: String,
    /// Environment the account belongs to.
    pub environment: TradingEnvironment,
}

impl AccountBalance {
    /// Margin view of these funds.
    #[must_use]
    pub fn margin_status(&self) -> MarginStatus {
        MarginStatus {
            risk_level: self.risk_level,
            margin_call_margin: self.margin_call_margin,
            total_assets: self.total_assets,
            net_assets: self.net_assets,
            power: self.power,
            leverage: leverage(self.market_value, self.net_assets),
            currency: self.currency.clone(),
            environment: self.environment,
        }
    }
}

/// Margin and risk details of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginStatus {
    /// Margin risk level.
    pub risk_level: RiskLevel,
    /// Deficit to cover, zero when none.
    pub margin_call_margin: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Net assets.
    pub net_assets: Decimal,
    /// Buying power.
    pub power: Decimal,
    /// Market value of holdings over net assets. `None` without net assets.
    pub leverage: Option<Decimal>,
    /// Account currency.
    pub currency: String,
    /// Environment the account belongs to.
    pub environment: TradingEnvironment,
}

impl MarginStatus {
    /// Returns true if the daemon flags a margin call or reports a deficit.
    #[must_use]
    pub fn has_margin_deficit(&self) -> bool {
        self.risk_level.is_margin_call() || self.margin_call_margin > Decimal::ZERO
    }
}

fn leverage(market_value: Decimal, net_assets: Decimal) -> Option<Decimal> {
    if net_assets <= Decimal::ZERO {
        return None;
    }
    market_value.checked_div(net_assets).map(|ratio| ratio.round_dp(4))
}

/// A held position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol.
    pub symbol: Symbol,
    /// Quantity held.
    pub quantity: Decimal,
    /// Quantity that can be sold now.
    pub sellable_quantity: Decimal,
    /// Average cost price.
    pub cost_price: Decimal,
    /// Current market price.
    pub market_price: Decimal,
    /// Environment the position belongs to.
    pub environment: TradingEnvironment,
}

impl Position {
    /// `quantity * market_price`.
    #[must_use]
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.market_price
    }

    /// Unrealized profit or loss against cost.
    #[must_use]
    pub fn unrealized_pnl(&self) -> Decimal {
        (self.market_price - self.cost_price) * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn balance(market_value: Decimal, net_assets: Decimal) -> AccountBalance {
        AccountBalance {
            cash: dec!(20000),
            power: dec!(40000),
            total_assets: dec!(120000),
            net_assets,
            market_value,
            margin_call_margin: Decimal::ZERO,
            risk_level: RiskLevel::Safe,
            currency: "HKD".to_string(),
            environment: TradingEnvironment::Simulated,
        }
    }

    #[test]
    fn margin_status_reports_leverage() {
        let status = balance(dec!(100000), dec!(80000)).margin_status();
        assert_eq!(status.leverage, Some(dec!(1.25)));
        assert_eq!(status.net_assets, dec!(80000));
        assert!(!status.has_margin_deficit());
    }

    #[test]
    fn leverage_undefined_without_net_assets() {
        assert_eq!(balance(dec!(100000), Decimal::ZERO).margin_status().leverage, None);
    }

    #[test]
    fn deficit_or_danger_flags_margin_call() {
        let mut funds = balance(dec!(100000), dec!(80000));
        funds.margin_call_margin = dec!(1500);
        assert!(funds.margin_status().has_margin_deficit());

        let mut funds = balance(dec!(100000), dec!(80000));
        funds.risk_level = RiskLevel::Danger;
        assert!(funds.margin_status().has_margin_deficit());
    }

    #[test]
    fn risk_level_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_value(RiskLevel::AbsolutelySafe).unwrap(),
            "ABSOLUTELY_SAFE"
        );
        assert_eq!(RiskLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn position_value_and_pnl() {
        let position = Position {
            symbol: Symbol::normalize("00700", "HK").unwrap(),
            quantity: dec!(200),
            sellable_quantity: dec!(200),
            cost_price: dec!(350),
            market_price: dec!(400),
            environment: TradingEnvironment::Simulated,
        };
        assert_eq!(position.market_value(), dec!(80000));
        assert_eq!(position.unrealized_pnl(), dec!(10000));
    }
}
