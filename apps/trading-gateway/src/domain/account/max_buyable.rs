//! Maximum buyable quantity and why it may be zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Symbol;

/// Explanation attached when the daemon reports a max buyable of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZeroBuyableReason {
    /// The quote reports a lot size of zero.
    InvalidLotSize,
    /// Buying power does not cover a single lot.
    InsufficientBuyingPower {
        /// Shares per lot.
        lot_size: u32,
        /// `price * lot_size`.
        cost_per_lot: Decimal,
        /// Available buying power.
        power: Decimal,
    },
    /// Power covers a lot but the daemon still reports zero
    /// (position limit, suspension, ...).
    RestrictedByDaemon {
        /// `price * lot_size`.
        cost_per_lot: Decimal,
        /// Available buying power.
        power: Decimal,
    },
    /// The supporting lookups failed.
    Undetermined {
        /// What went wrong.
        message: String,
    },
}

impl ZeroBuyableReason {
    /// Classify a zero max-buyable from lot size, price and buying power.
    #[must_use]
    pub fn explain(lot_size: u32, price: Decimal, power: Decimal) -> Self {
        if lot_size == 0 {
            return Self::InvalidLotSize;
        }
        let cost_per_lot = price
            .checked_mul(Decimal::from(lot_size))
            .unwrap_or(Decimal::MAX);
        if power < cost_per_lot {
            Self::InsufficientBuyingPower {
                lot_size,
                cost_per_lot,
                power,
            }
        } else {
            Self::RestrictedByDaemon {
                cost_per_lot,
                power,
            }
        }
    }
}

impl fmt::Display for ZeroBuyableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLotSize => write!(f, "Invalid lot size (0)"),
            Self::InsufficientBuyingPower {
                lot_size,
                cost_per_lot,
                power,
            } => write!(
                f,
                "Insufficient buying power for min lot size of {lot_size}. Cost: {:.2} | Power: {:.2}",
                cost_per_lot, power
            ),
            Self::RestrictedByDaemon {
                cost_per_lot,
                power,
            } => write!(
                f,
                "Power ({power}) >= cost ({cost_per_lot}), but max is 0. Possible position limit or suspension"
            ),
            Self::Undetermined { message } => {
                write!(f, "Could not determine reason ({message})")
            }
        }
    }
}

/// Result of a max-buyable query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxBuyable {
    /// Symbol.
    pub symbol: Symbol,
    /// Price the query assumed.
    pub price: Decimal,
    /// Maximum quantity the account can buy.
    pub quantity: Decimal,
    /// Present only when `quantity` is zero.
    pub zero_reason: Option<ZeroBuyableReason>,
}

impl fmt::Display for MaxBuyable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.zero_reason {
            Some(reason) => write!(f, "Max Qty: {} (Reason: {reason})", self.quantity),
            None => write!(f, "Max Qty: {}", self.quantity),
        }
    }
}
