//! Order and deal records returned by the daemon.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{OrderKind, OrderSide, OrderStatus, TradingEnvironment};
use crate::domain::shared::{DealId, OrderId, Symbol};

/// An order as known to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Daemon-assigned order ID.
    pub order_id: OrderId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Kind.
    pub kind: OrderKind,
    /// Ordered quantity.
    pub quantity: Decimal,
    /// Order price.
    pub price: Decimal,
    /// Quantity filled so far.
    pub filled_quantity: Decimal,
    /// Average fill price, if anything filled.
    pub avg_fill_price: Option<Decimal>,
    /// Current status.
    pub status: OrderStatus,
    /// Environment the order lives in.
    pub environment: TradingEnvironment,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Quantity still working.
    #[must_use]
    pub fn remaining_quantity(&self) -> Decimal {
        (self.quantity - self.filled_quantity).max(Decimal::ZERO)
    }
}

/// One execution against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Daemon-assigned deal ID.
    pub deal_id: DealId,
    /// Parent order.
    pub order_id: OrderId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Executed quantity.
    pub quantity: Decimal,
    /// Execution price.
    pub price: Decimal,
    /// Environment.
    pub environment: TradingEnvironment,
    /// Execution time.
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn remaining_quantity_never_negative() {
        let now = Utc::now();
        let mut record = OrderRecord {
            order_id: OrderId::new("1"),
            symbol: Symbol::normalize("00700", "HK").unwrap(),
            side: OrderSide::Buy,
            kind: OrderKind::Limit,
            quantity: dec!(100),
            price: dec!(400),
            filled_quantity: dec!(40),
            avg_fill_price: Some(dec!(400)),
            status: OrderStatus::PartiallyFilled,
            environment: TradingEnvironment::Simulated,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(record.remaining_quantity(), dec!(60));

        record.filled_quantity = dec!(120);
        assert_eq!(record.remaining_quantity(), Decimal::ZERO);
    }
}
