//! Validated order request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{OrderKind, OrderSide, TradingEnvironment};
use crate::domain::shared::{DomainError, Symbol};

/// An order the caller wants placed, validated but not yet risk-checked.
///
/// Invariants: `quantity > 0`, `price >= 0` when present, and limit orders
/// always carry a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    symbol: Symbol,
    side: OrderSide,
    quantity: Decimal,
    price: Option<Decimal>,
    kind: OrderKind,
    environment: TradingEnvironment,
}

impl OrderIntent {
    /// Validate and build an intent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if quantity is not positive,
    /// price is negative, or a limit order has no price.
    pub fn new(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
        kind: OrderKind,
        environment: TradingEnvironment,
    ) -> Result<Self, DomainError> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::invalid(
                "quantity",
                format!("must be positive, got {quantity}"),
            ));
        }
        if let Some(p) = price.filter(|p| *p < Decimal::ZERO) {
            return Err(DomainError::invalid(
                "price",
                format!("must not be negative, got {p}"),
            ));
        }
        if kind.requires_price() && price.is_none() {
            return Err(DomainError::invalid("price", "limit orders require a price"));
        }

        Ok(Self {
            symbol,
            side,
            quantity,
            price,
            kind,
            environment,
        })
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Caller-supplied price, if any.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Kind.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Environment the order will be tagged with.
    #[must_use]
    pub const fn environment(&self) -> TradingEnvironment {
        self.environment
    }

    /// Returns true if the effective price comes from a reference quote.
    ///
    /// Market orders are sized against the live price; the caller's price
    /// is only the fallback when no quote is available.
    #[must_use]
    pub const fn needs_reference_price(&self) -> bool {
        self.kind.is_market()
    }

    /// Price used when no reference quote is available.
    #[must_use]
    pub fn fallback_price(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }
}
