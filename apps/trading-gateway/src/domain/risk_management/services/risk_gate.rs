//! Risk Gate
//!
//! Stateless pre-trade check: an order may not exceed the configured
//! maximum order value.

use rust_decimal::Decimal;

use crate::domain::risk_management::value_objects::{RiskDecision, RiskRejection};
use crate::domain::shared::{OrderId, Symbol};

/// Risk Gate - validates order value against a fixed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskGate {
    max_order_value: Decimal,
}

impl RiskGate {
    /// Create a gate with the given maximum order value.
    #[must_use]
    pub const fn new(max_order_value: Decimal) -> Self {
        Self { max_order_value }
    }

    /// Configured maximum order value.
    #[must_use]
    pub const fn max_order_value(&self) -> Decimal {
        self.max_order_value
    }

    /// Check a new order. Equality with the limit is allowed.
    #[must_use]
    pub fn check(&self, symbol: &Symbol, quantity: Decimal, price: Decimal) -> RiskDecision {
        self.evaluate(symbol.as_str(), quantity, price)
    }

    /// Check an amendment of an existing order against its new terms.
    #[must_use]
    pub fn check_amendment(
        &self,
        order_id: &OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> RiskDecision {
        self.evaluate(&format!("order {order_id}"), quantity, price)
    }

    fn evaluate(&self, instrument: &str, quantity: Decimal, price: Decimal) -> RiskDecision {
        // An overflowing product exceeds any representable limit.
        let Some(estimated_value) = quantity.checked_mul(price) else {
            tracing::warn!(
                instrument = %instrument,
                quantity = %quantity,
                price = %price,
                limit = %self.max_order_value,
                "Risk check failed: order value overflows"
            );
            return RiskDecision::Deny(RiskRejection {
                instrument: instrument.to_string(),
                estimated_value: Decimal::MAX,
                limit: self.max_order_value,
            });
        };

        if estimated_value > self.max_order_value {
            tracing::warn!(
                instrument = %instrument,
                estimated_value = %estimated_value,
                limit = %self.max_order_value,
                "Risk check failed: order value exceeds limit"
            );
            return RiskDecision::Deny(RiskRejection {
                instrument: instrument.to_string(),
                estimated_value,
                limit: self.max_order_value,
            });
        }

        tracing::info!(
            instrument = %instrument,
            estimated_value = %estimated_value,
            "Risk check passed"
        );
        RiskDecision::Allow { estimated_value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn sym() -> Symbol {
        Symbol::normalize("00700", "HK").unwrap()
    }

    #[test]
    fn small_order_is_allowed() {
        let gate = RiskGate::new(dec!(2000));
        let decision = gate.check(&sym(), dec!(1), dec!(400.0));
        assert_eq!(
            decision,
            RiskDecision::Allow {
                estimated_value: dec!(400)
            }
        );
    }

    #[test]
    fn large_order_is_denied_with_value_and_limit() {
        let gate = RiskGate::new(dec!(2000));
        let RiskDecision::Deny(rejection) = gate.check(&sym(), dec!(100), dec!(400.0)) else {
            panic!("expected deny");
        };
        assert_eq!(rejection.estimated_value, dec!(40000));
        assert_eq!(rejection.limit, dec!(2000));
        assert_eq!(rejection.instrument, "HK.00700");
    }

    #[test_case(dec!(5), dec!(400), true ; "exactly at limit")]
    #[test_case(dec!(5), dec!(400.01), false ; "one cent over")]
    #[test_case(dec!(1), Decimal::ZERO, true ; "zero price")]
    #[test_case(dec!(0.5), dec!(4000), true ; "fractional quantity")]
    fn boundary(quantity: Decimal, price: Decimal, allowed: bool) {
        let gate = RiskGate::new(dec!(2000));
        assert_eq!(gate.check(&sym(), quantity, price).is_allowed(), allowed);
    }

    #[test]
    fn amendment_names_the_order() {
        let gate = RiskGate::new(dec!(2000));
        let RiskDecision::Deny(rejection) =
            gate.check_amendment(&OrderId::new("42"), dec!(10), dec!(300))
        else {
            panic!("expected deny");
        };
        assert_eq!(rejection.instrument, "order 42");
    }

    #[test]
    fn overflowing_value_is_denied() {
        let gate = RiskGate::new(dec!(2000));
        let RiskDecision::Deny(rejection) = gate.check(&sym(), Decimal::MAX, dec!(2)) else {
            panic!("expected deny");
        };
        assert_eq!(rejection.estimated_value, Decimal::MAX);
        assert_eq!(rejection.limit, dec!(2000));
    }

    #[test]
    fn overflowing_amendment_is_denied() {
        let gate = RiskGate::new(Decimal::MAX);
        let decision = gate.check_amendment(&OrderId::new("7"), Decimal::MAX, Decimal::MAX);
        assert!(!decision.is_allowed());
    }

    proptest! {
        #[test]
        fn deny_iff_value_exceeds_limit(
            qty in 1i64..100_000,
            price_cents in 0i64..10_000_000,
            limit_cents in 0i64..1_000_000_000,
        ) {
            let quantity = Decimal::from(qty);
            let price = Decimal::new(price_cents, 2);
            let limit = Decimal::new(limit_cents, 2);
            let decision = RiskGate::new(limit).check(&sym(), quantity, price);

            prop_assert_eq!(decision.is_allowed(), quantity * price <= limit);
            prop_assert_eq!(decision.estimated_value(), quantity * price);
        }
    }
}
