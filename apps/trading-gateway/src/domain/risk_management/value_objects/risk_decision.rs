//! Outcome of a pre-trade risk check.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an order was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRejection {
    /// Symbol or order the check ran against.
    pub instrument: String,
    /// `quantity * price`.
    pub estimated_value: Decimal,
    /// Configured maximum order value.
    pub limit: Decimal,
}

impl RiskRejection {
    /// Stable violation code.
    pub const CODE: &'static str = "MAX_ORDER_VALUE_EXCEEDED";

    /// Amount by which the order exceeds the limit.
    #[must_use]
    pub fn excess(&self) -> Decimal {
        self.estimated_value - self.limit
    }
}

impl fmt::Display for RiskRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order value {} for {} exceeds max order value {}",
            self.estimated_value, self.instrument, self.limit
        )
    }
}

impl std::error::Error for RiskRejection {}

/// Allow or Deny, as a pure function of quantity, price and the limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskDecision {
    /// Order may proceed.
    Allow {
        /// `quantity * price`.
        estimated_value: Decimal,
    },
    /// Order must not reach the daemon.
    Deny(RiskRejection),
}

impl RiskDecision {
    /// Returns true if the order may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// Estimated order value either way.
    #[must_use]
    pub const fn estimated_value(&self) -> Decimal {
        match self {
            Self::Allow { estimated_value } => *estimated_value,
            Self::Deny(rejection) => rejection.estimated_value,
        }
    }

    /// Convert into a `Result`, surfacing the rejection as the error.
    ///
    /// # Errors
    ///
    /// Returns the [`RiskRejection`] when the decision is `Deny`.
    pub fn into_result(self) -> Result<Decimal, RiskRejection> {
        match self {
            Self::Allow { estimated_value } => Ok(estimated_value),
            Self::Deny(rejection) => Err(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rejection() -> RiskRejection {
        RiskRejection {
            instrument: "HK.00700".to_string(),
            estimated_value: dec!(40000),
            limit: dec!(2000),
        }
    }

    #[test]
    fn rejection_display_mentions_value_and_limit() {
        let msg = rejection().to_string();
        assert!(msg.contains("40000"));
        assert!(msg.contains("2000"));
        assert!(msg.contains("HK.00700"));
    }

    #[test]
    fn rejection_excess() {
        assert_eq!(rejection().excess(), dec!(38000));
    }

    #[test]
    fn decision_into_result() {
        let allow = RiskDecision::Allow {
            estimated_value: dec!(400),
        };
        assert!(allow.is_allowed());
        assert_eq!(allow.into_result().unwrap(), dec!(400));

        let deny = RiskDecision::Deny(rejection());
        assert_eq!(deny.estimated_value(), dec!(40000));
        assert_eq!(deny.into_result().unwrap_err(), rejection());
    }

    #[test]
    fn decision_serde_is_tagged() {
        let json = serde_json::to_value(RiskDecision::Allow {
            estimated_value: dec!(400),
        })
        .unwrap();
        assert_eq!(json["decision"], "ALLOW");
    }
}
