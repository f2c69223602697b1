//! Order kind (limit or market).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Order kind specifying execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Limit order - execute at specified price or better.
    Limit,
    /// Market order - execute at best available price.
    Market,
}

impl OrderKind {
    /// Returns true if this kind requires a caller-supplied price.
    #[must_use]
    pub const fn requires_price(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Returns true if this is a market order.
    #[must_use]
    pub const fn is_market(&self) -> bool {
        matches!(self, Self::Market)
    }
}

impl FromStr for OrderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LIMIT" | "NORMAL" => Ok(Self::Limit),
            "MARKET" => Ok(Self::Market),
            other => Err(DomainError::invalid(
                "kind",
                format!("expected LIMIT or MARKET, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_kind_requires_price() {
        assert!(OrderKind::Limit.requires_price());
        assert!(!OrderKind::Market.requires_price());
    }

    #[test]
    fn order_kind_parse() {
        assert_eq!("limit".parse::<OrderKind>().unwrap(), OrderKind::Limit);
        assert_eq!("NORMAL".parse::<OrderKind>().unwrap(), OrderKind::Limit);
        assert_eq!("Market".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert!("stop".parse::<OrderKind>().is_err());
    }

    #[test]
    fn order_kind_display() {
        assert_eq!(OrderKind::Market.to_string(), "MARKET");
    }
}
