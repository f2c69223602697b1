//! Application errors surfaced to gateway callers.

use crate::application::ports::{DaemonEndpoint, DaemonFailure};
use crate::domain::market_data::SubscriptionKind;
use crate::domain::risk_management::RiskRejection;
use crate::domain::shared::{DomainError, Symbol};

/// The session could not reach a healthy daemon.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Connection to daemon at {endpoint} failed: {message}")]
pub struct ConnectionError {
    /// Daemon endpoint.
    pub endpoint: String,
    /// What failed.
    pub message: String,
}

impl ConnectionError {
    /// Create a connection error for `endpoint`.
    pub fn new(endpoint: &DaemonEndpoint, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

/// Every failure a gateway operation can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Connect or health probe failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A subscription could not be acquired.
    #[error("Subscription failed for {symbol} {kind}: {message}")]
    Subscription {
        /// Symbol.
        symbol: Symbol,
        /// Data kind.
        kind: SubscriptionKind,
        /// Daemon message.
        message: String,
    },

    /// Any other non-OK daemon status.
    #[error("Daemon error during {operation}: {message}")]
    Daemon {
        /// Daemon call that failed.
        operation: &'static str,
        /// Daemon message.
        message: String,
    },

    /// Order stopped by the risk gate before reaching the daemon.
    #[error("Risk check rejected order: {0}")]
    RiskRejected(#[from] RiskRejection),

    /// Caller input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),
}

impl GatewayError {
    /// Wrap a daemon failure for `operation`.
    pub fn daemon(operation: &'static str, failure: DaemonFailure) -> Self {
        Self::Daemon {
            operation,
            message: failure.to_string(),
        }
    }

    /// Wrap a failed subscribe call.
    pub fn subscription(symbol: &Symbol, kind: SubscriptionKind, failure: DaemonFailure) -> Self {
        Self::Subscription {
            symbol: symbol.clone(),
            kind,
            message: failure.to_string(),
        }
    }

    /// Shorthand for an invalid-input error on `field`.
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput(DomainError::invalid(field, message))
    }

    /// Stable error code for logs and JSON output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Subscription { .. } => "SUBSCRIPTION_ERROR",
            Self::Daemon { .. } => "DAEMON_ERROR",
            Self::RiskRejected(_) => "RISK_REJECTED",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn connection_error_display() {
        let err = ConnectionError::new(&DaemonEndpoint::new("127.0.0.1", 11111), "probe failed");
        assert_eq!(
            err.to_string(),
            "Connection to daemon at 127.0.0.1:11111 failed: probe failed"
        );
    }

    #[test]
    fn connection_error_converts_transparently() {
        let err = ConnectionError::new(&DaemonEndpoint::new("h", 1), "down");
        let gateway: GatewayError = err.clone().into();
        assert_eq!(gateway.to_string(), err.to_string());
        assert_eq!(gateway.code(), "CONNECTION_ERROR");
    }

    #[test]
    fn daemon_error_carries_operation_and_message() {
        let err = GatewayError::daemon("place_order", DaemonFailure::new("market closed"));
        let msg = err.to_string();
        assert!(msg.contains("place_order"));
        assert!(msg.contains("market closed"));
    }

    #[test]
    fn risk_rejection_converts() {
        let err: GatewayError = RiskRejection {
            instrument: "HK.00700".to_string(),
            estimated_value: dec!(40000),
            limit: dec!(2000),
        }
        .into();
        assert_eq!(err.code(), "RISK_REJECTED");
        assert!(err.to_string().contains("40000"));
    }

    #[test]
    fn subscription_error_names_symbol_and_kind() {
        let symbol = Symbol::normalize("00700", "HK").unwrap();
        let err = GatewayError::subscription(
            &symbol,
            SubscriptionKind::Quote,
            DaemonFailure::new("quota exceeded"),
        );
        let msg = err.to_string();
        assert!(msg.contains("HK.00700"));
        assert!(msg.contains("QUOTE"));
        assert!(msg.contains("quota exceeded"));
    }
}
