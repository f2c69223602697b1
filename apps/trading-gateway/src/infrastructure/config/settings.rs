//! Gateway Configuration Settings
//!
//! Session parameters resolved once at startup from environment variables.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::ports::{DaemonEndpoint, UnlockCredential};
use crate::application::services::SessionConfig;
use crate::domain::order_execution::TradingEnvironment;

/// Default daemon host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default daemon port.
pub const DEFAULT_PORT: u16 = 11111;
/// Default market prefix for unqualified tickers.
pub const DEFAULT_MARKET: &str = "HK";
/// Default per-order notional limit.
pub const DEFAULT_MAX_ORDER_VALUE: Decimal = dec!(2000);

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Daemon location.
    pub endpoint: DaemonEndpoint,
    /// Trade unlock password (`None` skips the unlock step).
    pub unlock_credential: Option<UnlockCredential>,
    /// Trading environment.
    pub environment: TradingEnvironment,
    /// Market prefix for unqualified tickers.
    pub default_market: String,
    /// Risk gate limit.
    pub max_order_value: Decimal,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DaemonEndpoint::new(DEFAULT_HOST, DEFAULT_PORT),
            unlock_credential: None,
            environment: TradingEnvironment::default(),
            default_market: DEFAULT_MARKET.to_string(),
            max_order_value: DEFAULT_MAX_ORDER_VALUE,
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to their defaults; set keys must parse.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable port, environment or order
    /// value, or an empty market prefix.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("DAEMON_HOST")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = parse_var(&lookup, "DAEMON_PORT", DEFAULT_PORT)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DAEMON_PORT".to_string(),
                value: "0".to_string(),
                reason: "port must be non-zero".to_string(),
            });
        }

        let unlock_credential = lookup("DAEMON_UNLOCK_PWD").and_then(UnlockCredential::new);

        let environment = parse_var(&lookup, "TRADING_ENV", TradingEnvironment::default())?;

        let default_market = match lookup("DEFAULT_MARKET") {
            Some(v) if v.trim().is_empty() => {
                return Err(ConfigError::EmptyValue("DEFAULT_MARKET".to_string()));
            }
            Some(v) => v.trim().to_uppercase(),
            None => DEFAULT_MARKET.to_string(),
        };

        let max_order_value = parse_var(&lookup, "MAX_ORDER_VALUE", DEFAULT_MAX_ORDER_VALUE)?;
        if max_order_value <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "MAX_ORDER_VALUE".to_string(),
                value: max_order_value.to_string(),
                reason: "limit must be positive".to_string(),
            });
        }

        Ok(Self {
            endpoint: DaemonEndpoint::new(host, port),
            unlock_credential,
            environment,
            default_market,
            max_order_value,
        })
    }

    /// Session parameters derived from this configuration.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.endpoint.clone(),
            unlock_credential: self.unlock_credential.clone(),
            environment: self.environment,
            default_market: self.default_market.clone(),
            max_order_value: self.max_order_value,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })
}

/// Load `.env` from the current directory, falling back to the nearest
/// ancestor that has one.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.endpoint, DaemonEndpoint::new("127.0.0.1", 11111));
        assert!(config.unlock_credential.is_none());
        assert_eq!(config.environment, TradingEnvironment::Simulated);
        assert_eq!(config.default_market, "HK");
        assert_eq!(config.max_order_value, dec!(2000));
    }

    #[test]
    fn reads_every_variable() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("DAEMON_HOST", "10.0.0.5"),
            ("DAEMON_PORT", "22222"),
            ("DAEMON_UNLOCK_PWD", "654321"),
            ("TRADING_ENV", "live"),
            ("DEFAULT_MARKET", "us"),
            ("MAX_ORDER_VALUE", "5000.50"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint.to_string(), "10.0.0.5:22222");
        assert_eq!(config.unlock_credential.unwrap().expose(), "654321");
        assert_eq!(config.environment, TradingEnvironment::Real);
        assert_eq!(config.default_market, "US");
        assert_eq!(config.max_order_value, dec!(5000.50));
    }

    #[test]
    fn empty_unlock_password_means_no_unlock() {
        let config =
            GatewayConfig::from_lookup(lookup_from(&[("DAEMON_UNLOCK_PWD", "")])).unwrap();
        assert!(config.unlock_credential.is_none());
    }

    #[test_case("DAEMON_PORT", "not-a-port" ; "unparseable port")]
    #[test_case("DAEMON_PORT", "0" ; "zero port")]
    #[test_case("DAEMON_PORT", "70000" ; "port out of range")]
    #[test_case("TRADING_ENV", "sandbox" ; "unknown environment")]
    #[test_case("MAX_ORDER_VALUE", "lots" ; "unparseable limit")]
    #[test_case("MAX_ORDER_VALUE", "-5" ; "negative limit")]
    fn invalid_values_are_rejected(key: &str, value: &str) {
        let err = GatewayConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ref k, .. } if k == key));
    }

    #[test]
    fn empty_market_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("DEFAULT_MARKET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(ref k) if k == "DEFAULT_MARKET"));
    }

    #[test]
    fn credential_redacted_in_debug() {
        let config =
            GatewayConfig::from_lookup(lookup_from(&[("DAEMON_UNLOCK_PWD", "secret456")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn session_config_mirrors_settings() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("DEFAULT_MARKET", "US")])).unwrap();
        let session = config.session_config();
        assert_eq!(session.default_market, "US");
        assert_eq!(session.max_order_value, dec!(2000));
        assert_eq!(session.endpoint, config.endpoint);
    }
}
