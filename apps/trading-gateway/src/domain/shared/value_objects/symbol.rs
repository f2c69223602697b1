//! Symbol value object and the normalizer that produces it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Separator between the market prefix and the security code.
pub const MARKET_SEPARATOR: char = '.';

/// A fully-qualified security symbol in canonical `MARKET.CODE` form.
///
/// Examples: "HK.00700", "US.AAPL", "US.BRK.B"
///
/// Deserialization goes through [`Symbol::normalize`] and requires an
/// explicit market prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalize a raw ticker.
    ///
    /// Input that already carries a market prefix is uppercased as-is,
    /// otherwise `default_market.` is prepended.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if the input is empty or the
    /// market or code part is missing.
    pub fn normalize(raw: &str, default_market: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("Symbol cannot be empty"));
        }

        let qualified = if trimmed.contains(MARKET_SEPARATOR) {
            trimmed.to_uppercase()
        } else {
            if default_market.trim().is_empty() {
                return Err(invalid("No default market configured for unqualified symbol"));
            }
            format!("{}{MARKET_SEPARATOR}{trimmed}", default_market.trim()).to_uppercase()
        };

        match qualified.split_once(MARKET_SEPARATOR) {
            Some((market, code)) if !market.is_empty() && !code.is_empty() => Ok(Self(qualified)),
            _ => Err(invalid(format!(
                "Symbol '{trimmed}' must have the form MARKET.CODE"
            ))),
        }
    }

    /// Get the canonical symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Market prefix (e.g. "HK").
    #[must_use]
    pub fn market(&self) -> &str {
        self.0
            .split_once(MARKET_SEPARATOR)
            .map_or(self.0.as_str(), |(market, _)| market)
    }

    /// Security code without the market prefix (e.g. "00700").
    #[must_use]
    pub fn code(&self) -> &str {
        self.0
            .split_once(MARKET_SEPARATOR)
            .map_or(self.0.as_str(), |(_, code)| code)
    }
}

fn invalid(message: impl Into<String>) -> DomainError {
    DomainError::invalid("symbol", message)
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value, "")
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes raw tickers against the configured default market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNormalizer {
    default_market: String,
}

impl SymbolNormalizer {
    /// Create a normalizer for the given default market prefix.
    #[must_use]
    pub fn new(default_market: impl Into<String>) -> Self {
        Self {
            default_market: default_market.into().trim().to_uppercase(),
        }
    }

    /// The default market prefix applied to unqualified tickers.
    #[must_use]
    pub fn default_market(&self) -> &str {
        &self.default_market
    }

    /// Normalize a raw ticker into a [`Symbol`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` for empty or malformed input.
    pub fn normalize(&self, raw: &str) -> Result<Symbol, DomainError> {
        Symbol::normalize(raw, &self.default_market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("00700", "HK.00700" ; "unqualified gets default market")]
    #[test_case("hk.00700", "HK.00700" ; "qualified is uppercased")]
    #[test_case("HK.00700", "HK.00700" ; "canonical is unchanged")]
    #[test_case("us.aapl", "US.AAPL" ; "other market kept")]
    #[test_case("  00700 ", "HK.00700" ; "whitespace trimmed")]
    #[test_case("US.BRK.B", "US.BRK.B" ; "code may contain separator")]
    fn normalize_valid(raw: &str, expected: &str) {
        let normalizer = SymbolNormalizer::new("HK");
        assert_eq!(normalizer.normalize(raw).unwrap().as_str(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace only")]
    #[test_case(".00700" ; "missing market")]
    #[test_case("HK." ; "missing code")]
    fn normalize_invalid(raw: &str) {
        let normalizer = SymbolNormalizer::new("HK");
        let err = normalizer.normalize(raw).unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { ref field, .. } if field == "symbol"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let normalizer = SymbolNormalizer::new("hk");
        let once = normalizer.normalize("00700").unwrap();
        let twice = normalizer.normalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn default_market_is_uppercased() {
        assert_eq!(SymbolNormalizer::new(" us ").default_market(), "US");
    }

    #[test]
    fn unqualified_without_default_market_is_rejected() {
        assert!(Symbol::normalize("AAPL", "").is_err());
        assert!(Symbol::normalize("US.AAPL", "").is_ok());
    }

    #[test]
    fn market_and_code_accessors() {
        let symbol = Symbol::normalize("US.BRK.B", "HK").unwrap();
        assert_eq!(symbol.market(), "US");
        assert_eq!(symbol.code(), "BRK.B");
    }

    #[test]
    fn symbol_serializes_as_string() {
        let symbol = Symbol::normalize("00700", "HK").unwrap();
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"HK.00700\"");
    }

    #[test]
    fn deserialization_normalizes() {
        let symbol: Symbol = serde_json::from_str("\"hk.00700\"").unwrap();
        assert_eq!(symbol.as_str(), "HK.00700");
    }

    #[test_case("\"hk.\"" ; "missing code")]
    #[test_case("\".00700\"" ; "missing market")]
    #[test_case("\"00700\"" ; "unqualified")]
    #[test_case("\"\"" ; "empty")]
    fn deserialization_rejects_malformed(json: &str) {
        assert!(serde_json::from_str::<Symbol>(json).is_err());
    }
}
