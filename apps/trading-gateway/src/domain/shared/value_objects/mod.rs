//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.

mod identifiers;
mod symbol;

pub use identifiers::{DealId, OrderId};
pub use symbol::{MARKET_SEPARATOR, Symbol, SymbolNormalizer};
