//! Market Data Bounded Context
//!
//! Quotes, order books, bar series, option chains and the subscriptions
//! that must be held on the daemon before quotes, books or bars can be
//! fetched.

pub mod subscription;
pub mod value_objects;

pub use subscription::{SubscriptionKind, SubscriptionLedger};
pub use value_objects::{
    BarPeriod, BookLevel, Financials, MarketSnapshot, OptionContract, OptionType, OrderBook,
    PriceBar, Quote, Valuation,
};
