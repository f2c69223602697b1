//! Market Data Value Objects

mod bar_period;
mod option_contract;
mod order_book;
mod price_bar;
mod quote;

pub use bar_period::BarPeriod;
pub use option_contract::{OptionContract, OptionType};
pub use order_book::{BookLevel, OrderBook};
pub use price_bar::PriceBar;
pub use quote::{Financials, MarketSnapshot, Quote, Valuation};
