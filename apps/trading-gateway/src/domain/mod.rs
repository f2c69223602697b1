//! Domain Layer
//!
//! Business types and rules with no knowledge of the daemon transport.
//!
//! # Bounded Contexts
//!
//! - [`market_data`]: Quotes, order books, bars and subscription bookkeeping
//! - [`order_execution`]: Order intents, records and the environment tag
//! - [`account`]: Funds, positions and buying power
//! - [`risk_management`]: Pre-trade order value check
//! - [`technical_analysis`]: Indicator specifiers and computation

pub mod account;
pub mod market_data;
pub mod order_execution;
pub mod risk_management;
pub mod shared;
pub mod technical_analysis;
