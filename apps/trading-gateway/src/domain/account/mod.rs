//! Account Bounded Context
//!
//! Funds, margin, positions and buying-power queries.

pub mod balance;
pub mod max_buyable;

pub use balance::{AccountBalance, MarginStatus, Position, RiskLevel};
pub use max_buyable::{MaxBuyable, ZeroBuyableReason};
