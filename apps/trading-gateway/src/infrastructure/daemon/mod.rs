//! Daemon Adapters
//!
//! Implementations of the daemon ports.

mod simulated;

pub use simulated::{
    DEFAULT_SUBSCRIPTION_QUOTA, SimulatedDaemon, SimulatedQuoteChannel, SimulatedTradeChannel,
    synthetic_series,
};
