//! Risk Management Bounded Context
//!
//! Pre-trade validation. Every order and amendment passes the [`RiskGate`]
//! before anything is sent to the daemon.

pub mod services;
pub mod value_objects;

pub use services::RiskGate;
pub use value_objects::{RiskDecision, RiskRejection};
