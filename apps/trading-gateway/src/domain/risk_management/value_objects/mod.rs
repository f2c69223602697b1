//! Risk Management Value Objects

mod risk_decision;

pub use risk_decision::{RiskDecision, RiskRejection};
