//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer, plus the
//! ambient concerns of the binary:
//!
//! - `daemon/`: Daemon channel adapters (in-process simulated daemon)
//! - `config/`: Environment-driven configuration
//! - `telemetry`: Tracing subscriber setup

pub mod config;
pub mod daemon;
pub mod telemetry;
