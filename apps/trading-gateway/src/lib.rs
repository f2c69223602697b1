// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines
    )
)]

//! Trading Gateway - Session Core
//!
//! Stateful session layer between callers and an external market-data /
//! order-execution daemon.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `shared`: Symbol normalization, identifiers, domain errors
//!   - `market_data`: Quotes, order books, bars, subscription ledger
//!   - `order_execution`: Order intents, records, deals
//!   - `account`: Balances, positions, max-buyable explanations
//!   - `risk_management`: Pre-trade notional limit
//!   - `technical_analysis`: Indicator specifiers and engine
//!
//! - **Application**: Orchestration
//!   - `ports`: Quote and trade channel interfaces, daemon connector
//!   - `services`: `GatewaySession`
//!   - `use_cases`: `AnalyzeTechnicals`
//!
//! - **Infrastructure**: Adapters
//!   - `daemon`: Simulated daemon
//!   - `config`: Environment configuration
//!   - `telemetry`: Tracing setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Session, use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and ambient setup.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::services::{ConnectionState, GatewaySession, SessionConfig};
pub use application::{ConnectionError, GatewayError};
pub use domain::risk_management::{RiskDecision, RiskGate, RiskRejection};
pub use domain::shared::{Symbol, SymbolNormalizer};
pub use domain::technical_analysis::{IndicatorEngine, IndicatorOutcome, IndicatorReport};
