//! Technical Analysis Bounded Context
//!
//! Indicator specifiers, rolling math and the engine that turns a bar
//! series into a per-specifier report.

pub mod engine;
pub mod math;
pub mod outcome;
pub mod specifier;

pub use engine::IndicatorEngine;
pub use outcome::{IndicatorEntry, IndicatorOutcome, IndicatorReport, IndicatorValue};
pub use specifier::{IndicatorSpec, SpecifierError};
