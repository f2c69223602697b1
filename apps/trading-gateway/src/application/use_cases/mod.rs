//! Application Use Cases

pub mod analyze_technicals;

pub use analyze_technicals::{
    AnalyzeTechnicalsUseCase, DEFAULT_BAR_LIMIT, DEFAULT_INDICATORS, DEFAULT_PERIOD,
    TechnicalAnalysisReport, TechnicalAnalysisRequest,
};
