//! Analyze Technicals Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::GatewayError;
use crate::application::ports::DaemonConnector;
use crate::application::services::GatewaySession;
use crate::domain::market_data::BarPeriod;
use crate::domain::shared::Symbol;
use crate::domain::technical_analysis::{IndicatorEngine, IndicatorReport};

/// Indicators computed when the caller names none.
pub const DEFAULT_INDICATORS: [&str; 4] = ["RSI_14", "SMA_20", "EMA_50", "MACD"];

/// Bar period used when the caller names none.
pub const DEFAULT_PERIOD: BarPeriod = BarPeriod::Day;

/// Bars fetched when the caller names no limit.
pub const DEFAULT_BAR_LIMIT: usize = 200;

/// Request for a technical analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalAnalysisRequest {
    /// Raw ticker.
    pub symbol: String,
    /// Indicator specifiers; `None` means [`DEFAULT_INDICATORS`].
    pub indicators: Option<Vec<String>>,
    /// Period label ("1d", "60m", "1h", ...). Unknown labels mean daily.
    pub period: Option<String>,
    /// Bars to fetch.
    pub limit: Option<usize>,
}

impl TechnicalAnalysisRequest {
    /// Request with every default for `symbol`.
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

/// Indicator report for the latest bar.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalAnalysisReport {
    /// Normalized symbol.
    pub symbol: Symbol,
    /// Bar period analysed.
    pub period: BarPeriod,
    /// Close of the latest bar.
    pub last_price: Option<f64>,
    /// Time of the latest bar.
    pub timestamp: Option<DateTime<Utc>>,
    /// Bars the indicators ran over.
    pub bar_count: usize,
    /// Per-specifier outcomes.
    pub indicators: IndicatorReport,
}

/// Use case for computing indicators over freshly fetched bars.
pub struct AnalyzeTechnicalsUseCase<C>
where
    C: DaemonConnector,
{
    session: Arc<GatewaySession<C>>,
    engine: IndicatorEngine,
}

impl<C> AnalyzeTechnicalsUseCase<C>
where
    C: DaemonConnector,
{
    /// Create a new AnalyzeTechnicalsUseCase.
    pub fn new(session: Arc<GatewaySession<C>>) -> Self {
        Self {
            session,
            engine: IndicatorEngine::new(),
        }
    }

    /// Execute the use case.
    pub async fn execute(
        &self,
        request: TechnicalAnalysisRequest,
    ) -> Result<TechnicalAnalysisReport, GatewayError> {
        let symbol = self.session.normalize_symbol(&request.symbol)?;
        let period = request
            .period
            .as_deref()
            .map_or(DEFAULT_PERIOD, BarPeriod::parse_or_daily);
        let limit = request.limit.unwrap_or(DEFAULT_BAR_LIMIT);
        let indicators = request
            .indicators
            .unwrap_or_else(|| DEFAULT_INDICATORS.iter().map(ToString::to_string).collect());

        let bars = self
            .session
            .get_bars(symbol.as_str(), period, limit)
            .await?;

        if bars.is_empty() {
            tracing::warn!(symbol = %symbol, period = %period, "No bars returned for analysis");
        }

        let report = self.engine.compute(&bars, &indicators);
        let last = bars.last();

        tracing::debug!(
            symbol = %symbol,
            period = %period,
            bars = bars.len(),
            indicators = report.len(),
            "Technical analysis computed"
        );

        Ok(TechnicalAnalysisReport {
            last_price: last.map(|bar| bar.close),
            timestamp: last.map(|bar| bar.time),
            bar_count: bars.len(),
            symbol,
            period,
            indicators: report,
        })
    }
}
