//! Trading Gateway Binary
//!
//! Runs one quote + technical-analysis pass per symbol against an in-process
//! simulated daemon and prints the results as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trading-gateway -- 00700 US.AAPL
//! ```
//!
//! # Environment Variables
//!
//! - `DAEMON_HOST`: Daemon host (default: 127.0.0.1)
//! - `DAEMON_PORT`: Daemon port (default: 11111)
//! - `DAEMON_UNLOCK_PWD`: Trade unlock password (default: none)
//! - `TRADING_ENV`: paper | live (default: paper)
//! - `DEFAULT_MARKET`: Prefix for unqualified tickers (default: HK)
//! - `MAX_ORDER_VALUE`: Per-order notional limit (default: 2000)
//! - `RUST_LOG`: Log filter (default: trading_gateway=info)

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use serde_json::json;

use trading_gateway::application::use_cases::{
    AnalyzeTechnicalsUseCase, DEFAULT_BAR_LIMIT, DEFAULT_PERIOD, TechnicalAnalysisRequest,
};
use trading_gateway::infrastructure::config::{GatewayConfig, load_dotenv};
use trading_gateway::infrastructure::daemon::SimulatedDaemon;
use trading_gateway::infrastructure::telemetry::init_tracing;
use trading_gateway::{GatewaySession, SymbolNormalizer};

/// Symbols analysed when none are given on the command line.
const DEFAULT_SYMBOLS: [&str; 2] = ["00700", "00005"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting Trading Gateway");

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    log_config(&config);

    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = DEFAULT_SYMBOLS.iter().map(ToString::to_string).collect();
    }

    let daemon = seeded_daemon(&config, &symbols)?;
    let session = Arc::new(GatewaySession::new(daemon, config.session_config()));
    session
        .connect()
        .await
        .context("failed to connect to daemon")?;

    let analyze = AnalyzeTechnicalsUseCase::new(Arc::clone(&session));
    let mut results = Vec::with_capacity(symbols.len());

    for raw in &symbols {
        let quote = session.get_quote(raw).await;
        let analysis = analyze
            .execute(TechnicalAnalysisRequest::for_symbol(raw.clone()))
            .await;

        let entry = match (quote, analysis) {
            (Ok(quote), Ok(analysis)) => json!({ "quote": quote, "analysis": analysis }),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(symbol = %raw, error = %e, "Analysis pass failed");
                json!({ "symbol": raw, "error": e.to_string(), "code": e.code() })
            }
        };
        results.push(entry);
    }

    println!("{}", serde_json::to_string_pretty(&results)?);

    session.close().await;
    tracing::info!("Trading Gateway stopped");
    Ok(())
}

fn log_config(config: &GatewayConfig) {
    tracing::info!(
        endpoint = %config.endpoint,
        environment = %config.environment,
        default_market = %config.default_market,
        max_order_value = %config.max_order_value,
        unlock = config.unlock_credential.is_some(),
        "Configuration loaded"
    );
}

/// Build a simulated daemon holding a quote and a daily series per symbol.
fn seeded_daemon(config: &GatewayConfig, symbols: &[String]) -> anyhow::Result<SimulatedDaemon> {
    let daemon = SimulatedDaemon::new();
    if let Some(credential) = &config.unlock_credential {
        daemon.set_unlock_password(credential.expose());
    }

    let normalizer = SymbolNormalizer::new(config.default_market.clone());
    for (i, raw) in symbols.iter().enumerate() {
        let symbol = normalizer
            .normalize(raw)
            .with_context(|| format!("invalid symbol '{raw}'"))?;
        let base = 50.0 + 75.0 * i as f64;
        daemon.seed_quote(&symbol, Decimal::from(50 + 75 * i), 100);
        daemon.seed_series(&symbol, DEFAULT_PERIOD, DEFAULT_BAR_LIMIT, base);
    }
    Ok(daemon)
}
