//! Configuration Module
//!
//! Environment-driven configuration for the gateway session.

mod settings;

pub use settings::{
    ConfigError, DEFAULT_HOST, DEFAULT_MARKET, DEFAULT_MAX_ORDER_VALUE, DEFAULT_PORT,
    GatewayConfig, load_dotenv,
};
