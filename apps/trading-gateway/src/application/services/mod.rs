//! Application Services
//!
//! Long-lived stateful services shared by use cases.

pub mod gateway_session;

pub use gateway_session::{
    ConnectionState, GatewaySession, MAX_BAR_COUNT, MAX_OPTION_CHAIN_SPAN_DAYS, SessionConfig,
};
