//! Application Ports
//!
//! Interfaces to the daemon, implemented in the infrastructure layer.

mod daemon_port;

pub use daemon_port::{
    DaemonConnector, DaemonEndpoint, DaemonFailure, DaemonReply, GlobalState, ModifyOrderRequest,
    PlaceOrderRequest, QuoteChannelPort, TradeChannelPort, UnlockCredential,
};
