//! Daemon Ports (Driven Ports)
//!
//! The external market-data / order-execution daemon is reached through two
//! logical channels: a quote channel and a trade channel. Every call returns
//! either its payload or a [`DaemonFailure`] carrying the daemon's status.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::{AccountBalance, Position};
use crate::domain::market_data::{
    BarPeriod, MarketSnapshot, OptionContract, OrderBook, PriceBar, Quote, SubscriptionKind,
};
use crate::domain::order_execution::{
    Deal, ModifyOperation, OrderKind, OrderRecord, OrderSide, OrderStatus, TradingEnvironment,
};
use crate::domain::shared::{OrderId, Symbol};

// =============================================================================
// Call results
// =============================================================================

/// Non-OK status returned by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("daemon status {code}: {message}")]
pub struct DaemonFailure {
    /// Daemon status code.
    pub code: i32,
    /// Daemon message.
    pub message: String,
}

impl DaemonFailure {
    /// Generic error status.
    pub const RET_ERROR: i32 = -1;

    /// Create a failure with the generic error status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: Self::RET_ERROR,
            message: message.into(),
        }
    }
}

/// Result of every daemon call.
pub type DaemonReply<T> = Result<T, DaemonFailure>;

// =============================================================================
// Connection parameters
// =============================================================================

/// Network location of the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonEndpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl DaemonEndpoint {
    /// Create an endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for DaemonEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Trade unlock password.
#[derive(Clone, PartialEq, Eq)]
pub struct UnlockCredential(String);

impl UnlockCredential {
    /// Wrap a password. Returns `None` for an empty one.
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        if password.is_empty() {
            None
        } else {
            Some(Self(password))
        }
    }

    /// The password.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UnlockCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnlockCredential([REDACTED])")
    }
}

/// Daemon health as reported by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Daemon version string.
    pub server_version: String,
    /// Quote login established.
    pub quote_logged_in: bool,
    /// Trade login established.
    pub trade_logged_in: bool,
}

// =============================================================================
// Trade requests
// =============================================================================

/// Order placement as sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Kind.
    pub kind: OrderKind,
    /// Quantity.
    pub quantity: Decimal,
    /// Effective price.
    pub price: Decimal,
    /// Environment tag.
    pub environment: TradingEnvironment,
}

/// Order amendment or cancellation as sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    /// Amend or cancel.
    pub operation: ModifyOperation,
    /// Target order.
    pub order_id: OrderId,
    /// New quantity (ignored for cancel).
    pub quantity: Decimal,
    /// New price (ignored for cancel).
    pub price: Decimal,
    /// Environment tag.
    pub environment: TradingEnvironment,
}

// =============================================================================
// Ports
// =============================================================================

/// Quote channel: market data and subscriptions.
#[async_trait]
pub trait QuoteChannelPort: Send + Sync {
    /// Health probe.
    async fn get_global_state(&self) -> DaemonReply<GlobalState>;

    /// Subscribe `symbols` to every kind in `kinds`. Counts against quota.
    async fn subscribe(&self, symbols: &[Symbol], kinds: &[SubscriptionKind]) -> DaemonReply<()>;

    /// Release subscriptions.
    async fn unsubscribe(&self, symbols: &[Symbol], kinds: &[SubscriptionKind])
    -> DaemonReply<()>;

    /// Quotes for subscribed symbols.
    async fn get_stock_quote(&self, symbols: &[Symbol]) -> DaemonReply<Vec<Quote>>;

    /// Snapshots; no subscription needed.
    async fn get_market_snapshot(&self, symbols: &[Symbol]) -> DaemonReply<Vec<MarketSnapshot>>;

    /// Order book for a subscribed symbol.
    async fn get_order_book(&self, symbol: &Symbol, depth: usize) -> DaemonReply<OrderBook>;

    /// Historical bars, ascending by time.
    async fn request_history_bars(
        &self,
        symbol: &Symbol,
        period: BarPeriod,
        max_count: usize,
    ) -> DaemonReply<Vec<PriceBar>>;

    /// Option contracts on `underlying` expiring within `[start, end]`.
    /// Needs no subscription.
    async fn get_option_chain(
        &self,
        underlying: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DaemonReply<Vec<OptionContract>>;

    /// Close the channel.
    async fn close(&self) -> DaemonReply<()>;
}

/// Trade channel: account and order operations.
#[async_trait]
pub trait TradeChannelPort: Send + Sync {
    /// Unlock trading.
    async fn unlock_trade(&self, credential: &UnlockCredential) -> DaemonReply<()>;

    /// Held positions.
    async fn position_list_query(
        &self,
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<Position>>;

    /// Account funds, including margin figures.
    async fn account_info_query(
        &self,
        environment: TradingEnvironment,
    ) -> DaemonReply<AccountBalance>;

    /// Orders, optionally filtered by symbol. An empty `statuses` means
    /// every status.
    async fn order_list_query(
        &self,
        symbol: Option<&Symbol>,
        statuses: &[OrderStatus],
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<OrderRecord>>;

    /// Today's deals, optionally filtered by symbol.
    async fn deal_list_query(
        &self,
        symbol: Option<&Symbol>,
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<Deal>>;

    /// Maximum quantity buyable at `price` (zero price means market).
    async fn max_buyable_query(
        &self,
        symbol: &Symbol,
        price: Decimal,
        environment: TradingEnvironment,
    ) -> DaemonReply<Decimal>;

    /// Place an order.
    async fn place_order(&self, request: PlaceOrderRequest) -> DaemonReply<OrderRecord>;

    /// Amend or cancel an order.
    async fn modify_order(&self, request: ModifyOrderRequest) -> DaemonReply<OrderRecord>;

    /// Close the channel.
    async fn close(&self) -> DaemonReply<()>;
}

/// Opens channels to a daemon endpoint.
#[async_trait]
pub trait DaemonConnector: Send + Sync {
    /// Quote channel implementation.
    type Quote: QuoteChannelPort + 'static;
    /// Trade channel implementation.
    type Trade: TradeChannelPort + 'static;

    /// Open the quote channel.
    async fn open_quote_channel(&self, endpoint: &DaemonEndpoint) -> DaemonReply<Self::Quote>;

    /// Open the trade channel.
    async fn open_trade_channel(&self, endpoint: &DaemonEndpoint) -> DaemonReply<Self::Trade>;
}
