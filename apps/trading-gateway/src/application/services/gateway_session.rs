//! Gateway Session
//!
//! Stateful handle to the daemon. Owns the quote and trade channels, the
//! subscription ledger and the risk gate.
//!
//! # Protocol
//!
//! - Every operation connects on demand; connect is serialized so concurrent
//!   callers never open two channel pairs
//! - Market data is fetched only under a subscription for the same
//!   `(symbol, kind)`
//! - Historical bar subscriptions are released right after the fetch, on
//!   success and failure; quote and order book subscriptions stand until
//!   [`GatewaySession::close`]
//! - Orders connect first, then pass the [`RiskGate`] before any
//!   trade-channel call

use std::slice;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::errors::{ConnectionError, GatewayError};
use crate::application::ports::{
    DaemonConnector, DaemonEndpoint, ModifyOrderRequest, PlaceOrderRequest, QuoteChannelPort,
    TradeChannelPort, UnlockCredential,
};
use crate::domain::account::{
    AccountBalance, MarginStatus, MaxBuyable, Position, ZeroBuyableReason,
};
use crate::domain::market_data::{
    BarPeriod, Financials, MarketSnapshot, OptionContract, OrderBook, PriceBar, Quote,
    SubscriptionKind, SubscriptionLedger,
};
use crate::domain::order_execution::{
    Deal, ModifyOperation, OrderIntent, OrderKind, OrderRecord, OrderSide, OrderStatus,
    TradingEnvironment,
};
use crate::domain::risk_management::RiskGate;
use crate::domain::shared::{OrderId, Symbol, SymbolNormalizer};

/// Upper bound on bars per historical request.
pub const MAX_BAR_COUNT: usize = 1000;

/// Widest expiry range, in days, the daemon accepts for one option chain
/// request.
pub const MAX_OPTION_CHAIN_SPAN_DAYS: i64 = 30;

// =============================================================================
// Types
// =============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No channels open.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Channels open and probed.
    Connected,
}

/// Immutable session parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Daemon location.
    pub endpoint: DaemonEndpoint,
    /// Trade unlock password, if any.
    pub unlock_credential: Option<UnlockCredential>,
    /// Environment every trade call is tagged with.
    pub environment: TradingEnvironment,
    /// Market prefix for unqualified tickers.
    pub default_market: String,
    /// Risk gate limit.
    pub max_order_value: Decimal,
}

struct Channels<Q, T> {
    quote: Arc<Q>,
    trade: Arc<T>,
}

impl<Q, T> Clone for Channels<Q, T> {
    fn clone(&self) -> Self {
        Self {
            quote: Arc::clone(&self.quote),
            trade: Arc::clone(&self.trade),
        }
    }
}

type ChannelPair<C> = Channels<<C as DaemonConnector>::Quote, <C as DaemonConnector>::Trade>;

// =============================================================================
// Session
// =============================================================================

/// Gateway Session - the single handle callers use to reach the daemon.
pub struct GatewaySession<C: DaemonConnector> {
    connector: C,
    config: SessionConfig,
    normalizer: SymbolNormalizer,
    risk_gate: RiskGate,
    state: RwLock<ConnectionState>,
    channels: Mutex<Option<ChannelPair<C>>>,
    ledger: SubscriptionLedger,
}

impl<C: DaemonConnector> GatewaySession<C> {
    /// Create a disconnected session.
    pub fn new(connector: C, config: SessionConfig) -> Self {
        Self {
            normalizer: SymbolNormalizer::new(config.default_market.clone()),
            risk_gate: RiskGate::new(config.max_order_value),
            connector,
            config,
            state: RwLock::new(ConnectionState::Disconnected),
            channels: Mutex::new(None),
            ledger: SubscriptionLedger::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Environment every trade call is tagged with.
    pub fn environment(&self) -> TradingEnvironment {
        self.config.environment
    }

    /// Risk gate applied to orders.
    pub fn risk_gate(&self) -> &RiskGate {
        &self.risk_gate
    }

    /// Subscriptions currently held on the daemon.
    pub fn subscriptions(&self) -> &SubscriptionLedger {
        &self.ledger
    }

    /// Canonicalize a raw ticker against the configured default market.
    pub fn normalize_symbol(&self, raw: &str) -> Result<Symbol, GatewayError> {
        Ok(self.normalizer.normalize(raw)?)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open and probe both channels. Idempotent.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        self.ensure_connected().await.map(|_| ())
    }

    async fn ensure_connected(&self) -> Result<ChannelPair<C>, ConnectionError> {
        let mut guard = self.channels.lock().await;
        if let Some(channels) = guard.as_ref() {
            return Ok(channels.clone());
        }

        *self.state.write() = ConnectionState::Connecting;
        tracing::info!(endpoint = %self.config.endpoint, "Connecting to daemon");

        match self.handshake().await {
            Ok(channels) => {
                *guard = Some(channels.clone());
                *self.state.write() = ConnectionState::Connected;
                tracing::info!(
                    endpoint = %self.config.endpoint,
                    environment = %self.config.environment,
                    "Connected to daemon (quote + trade)"
                );
                Ok(channels)
            }
            Err(e) => {
                *self.state.write() = ConnectionState::Disconnected;
                tracing::error!(error = %e, "Failed to connect to daemon");
                Err(e)
            }
        }
    }

    async fn handshake(&self) -> Result<ChannelPair<C>, ConnectionError> {
        let endpoint = &self.config.endpoint;

        let quote = self
            .connector
            .open_quote_channel(endpoint)
            .await
            .map_err(|e| ConnectionError::new(endpoint, format!("quote channel: {e}")))?;

        let trade = match self.connector.open_trade_channel(endpoint).await {
            Ok(trade) => trade,
            Err(e) => {
                close_quote_channel(&quote).await;
                return Err(ConnectionError::new(endpoint, format!("trade channel: {e}")));
            }
        };

        if let Err(e) = quote.get_global_state().await {
            close_quote_channel(&quote).await;
            close_trade_channel(&trade).await;
            return Err(ConnectionError::new(
                endpoint,
                format!("health probe failed: {e}"),
            ));
        }

        if let Some(credential) = &self.config.unlock_credential {
            tracing::info!("Unlocking trade channel");
            match trade.unlock_trade(credential).await {
                Ok(()) => tracing::info!("Trade channel unlocked"),
                Err(e) => tracing::warn!(error = %e, "Failed to unlock trade channel"),
            }
        }

        Ok(Channels {
            quote: Arc::new(quote),
            trade: Arc::new(trade),
        })
    }

    /// Release every subscription and close both channels.
    ///
    /// Best-effort: failures are logged, never returned. A no-op if the
    /// session never connected.
    pub async fn close(&self) {
        let mut guard = self.channels.lock().await;
        let Some(channels) = guard.take() else {
            tracing::debug!("Close requested on a disconnected session");
            return;
        };

        for (kind, symbols) in self.ledger.drain() {
            match channels.quote.unsubscribe(&symbols, &[kind]).await {
                Ok(()) => tracing::debug!(
                    kind = %kind,
                    count = symbols.len(),
                    "Released subscriptions"
                ),
                Err(e) => tracing::warn!(
                    kind = %kind,
                    count = symbols.len(),
                    error = %e,
                    "Failed to release subscriptions"
                ),
            }
        }

        close_quote_channel(channels.quote.as_ref()).await;
        close_trade_channel(channels.trade.as_ref()).await;

        *self.state.write() = ConnectionState::Disconnected;
        tracing::info!("Disconnected from daemon");
    }

    // -------------------------------------------------------------------------
    // Market data
    // -------------------------------------------------------------------------

    /// Latest quote. Leaves a standing quote subscription.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, GatewayError> {
        let symbol = self.normalize_symbol(symbol)?;
        self.quote_for(&symbol).await
    }

    async fn quote_for(&self, symbol: &Symbol) -> Result<Quote, GatewayError> {
        let channels = self.ensure_connected().await?;
        self.hold_standing(&channels, symbol, SubscriptionKind::Quote)
            .await?;

        let quotes = channels
            .quote
            .get_stock_quote(slice::from_ref(symbol))
            .await
            .map_err(|e| {
                tracing::error!(symbol = %symbol, error = %e, "Error fetching quote");
                GatewayError::daemon("get_stock_quote", e)
            })?;

        quotes
            .into_iter()
            .find(|quote| &quote.symbol == symbol)
            .ok_or_else(|| GatewayError::Daemon {
                operation: "get_stock_quote",
                message: format!("no quote returned for {symbol}"),
            })
    }

    /// Historical bars, ascending by time.
    ///
    /// `max_count` is clamped to [`MAX_BAR_COUNT`]. The bar subscription is
    /// released before returning, whether or not the fetch succeeded.
    pub async fn get_bars(
        &self,
        symbol: &str,
        period: BarPeriod,
        max_count: usize,
    ) -> Result<Vec<PriceBar>, GatewayError> {
        if max_count == 0 {
            return Err(GatewayError::invalid_input(
                "max_count",
                "must be at least 1",
            ));
        }
        let max_count = max_count.min(MAX_BAR_COUNT);
        let symbol = self.normalize_symbol(symbol)?;
        let channels = self.ensure_connected().await?;
        let kind = SubscriptionKind::Bars(period);

        if self.ledger.acquire(&symbol, kind) {
            if let Err(e) = channels
                .quote
                .subscribe(slice::from_ref(&symbol), &[kind])
                .await
            {
                self.ledger.release(&symbol, kind);
                return Err(GatewayError::subscription(&symbol, kind, e));
            }
            tracing::debug!(symbol = %symbol, kind = %kind, "Subscribed");
        }

        let fetched = channels
            .quote
            .request_history_bars(&symbol, period, max_count)
            .await;

        if self.ledger.release(&symbol, kind) {
            match channels
                .quote
                .unsubscribe(slice::from_ref(&symbol), &[kind])
                .await
            {
                Ok(()) => tracing::debug!(symbol = %symbol, kind = %kind, "Unsubscribed"),
                Err(e) => tracing::warn!(
                    symbol = %symbol,
                    kind = %kind,
                    error = %e,
                    "Failed to unsubscribe"
                ),
            }
        }

        let mut bars = fetched.map_err(|e| {
            tracing::error!(symbol = %symbol, period = %period, error = %e, "Error fetching bars");
            GatewayError::daemon("request_history_bars", e)
        })?;
        bars.sort_by_key(|bar| bar.time);
        Ok(bars)
    }

    /// Order book, at most `depth` levels per side. Leaves a standing
    /// order book subscription.
    pub async fn get_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBook, GatewayError> {
        if depth == 0 {
            return Err(GatewayError::invalid_input("depth", "must be at least 1"));
        }
        let symbol = self.normalize_symbol(symbol)?;
        let channels = self.ensure_connected().await?;
        self.hold_standing(&channels, &symbol, SubscriptionKind::OrderBook)
            .await?;

        let book = channels
            .quote
            .get_order_book(&symbol, depth)
            .await
            .map_err(|e| GatewayError::daemon("get_order_book", e))?;
        Ok(book.truncated(depth))
    }

    /// Snapshots for several symbols. Needs no subscription.
    pub async fn get_market_snapshot<S: AsRef<str> + Sync>(
        &self,
        symbols: &[S],
    ) -> Result<Vec<MarketSnapshot>, GatewayError> {
        if symbols.is_empty() {
            return Err(GatewayError::invalid_input(
                "symbols",
                "at least one symbol is required",
            ));
        }
        let symbols = symbols
            .iter()
            .map(|raw| self.normalize_symbol(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let channels = self.ensure_connected().await?;

        channels
            .quote
            .get_market_snapshot(&symbols)
            .await
            .map_err(|e| GatewayError::daemon("get_market_snapshot", e))
    }

    /// Valuation figures for one symbol, read from its snapshot.
    pub async fn get_financials(&self, symbol: &str) -> Result<Financials, GatewayError> {
        let symbol = self.normalize_symbol(symbol)?;
        let snapshots = self.get_market_snapshot(&[symbol.as_str()]).await?;
        snapshots
            .into_iter()
            .find(|snapshot| snapshot.symbol == symbol)
            .map(|snapshot| snapshot.financials())
            .ok_or_else(|| GatewayError::Daemon {
                operation: "get_market_snapshot",
                message: format!("no snapshot returned for {symbol}"),
            })
    }

    /// Option contracts on `symbol` expiring within `[start, end]`, ordered
    /// by expiry then strike. Needs no subscription.
    ///
    /// The range may span at most [`MAX_OPTION_CHAIN_SPAN_DAYS`] days.
    pub async fn get_option_chain(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OptionContract>, GatewayError> {
        if end < start {
            return Err(GatewayError::invalid_input(
                "end_date",
                "must not be before start_date",
            ));
        }
        if (end - start).num_days() > MAX_OPTION_CHAIN_SPAN_DAYS {
            return Err(GatewayError::invalid_input(
                "end_date",
                format!("expiry range may span at most {MAX_OPTION_CHAIN_SPAN_DAYS} days"),
            ));
        }
        let underlying = self.normalize_symbol(symbol)?;
        let channels = self.ensure_connected().await?;

        let mut chain = channels
            .quote
            .get_option_chain(&underlying, start, end)
            .await
            .map_err(|e| {
                tracing::error!(symbol = %underlying, error = %e, "Error fetching option chain");
                GatewayError::daemon("get_option_chain", e)
            })?;
        chain.sort_by(|a, b| {
            a.expiry
                .cmp(&b.expiry)
                .then(a.strike_price.cmp(&b.strike_price))
        });
        Ok(chain)
    }

    async fn hold_standing(
        &self,
        channels: &ChannelPair<C>,
        symbol: &Symbol,
        kind: SubscriptionKind,
    ) -> Result<(), GatewayError> {
        if !self.ledger.acquire_standing(symbol, kind) {
            return Ok(());
        }
        if let Err(e) = channels
            .quote
            .subscribe(slice::from_ref(symbol), &[kind])
            .await
        {
            self.ledger.release(symbol, kind);
            tracing::error!(symbol = %symbol, kind = %kind, error = %e, "Subscription failed");
            return Err(GatewayError::subscription(symbol, kind, e));
        }
        tracing::debug!(symbol = %symbol, kind = %kind, "Subscribed (standing)");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Account
    // -------------------------------------------------------------------------

    /// Account funds.
    pub async fn get_balance(&self) -> Result<AccountBalance, GatewayError> {
        let channels = self.ensure_connected().await?;
        channels
            .trade
            .account_info_query(self.config.environment)
            .await
            .map_err(|e| GatewayError::daemon("account_info_query", e))
    }

    /// Margin and risk details derived from the account funds.
    pub async fn get_margin_ratio(&self) -> Result<MarginStatus, GatewayError> {
        let status = self.get_balance().await?.margin_status();
        if status.has_margin_deficit() {
            tracing::warn!(
                risk_level = %status.risk_level,
                margin_call_margin = %status.margin_call_margin,
                "Account is under a margin call"
            );
        }
        Ok(status)
    }

    /// Held positions.
    pub async fn get_positions(&self) -> Result<Vec<Position>, GatewayError> {
        let channels = self.ensure_connected().await?;
        channels
            .trade
            .position_list_query(self.config.environment)
            .await
            .map_err(|e| GatewayError::daemon("position_list_query", e))
    }

    /// Orders, optionally for one symbol and restricted to `statuses`.
    /// An empty `statuses` returns orders in every status.
    pub async fn get_orders(
        &self,
        symbol: Option<&str>,
        statuses: &[OrderStatus],
    ) -> Result<Vec<OrderRecord>, GatewayError> {
        let symbol = symbol.map(|raw| self.normalize_symbol(raw)).transpose()?;
        let channels = self.ensure_connected().await?;
        channels
            .trade
            .order_list_query(symbol.as_ref(), statuses, self.config.environment)
            .await
            .map_err(|e| GatewayError::daemon("order_list_query", e))
    }

    /// Today's deals, optionally for one symbol.
    pub async fn get_deals(&self, symbol: Option<&str>) -> Result<Vec<Deal>, GatewayError> {
        let symbol = symbol.map(|raw| self.normalize_symbol(raw)).transpose()?;
        let channels = self.ensure_connected().await?;
        channels
            .trade
            .deal_list_query(symbol.as_ref(), self.config.environment)
            .await
            .map_err(|e| GatewayError::daemon("deal_list_query", e))
    }

    /// Maximum buyable quantity at `price` (zero means the last price).
    ///
    /// A zero result carries an explanation; failing to explain it never
    /// fails the call.
    pub async fn get_max_buyable(
        &self,
        symbol: &str,
        price: Decimal,
    ) -> Result<MaxBuyable, GatewayError> {
        if price < Decimal::ZERO {
            return Err(GatewayError::invalid_input("price", "must not be negative"));
        }
        let symbol = self.normalize_symbol(symbol)?;
        let channels = self.ensure_connected().await?;

        let quantity = channels
            .trade
            .max_buyable_query(&symbol, price, self.config.environment)
            .await
            .map_err(|e| GatewayError::daemon("max_buyable_query", e))?;

        let zero_reason = if quantity.is_zero() {
            Some(self.explain_zero_buyable(&symbol, price).await)
        } else {
            None
        };

        Ok(MaxBuyable {
            symbol,
            price,
            quantity,
            zero_reason,
        })
    }

    async fn explain_zero_buyable(&self, symbol: &Symbol, price: Decimal) -> ZeroBuyableReason {
        let quote = match self.quote_for(symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                return ZeroBuyableReason::Undetermined {
                    message: e.to_string(),
                };
            }
        };
        let balance = match self.get_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                return ZeroBuyableReason::Undetermined {
                    message: e.to_string(),
                };
            }
        };
        let price = if price > Decimal::ZERO {
            price
        } else {
            quote.last_price
        };
        ZeroBuyableReason::explain(quote.lot_size, price, balance.power)
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Validate, risk-check and place an order.
    ///
    /// Invalid input is rejected before connecting. Nothing is sent to the
    /// trade channel unless the risk gate allows it.
    pub async fn place_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Option<Decimal>,
        side: OrderSide,
        kind: OrderKind,
    ) -> Result<OrderRecord, GatewayError> {
        let symbol = self.normalize_symbol(symbol)?;
        let intent = OrderIntent::new(
            symbol,
            side,
            quantity,
            price,
            kind,
            self.config.environment,
        )?;

        let channels = self.ensure_connected().await?;
        let price = self.effective_price(&intent).await;
        self.risk_gate
            .check(intent.symbol(), intent.quantity(), price)
            .into_result()?;

        tracing::info!(
            symbol = %intent.symbol(),
            side = %intent.side(),
            kind = %intent.kind(),
            quantity = %intent.quantity(),
            price = %price,
            environment = %intent.environment(),
            "Placing order"
        );

        let record = channels
            .trade
            .place_order(PlaceOrderRequest {
                symbol: intent.symbol().clone(),
                side: intent.side(),
                kind: intent.kind(),
                quantity: intent.quantity(),
                price,
                environment: intent.environment(),
            })
            .await
            .map_err(|e| {
                tracing::error!(symbol = %intent.symbol(), error = %e, "Order failed");
                GatewayError::daemon("place_order", e)
            })?;

        tracing::info!(order_id = %record.order_id, status = %record.status, "Order placed");
        Ok(record)
    }

    async fn effective_price(&self, intent: &OrderIntent) -> Decimal {
        if !intent.needs_reference_price() {
            return intent.fallback_price();
        }
        match self.quote_for(intent.symbol()).await {
            Ok(quote) => quote.last_price,
            Err(e) => {
                let fallback = intent.fallback_price();
                tracing::warn!(
                    symbol = %intent.symbol(),
                    error = %e,
                    fallback = %fallback,
                    "Reference quote unavailable, using caller price for risk check"
                );
                fallback
            }
        }
    }

    /// Amend quantity and price of an open order.
    ///
    /// The new terms pass the risk gate before the daemon is called.
    pub async fn modify_order(
        &self,
        order_id: &OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderRecord, GatewayError> {
        if quantity <= Decimal::ZERO {
            return Err(GatewayError::invalid_input("quantity", "must be positive"));
        }
        if price < Decimal::ZERO {
            return Err(GatewayError::invalid_input("price", "must not be negative"));
        }
        let channels = self.ensure_connected().await?;
        self.risk_gate
            .check_amendment(order_id, quantity, price)
            .into_result()?;

        self.send_modification(&channels, ModifyOperation::Normal, order_id, quantity, price)
            .await
    }

    /// Cancel an open order.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<OrderRecord, GatewayError> {
        let channels = self.ensure_connected().await?;
        self.send_modification(
            &channels,
            ModifyOperation::Cancel,
            order_id,
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .await
    }

    async fn send_modification(
        &self,
        channels: &ChannelPair<C>,
        operation: ModifyOperation,
        order_id: &OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderRecord, GatewayError> {
        tracing::info!(
            order_id = %order_id,
            operation = %operation,
            quantity = %quantity,
            price = %price,
            environment = %self.config.environment,
            "Modifying order"
        );

        channels
            .trade
            .modify_order(ModifyOrderRequest {
                operation,
                order_id: order_id.clone(),
                quantity,
                price,
                environment: self.config.environment,
            })
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order_id, error = %e, "Order modification failed");
                GatewayError::daemon("modify_order", e)
            })
    }
}

async fn close_quote_channel<Q: QuoteChannelPort + ?Sized>(quote: &Q) {
    if let Err(e) = quote.close().await {
        tracing::warn!(error = %e, "Failed to close quote channel");
    }
}

async fn close_trade_channel<T: TradeChannelPort + ?Sized>(trade: &T) {
    if let Err(e) = trade.close().await {
        tracing::warn!(error = %e, "Failed to close trade channel");
    }
}
