//! Simulated Daemon
//!
//! In-process stand-in for the market-data / order-execution daemon.
//! Enforces the same rules the real daemon does: data fetches need a live
//! subscription, subscriptions count against a quota, and real-environment
//! trades need an unlocked trade channel.
//!
//! Every call is recorded, and any operation can be made to fail, so the
//! session's protocol can be observed from tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::ports::{
    DaemonConnector, DaemonEndpoint, DaemonFailure, DaemonReply, GlobalState, ModifyOrderRequest,
    PlaceOrderRequest, QuoteChannelPort, TradeChannelPort, UnlockCredential,
};
use crate::domain::account::{AccountBalance, Position, RiskLevel};
use crate::domain::market_data::{
    BarPeriod, BookLevel, MarketSnapshot, OptionContract, OrderBook, PriceBar, Quote,
    SubscriptionKind, Valuation,
};
use crate::domain::order_execution::{
    Deal, ModifyOperation, OrderKind, OrderRecord, OrderStatus, TradingEnvironment,
};
use crate::domain::shared::{DealId, OrderId, Symbol};

/// Default subscription quota.
pub const DEFAULT_SUBSCRIPTION_QUOTA: usize = 100;

const SERVER_VERSION: &str = "simulated-1.0";

// =============================================================================
// State
// =============================================================================

#[derive(Debug)]
struct DaemonState {
    reachable: bool,
    failures: HashMap<&'static str, String>,
    calls: Vec<&'static str>,
    open_channels: usize,
    subscription_quota: usize,
    subscriptions: HashSet<(Symbol, SubscriptionKind)>,
    unlock_password: Option<String>,
    unlocked: bool,
    quotes: HashMap<Symbol, Quote>,
    bars: HashMap<(Symbol, BarPeriod), Vec<PriceBar>>,
    books: HashMap<Symbol, OrderBook>,
    suspended: HashSet<Symbol>,
    valuations: HashMap<Symbol, Valuation>,
    options: Vec<OptionContract>,
    max_buyable: HashMap<Symbol, Decimal>,
    balance: AccountBalance,
    positions: Vec<Position>,
    orders: Vec<OrderRecord>,
    deals: Vec<Deal>,
}

impl Default for DaemonState {
    fn default() -> Self {
        Self {
            reachable: true,
            failures: HashMap::new(),
            calls: Vec::new(),
            open_channels: 0,
            subscription_quota: DEFAULT_SUBSCRIPTION_QUOTA,
            subscriptions: HashSet::new(),
            unlock_password: None,
            unlocked: false,
            quotes: HashMap::new(),
            bars: HashMap::new(),
            books: HashMap::new(),
            suspended: HashSet::new(),
            valuations: HashMap::new(),
            options: Vec::new(),
            max_buyable: HashMap::new(),
            balance: AccountBalance {
                cash: dec!(100000),
                power: dec!(100000),
                total_assets: dec!(100000),
                net_assets: dec!(100000),
                market_value: Decimal::ZERO,
                margin_call_margin: Decimal::ZERO,
                risk_level: RiskLevel::Safe,
                currency: "HKD".to_string(),
                environment: TradingEnvironment::Simulated,
            },
            positions: Vec::new(),
            orders: Vec::new(),
            deals: Vec::new(),
        }
    }
}

impl DaemonState {
    fn require_subscription(&self, symbol: &Symbol, kind: SubscriptionKind) -> DaemonReply<()> {
        if self.subscriptions.contains(&(symbol.clone(), kind)) {
            Ok(())
        } else {
            Err(DaemonFailure::new(format!(
                "{symbol} is not subscribed to {kind}"
            )))
        }
    }

    fn quote(&self, symbol: &Symbol) -> DaemonReply<&Quote> {
        self.quotes
            .get(symbol)
            .ok_or_else(|| DaemonFailure::new(format!("unknown security {symbol}")))
    }

    fn require_unlocked(&self, environment: TradingEnvironment) -> DaemonReply<()> {
        if environment.is_real() && !self.unlocked {
            return Err(DaemonFailure::new("trade channel is locked"));
        }
        Ok(())
    }

    fn computed_max_buyable(&self, symbol: &Symbol, price: Decimal) -> DaemonReply<Decimal> {
        if let Some(quantity) = self.max_buyable.get(symbol) {
            return Ok(*quantity);
        }
        let quote = self.quote(symbol)?;
        let price = if price > Decimal::ZERO {
            price
        } else {
            quote.last_price
        };
        let lot_size = Decimal::from(quote.lot_size);
        // No lot is affordable once the lot cost leaves the Decimal range.
        let Some(cost_per_lot) = price.checked_mul(lot_size) else {
            return Ok(Decimal::ZERO);
        };
        if cost_per_lot <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let lots = (self.balance.power / cost_per_lot).floor();
        Ok(lots.checked_mul(lot_size).unwrap_or(Decimal::ZERO))
    }
}

// =============================================================================
// Daemon handle
// =============================================================================

/// Simulated daemon. Clones share state, so a test can keep a handle after
/// passing one to the session.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDaemon {
    state: Arc<Mutex<DaemonState>>,
}

impl SimulatedDaemon {
    /// Create a reachable daemon with an empty market and a funded account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self, operation: &'static str) -> DaemonReply<MutexGuard<'_, DaemonState>> {
        enter(&self.state, operation)
    }

    // -------------------------------------------------------------------------
    // Control
    // -------------------------------------------------------------------------

    /// Make the daemon refuse (or accept) new channels.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    /// Fail every subsequent call of `operation` with `message`.
    pub fn fail_operation(&self, operation: &'static str, message: impl Into<String>) {
        self.state.lock().failures.insert(operation, message.into());
    }

    /// Stop failing `operation`.
    pub fn restore_operation(&self, operation: &'static str) {
        self.state.lock().failures.remove(operation);
    }

    /// Limit the number of concurrent subscriptions.
    pub fn set_subscription_quota(&self, quota: usize) {
        self.state.lock().subscription_quota = quota;
    }

    /// Require `password` for `unlock_trade`.
    pub fn set_unlock_password(&self, password: impl Into<String>) {
        self.state.lock().unlock_password = Some(password.into());
    }

    // -------------------------------------------------------------------------
    // Market seeding
    // -------------------------------------------------------------------------

    /// Install or replace a quote.
    pub fn set_quote(&self, quote: Quote) {
        self.state.lock().quotes.insert(quote.symbol.clone(), quote);
    }

    /// Install a flat quote at `last_price` with the given board lot.
    pub fn seed_quote(&self, symbol: &Symbol, last_price: Decimal, lot_size: u32) {
        self.set_quote(Quote {
            symbol: symbol.clone(),
            last_price,
            open_price: last_price,
            high_price: last_price,
            low_price: last_price,
            prev_close_price: last_price,
            volume: 0,
            turnover: Decimal::ZERO,
            lot_size,
            updated_at: Utc::now(),
        });
    }

    /// Install a bar series. Stored ascending by time.
    pub fn set_bars(&self, symbol: &Symbol, period: BarPeriod, mut bars: Vec<PriceBar>) {
        bars.sort_by_key(|bar| bar.time);
        self.state
            .lock()
            .bars
            .insert((symbol.clone(), period), bars);
    }

    /// Install a deterministic oscillating series of `count` bars around
    /// `base_price`.
    pub fn seed_series(&self, symbol: &Symbol, period: BarPeriod, count: usize, base_price: f64) {
        self.set_bars(symbol, period, synthetic_series(period, count, base_price));
    }

    /// Install or replace an order book.
    pub fn set_order_book(&self, book: OrderBook) {
        self.state.lock().books.insert(book.symbol.clone(), book);
    }

    /// Mark a symbol as suspended in snapshots.
    pub fn suspend(&self, symbol: &Symbol) {
        self.state.lock().suspended.insert(symbol.clone());
    }

    /// Publish valuation ratios with the symbol's snapshots.
    pub fn set_valuation(&self, symbol: &Symbol, valuation: Valuation) {
        self.state
            .lock()
            .valuations
            .insert(symbol.clone(), valuation);
    }

    /// List an option contract on its underlying.
    pub fn add_option(&self, contract: OptionContract) {
        self.state.lock().options.push(contract);
    }

    // -------------------------------------------------------------------------
    // Account seeding
    // -------------------------------------------------------------------------

    /// Replace the account funds.
    pub fn set_balance(&self, balance: AccountBalance) {
        self.state.lock().balance = balance;
    }

    /// Add a position.
    pub fn add_position(&self, position: Position) {
        self.state.lock().positions.push(position);
    }

    /// Fix the max-buyable answer for a symbol instead of deriving it.
    pub fn set_max_buyable(&self, symbol: &Symbol, quantity: Decimal) {
        self.state
            .lock()
            .max_buyable
            .insert(symbol.clone(), quantity);
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    /// Number of calls of `operation`.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Channels opened and not yet closed.
    #[must_use]
    pub fn open_channels(&self) -> usize {
        self.state.lock().open_channels
    }

    /// Whether `(symbol, kind)` is subscribed on the daemon.
    #[must_use]
    pub fn is_subscribed(&self, symbol: &Symbol, kind: SubscriptionKind) -> bool {
        self.state
            .lock()
            .subscriptions
            .contains(&(symbol.clone(), kind))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// Whether the trade channel has been unlocked.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.state.lock().unlocked
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.state.lock().orders.clone()
    }
}

fn enter<'a>(
    state: &'a Mutex<DaemonState>,
    operation: &'static str,
) -> DaemonReply<MutexGuard<'a, DaemonState>> {
    let mut guard = state.lock();
    guard.calls.push(operation);
    if let Some(message) = guard.failures.get(operation) {
        return Err(DaemonFailure::new(message.clone()));
    }
    Ok(guard)
}

/// Bar spacing for synthetic series.
fn period_step(period: BarPeriod) -> Duration {
    match period {
        BarPeriod::OneMinute => Duration::minutes(1),
        BarPeriod::ThreeMinutes => Duration::minutes(3),
        BarPeriod::FiveMinutes => Duration::minutes(5),
        BarPeriod::FifteenMinutes => Duration::minutes(15),
        BarPeriod::ThirtyMinutes => Duration::minutes(30),
        BarPeriod::SixtyMinutes => Duration::hours(1),
        BarPeriod::Day => Duration::days(1),
        BarPeriod::Week => Duration::weeks(1),
        BarPeriod::Month => Duration::days(30),
        BarPeriod::Year => Duration::days(365),
    }
}

/// Deterministic series: a slow drift plus a sine swing, ending now.
#[must_use]
pub fn synthetic_series(period: BarPeriod, count: usize, base_price: f64) -> Vec<PriceBar> {
    let step = period_step(period);
    let end: DateTime<Utc> = Utc::now();
    let mut previous_close = base_price;

    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = base_price * (1.0 + 0.03 * (x / 4.0).sin() + 0.001 * x);
            let open = previous_close;
            let high = open.max(close) * 1.005;
            let low = open.min(close) * 0.995;
            previous_close = close;
            let offset = i32::try_from(count - i).unwrap_or(i32::MAX);
            PriceBar::new(
                end - step * offset,
                open,
                high,
                low,
                close,
                1_000.0 + 25.0 * x,
            )
        })
        .collect()
}

// =============================================================================
// Connector
// =============================================================================

#[async_trait]
impl DaemonConnector for SimulatedDaemon {
    type Quote = SimulatedQuoteChannel;
    type Trade = SimulatedTradeChannel;

    async fn open_quote_channel(&self, endpoint: &DaemonEndpoint) -> DaemonReply<Self::Quote> {
        let mut state = self.enter("open_quote_channel")?;
        if !state.reachable {
            return Err(DaemonFailure::new(format!("connection refused by {endpoint}")));
        }
        state.open_channels += 1;
        Ok(SimulatedQuoteChannel {
            state: Arc::clone(&self.state),
        })
    }

    async fn open_trade_channel(&self, endpoint: &DaemonEndpoint) -> DaemonReply<Self::Trade> {
        let mut state = self.enter("open_trade_channel")?;
        if !state.reachable {
            return Err(DaemonFailure::new(format!("connection refused by {endpoint}")));
        }
        state.open_channels += 1;
        Ok(SimulatedTradeChannel {
            state: Arc::clone(&self.state),
        })
    }
}

// =============================================================================
// Quote channel
// =============================================================================

/// Quote channel of a [`SimulatedDaemon`].
#[derive(Debug)]
pub struct SimulatedQuoteChannel {
    state: Arc<Mutex<DaemonState>>,
}

#[async_trait]
impl QuoteChannelPort for SimulatedQuoteChannel {
    async fn get_global_state(&self) -> DaemonReply<GlobalState> {
        let state = enter(&self.state, "get_global_state")?;
        Ok(GlobalState {
            server_version: SERVER_VERSION.to_string(),
            quote_logged_in: state.reachable,
            trade_logged_in: state.reachable,
        })
    }

    async fn subscribe(&self, symbols: &[Symbol], kinds: &[SubscriptionKind]) -> DaemonReply<()> {
        let mut state = enter(&self.state, "subscribe")?;
        for symbol in symbols {
            state.quote(symbol)?;
        }

        let requested: Vec<_> = symbols
            .iter()
            .flat_map(|symbol| kinds.iter().map(move |kind| (symbol.clone(), *kind)))
            .filter(|key| !state.subscriptions.contains(key))
            .collect();

        if state.subscriptions.len() + requested.len() > state.subscription_quota {
            return Err(DaemonFailure::new(format!(
                "subscription quota of {} exceeded",
                state.subscription_quota
            )));
        }
        state.subscriptions.extend(requested);
        Ok(())
    }

    async fn unsubscribe(
        &self,
        symbols: &[Symbol],
        kinds: &[SubscriptionKind],
    ) -> DaemonReply<()> {
        let mut state = enter(&self.state, "unsubscribe")?;
        for symbol in symbols {
            for kind in kinds {
                state.subscriptions.remove(&(symbol.clone(), *kind));
            }
        }
        Ok(())
    }

    async fn get_stock_quote(&self, symbols: &[Symbol]) -> DaemonReply<Vec<Quote>> {
        let state = enter(&self.state, "get_stock_quote")?;
        symbols
            .iter()
            .map(|symbol| {
                state.require_subscription(symbol, SubscriptionKind::Quote)?;
                state.quote(symbol).cloned()
            })
            .collect()
    }

    async fn get_market_snapshot(&self, symbols: &[Symbol]) -> DaemonReply<Vec<MarketSnapshot>> {
        let state = enter(&self.state, "get_market_snapshot")?;
        symbols
            .iter()
            .map(|symbol| {
                let quote = state.quote(symbol)?;
                Ok(MarketSnapshot {
                    symbol: symbol.clone(),
                    last_price: quote.last_price,
                    prev_close_price: quote.prev_close_price,
                    volume: quote.volume,
                    turnover: quote.turnover,
                    lot_size: quote.lot_size,
                    suspended: state.suspended.contains(symbol),
                    valuation: state.valuations.get(symbol).copied().unwrap_or_default(),
                    updated_at: quote.updated_at,
                })
            })
            .collect()
    }

    async fn get_order_book(&self, symbol: &Symbol, depth: usize) -> DaemonReply<OrderBook> {
        let state = enter(&self.state, "get_order_book")?;
        state.require_subscription(symbol, SubscriptionKind::OrderBook)?;

        if let Some(book) = state.books.get(symbol) {
            return Ok(book.clone().truncated(depth));
        }

        // One level either side of the last price when no book was seeded.
        let quote = state.quote(symbol)?;
        let tick = dec!(0.01);
        Ok(OrderBook {
            symbol: symbol.clone(),
            bids: vec![BookLevel {
                price: quote.last_price - tick,
                volume: u64::from(quote.lot_size),
                order_count: 1,
            }],
            asks: vec![BookLevel {
                price: quote.last_price + tick,
                volume: u64::from(quote.lot_size),
                order_count: 1,
            }],
        }
        .truncated(depth))
    }

    async fn request_history_bars(
        &self,
        symbol: &Symbol,
        period: BarPeriod,
        max_count: usize,
    ) -> DaemonReply<Vec<PriceBar>> {
        let state = enter(&self.state, "request_history_bars")?;
        state.require_subscription(symbol, SubscriptionKind::Bars(period))?;

        let bars = state
            .bars
            .get(&(symbol.clone(), period))
            .ok_or_else(|| DaemonFailure::new(format!("no {period} history for {symbol}")))?;
        let start = bars.len().saturating_sub(max_count);
        Ok(bars[start..].to_vec())
    }

    async fn get_option_chain(
        &self,
        underlying: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DaemonReply<Vec<OptionContract>> {
        let state = enter(&self.state, "get_option_chain")?;
        state.quote(underlying)?;
        Ok(state
            .options
            .iter()
            .filter(|contract| &contract.underlying == underlying)
            .filter(|contract| contract.expires_within(start, end))
            .cloned()
            .collect())
    }

    async fn close(&self) -> DaemonReply<()> {
        let mut state = enter(&self.state, "close_quote_channel")?;
        state.open_channels = state.open_channels.saturating_sub(1);
        Ok(())
    }
}

// =============================================================================
// Trade channel
// =============================================================================

/// Trade channel of a [`SimulatedDaemon`].
#[derive(Debug)]
pub struct SimulatedTradeChannel {
    state: Arc<Mutex<DaemonState>>,
}

#[async_trait]
impl TradeChannelPort for SimulatedTradeChannel {
    async fn unlock_trade(&self, credential: &UnlockCredential) -> DaemonReply<()> {
        let mut state = enter(&self.state, "unlock_trade")?;
        if state
            .unlock_password
            .as_deref()
            .is_some_and(|expected| expected != credential.expose())
        {
            return Err(DaemonFailure::new("unlock password incorrect"));
        }
        state.unlocked = true;
        Ok(())
    }

    async fn position_list_query(
        &self,
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<Position>> {
        let state = enter(&self.state, "position_list_query")?;
        Ok(state
            .positions
            .iter()
            .filter(|position| position.environment == environment)
            .cloned()
            .collect())
    }

    async fn account_info_query(
        &self,
        environment: TradingEnvironment,
    ) -> DaemonReply<AccountBalance> {
        let state = enter(&self.state, "account_info_query")?;
        Ok(AccountBalance {
            environment,
            ..state.balance.clone()
        })
    }

    async fn order_list_query(
        &self,
        symbol: Option<&Symbol>,
        statuses: &[OrderStatus],
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<OrderRecord>> {
        let state = enter(&self.state, "order_list_query")?;
        Ok(state
            .orders
            .iter()
            .filter(|order| order.environment == environment)
            .filter(|order| symbol.is_none_or(|s| &order.symbol == s))
            .filter(|order| statuses.is_empty() || statuses.contains(&order.status))
            .cloned()
            .collect())
    }

    async fn deal_list_query(
        &self,
        symbol: Option<&Symbol>,
        environment: TradingEnvironment,
    ) -> DaemonReply<Vec<Deal>> {
        let state = enter(&self.state, "deal_list_query")?;
        Ok(state
            .deals
            .iter()
            .filter(|deal| deal.environment == environment)
            .filter(|deal| symbol.is_none_or(|s| &deal.symbol == s))
            .cloned()
            .collect())
    }

    async fn max_buyable_query(
        &self,
        symbol: &Symbol,
        price: Decimal,
        _environment: TradingEnvironment,
    ) -> DaemonReply<Decimal> {
        let state = enter(&self.state, "max_buyable_query")?;
        state.computed_max_buyable(symbol, price)
    }

    async fn place_order(&self, request: PlaceOrderRequest) -> DaemonReply<OrderRecord> {
        let mut state = enter(&self.state, "place_order")?;
        state.require_unlocked(request.environment)?;
        let fill_price = match request.kind {
            OrderKind::Market => Some(state.quote(&request.symbol)?.last_price),
            OrderKind::Limit => None,
        };

        let now = Utc::now();
        let mut record = OrderRecord {
            order_id: OrderId::generate(),
            symbol: request.symbol,
            side: request.side,
            kind: request.kind,
            quantity: request.quantity,
            price: request.price,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            status: OrderStatus::Submitted,
            environment: request.environment,
            created_at: now,
            updated_at: now,
        };

        // Market orders fill in full at the last price.
        if let Some(price) = fill_price {
            record.filled_quantity = record.quantity;
            record.avg_fill_price = Some(price);
            record.status = OrderStatus::Filled;
            state.deals.push(Deal {
                deal_id: DealId::generate(),
                order_id: record.order_id.clone(),
                symbol: record.symbol.clone(),
                side: record.side,
                quantity: record.quantity,
                price,
                environment: record.environment,
                executed_at: now,
            });
        }

        state.orders.push(record.clone());
        Ok(record)
    }

    async fn modify_order(&self, request: ModifyOrderRequest) -> DaemonReply<OrderRecord> {
        let mut state = enter(&self.state, "modify_order")?;
        state.require_unlocked(request.environment)?;

        let order = state
            .orders
            .iter_mut()
            .find(|order| order.order_id == request.order_id)
            .ok_or_else(|| DaemonFailure::new(format!("unknown order {}", request.order_id)))?;

        if order.status.is_terminal() {
            return Err(DaemonFailure::new(format!(
                "order {} is {}",
                order.order_id, order.status
            )));
        }

        match request.operation {
            ModifyOperation::Cancel => order.status = OrderStatus::Cancelled,
            ModifyOperation::Normal => {
                order.quantity = request.quantity;
                order.price = request.price;
            }
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn close(&self) -> DaemonReply<()> {
        let mut state = enter(&self.state, "close_trade_channel")?;
        state.open_channels = state.open_channels.saturating_sub(1);
        Ok(())
    }
}
