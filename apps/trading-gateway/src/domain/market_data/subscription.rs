//! Subscription Ledger
//!
//! Tracks every daemon subscription the session holds so each one is
//! released exactly once.
//!
//! # Design
//!
//! Entries are reference counted per `(symbol, kind)`:
//! - One-shot fetches (historical bars) acquire and release around the call
//! - Standing subscriptions (quotes, order book) are held once until close
//!
//! Only the 0→1 and 1→0 transitions require a daemon call.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::value_objects::BarPeriod;
use crate::domain::shared::Symbol;

// =============================================================================
// Types
// =============================================================================

/// Data kind a subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionKind {
    /// Real-time quote.
    Quote,
    /// Order book depth.
    OrderBook,
    /// Bars of a given period.
    Bars(BarPeriod),
}

impl SubscriptionKind {
    /// Returns true if the subscription stands until the session closes.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        matches!(self, Self::Quote | Self::OrderBook)
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quote => write!(f, "QUOTE"),
            Self::OrderBook => write!(f, "ORDER_BOOK"),
            Self::Bars(period) => write!(f, "BARS_{period}"),
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Reference-counted record of active daemon subscriptions.
///
/// ```rust
/// use trading_gateway::domain::market_data::{SubscriptionKind, SubscriptionLedger};
/// use trading_gateway::domain::shared::Symbol;
///
/// let ledger = SubscriptionLedger::new();
/// let symbol = Symbol::normalize("00700", "HK").unwrap();
///
/// // First holder must subscribe upstream
/// assert!(ledger.acquire(&symbol, SubscriptionKind::Quote));
/// // Second holder piggybacks
/// assert!(!ledger.acquire(&symbol, SubscriptionKind::Quote));
///
/// assert!(!ledger.release(&symbol, SubscriptionKind::Quote));
/// // Last holder must unsubscribe upstream
/// assert!(ledger.release(&symbol, SubscriptionKind::Quote));
/// ```
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    refcounts: RwLock<HashMap<(Symbol, SubscriptionKind), usize>>,
}

impl SubscriptionLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a reference on `(symbol, kind)`.
    ///
    /// Returns true if the count went 0→1 and the daemon must be asked
    /// to subscribe.
    pub fn acquire(&self, symbol: &Symbol, kind: SubscriptionKind) -> bool {
        let mut refcounts = self.refcounts.write();
        let count = refcounts.entry((symbol.clone(), kind)).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Hold `(symbol, kind)` without stacking references.
    ///
    /// Returns true if it was not yet held and the daemon must be asked
    /// to subscribe.
    pub fn acquire_standing(&self, symbol: &Symbol, kind: SubscriptionKind) -> bool {
        let mut refcounts = self.refcounts.write();
        let key = (symbol.clone(), kind);
        if refcounts.contains_key(&key) {
            return false;
        }
        refcounts.insert(key, 1);
        true
    }

    /// Drop a reference on `(symbol, kind)`.
    ///
    /// Returns true if the count went 1→0 and the daemon must be asked
    /// to unsubscribe. Releasing an untracked entry is a no-op.
    pub fn release(&self, symbol: &Symbol, kind: SubscriptionKind) -> bool {
        let mut refcounts = self.refcounts.write();
        let key = (symbol.clone(), kind);
        let Some(count) = refcounts.get_mut(&key) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            refcounts.remove(&key);
            return true;
        }
        false
    }

    /// Returns true if `(symbol, kind)` is currently held.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol, kind: SubscriptionKind) -> bool {
        self.refcounts.read().contains_key(&(symbol.clone(), kind))
    }

    /// Symbols currently held for `kind`, sorted.
    #[must_use]
    pub fn active_symbols(&self, kind: SubscriptionKind) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self
            .refcounts
            .read()
            .keys()
            .filter(|(_, k)| *k == kind)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }

    /// Number of distinct `(symbol, kind)` entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.refcounts.read().len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refcounts.read().is_empty()
    }

    /// Remove everything, grouped by kind for batched unsubscribes.
    pub fn drain(&self) -> BTreeMap<SubscriptionKind, Vec<Symbol>> {
        let mut grouped: BTreeMap<SubscriptionKind, Vec<Symbol>> = BTreeMap::new();
        for (symbol, kind) in self.refcounts.write().drain().map(|(key, _)| key) {
            grouped.entry(kind).or_default().push(symbol);
        }
        for symbols in grouped.values_mut() {
            symbols.sort();
        }
        grouped
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(raw: &str) -> Symbol {
        Symbol::normalize(raw, "HK").unwrap()
    }

    #[test]
    fn acquire_and_release_report_transitions() {
        let ledger = SubscriptionLedger::new();
        let kind = SubscriptionKind::Bars(BarPeriod::Day);

        assert!(ledger.acquire(&sym("00700"), kind));
        assert!(!ledger.acquire(&sym("00700"), kind));
        assert_eq!(ledger.len(), 1);

        assert!(!ledger.release(&sym("00700"), kind));
        assert!(ledger.contains(&sym("00700"), kind));
        assert!(ledger.release(&sym("00700"), kind));
        assert!(ledger.is_empty());
    }

    #[test]
    fn standing_does_not_stack() {
        let ledger = SubscriptionLedger::new();

        assert!(ledger.acquire_standing(&sym("00700"), SubscriptionKind::Quote));
        assert!(!ledger.acquire_standing(&sym("00700"), SubscriptionKind::Quote));

        // A single release frees it
        assert!(ledger.release(&sym("00700"), SubscriptionKind::Quote));
    }

    #[test]
    fn release_untracked_is_noop() {
        let ledger = SubscriptionLedger::new();
        assert!(!ledger.release(&sym("00700"), SubscriptionKind::Quote));
    }

    #[test]
    fn kinds_are_tracked_separately() {
        let ledger = SubscriptionLedger::new();
        ledger.acquire_standing(&sym("00700"), SubscriptionKind::Quote);
        ledger.acquire_standing(&sym("00700"), SubscriptionKind::OrderBook);

        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.active_symbols(SubscriptionKind::Quote),
            vec![sym("00700")]
        );
        assert!(ledger.active_symbols(SubscriptionKind::Bars(BarPeriod::Day)).is_empty());
    }

    #[test]
    fn drain_groups_by_kind_and_empties() {
        let ledger = SubscriptionLedger::new();
        ledger.acquire_standing(&sym("00700"), SubscriptionKind::Quote);
        ledger.acquire_standing(&sym("09988"), SubscriptionKind::Quote);
        ledger.acquire_standing(&sym("00700"), SubscriptionKind::OrderBook);

        let drained = ledger.drain();

        assert_eq!(drained.len(), 2);
        assert_eq!(
            drained[&SubscriptionKind::Quote],
            vec![sym("00700"), sym("09988")]
        );
        assert_eq!(drained[&SubscriptionKind::OrderBook], vec![sym("00700")]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn standing_kinds() {
        assert!(SubscriptionKind::Quote.is_standing());
        assert!(SubscriptionKind::OrderBook.is_standing());
        assert!(!SubscriptionKind::Bars(BarPeriod::Week).is_standing());
    }

    #[test]
    fn kind_display() {
        assert_eq!(SubscriptionKind::Bars(BarPeriod::Day).to_string(), "BARS_1d");
        assert_eq!(SubscriptionKind::OrderBook.to_string(), "ORDER_BOOK");
    }
}
