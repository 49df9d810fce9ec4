//! Incremental order-book state: price-keyed depth ladders and the
//! rebuilt top-of-book view derived from them.

use super::value_objects::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Levels kept per side after a rebuild
pub const BOOK_DEPTH: usize = 20;

/// Ordered map key for a price level.
///
/// Invariant: only positive finite prices are representable, so the IEEE bit
/// pattern sorts identically to the numeric value and the `BTreeMap` walks
/// levels in price order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceKey(u64);

impl PriceKey {
    pub fn from_price(price: f64) -> Option<Self> {
        (price.is_finite() && price > 0.0).then(|| Self(price.to_bits()))
    }

    pub fn price(self) -> f64 {
        f64::from_bits(self.0)
    }
}

/// One side of the depth ladder: price -> outstanding quantity.
///
/// Single-writer keyed map with explicit upsert/remove, no external
/// synchronization required.
#[derive(Debug, Clone, Default)]
pub struct DepthLadder {
    levels: BTreeMap<PriceKey, f64>,
}

impl DepthLadder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one (price, qty) diff entry. Zero quantity deletes the level,
    /// non-zero inserts or overwrites. Malformed prices/quantities are
    /// dropped silently.
    pub fn apply(&mut self, price: f64, qty: f64) {
        let Some(key) = PriceKey::from_price(price) else {
            return;
        };
        if !qty.is_finite() || qty < 0.0 {
            return;
        }
        if qty == 0.0 {
            self.levels.remove(&key);
        } else {
            self.levels.insert(key, qty);
        }
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn contains(&self, price: f64) -> bool {
        PriceKey::from_price(price).is_some_and(|key| self.levels.contains_key(&key))
    }

    pub fn qty_at(&self, price: f64) -> Option<f64> {
        PriceKey::from_price(price).and_then(|key| self.levels.get(&key).copied())
    }

    /// Best-to-worst walk: descending for bids, ascending for asks.
    fn ranked(&self, descending: bool) -> Vec<(f64, f64)> {
        let iter = self.levels.iter().map(|(key, qty)| (key.price(), *qty));
        if descending { iter.rev().collect() } else { iter.collect() }
    }
}

/// One rebuilt level with notional and running depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: f64,
    pub amount: f64,
    pub total: f64,
    pub cumulative_total: f64,
}

/// Rebuilt top-of-book view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookState {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub last_price: Price,
    pub spread: f64,
    pub max_depth: f64,
}

impl Default for OrderBookState {
    fn default() -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
            last_price: Price::from(0.0),
            spread: 0.0,
            // Non-zero so depth-bar consumers never divide by zero
            max_depth: 1.0,
        }
    }
}

impl OrderBookState {
    /// Rebuild from the ladders: top 20 per side, per-level notional and
    /// cumulative notional, spread and max depth.
    pub fn rebuild(bids: &DepthLadder, asks: &DepthLadder, last_price: Price) -> Self {
        let top_bids = accumulate(bids.ranked(true));
        let top_asks = accumulate(asks.ranked(false));

        let best_bid = top_bids.first().map(|l| l.price).unwrap_or(0.0);
        let best_ask = top_asks.first().map(|l| l.price).unwrap_or(0.0);
        let bid_depth = top_bids.last().map(|l| l.cumulative_total).unwrap_or(0.0);
        let ask_depth = top_asks.last().map(|l| l.cumulative_total).unwrap_or(0.0);

        Self {
            bids: top_bids,
            asks: top_asks,
            last_price,
            spread: best_ask - best_bid,
            max_depth: bid_depth.max(ask_depth).max(1.0),
        }
    }

    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }
}

fn accumulate(levels: Vec<(f64, f64)>) -> Vec<OrderBookLevel> {
    let mut running = 0.0;
    levels
        .into_iter()
        .take(BOOK_DEPTH)
        .map(|(price, amount)| {
            let total = price * amount;
            running += total;
            OrderBookLevel { price, amount, total, cumulative_total: running }
        })
        .collect()
}
