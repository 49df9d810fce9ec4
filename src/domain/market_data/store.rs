//! Aggregate root for all per-pair market state: depth ladders, rebuilt
//! order book, trade tape, candle series, ticker and indicators.

use super::entities::{Candle, CandleSeries, Ticker, Trade, TradeTape};
use super::indicator_engine::{IndicatorEngine, IndicatorSet};
use super::order_book::{DepthLadder, OrderBookState};
use super::value_objects::{PairConfig, PairSymbol, Price, Timeframe};
use crate::domain::logging::{LogComponent, get_logger};
use serde::Serialize;

/// Clone-out view handed to subscribers
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub pair: PairSymbol,
    pub timeframe: Timeframe,
    pub ticker: Ticker,
    pub order_book: OrderBookState,
    pub candles: Vec<Candle>,
    pub trades: Vec<Trade>,
    pub indicators: IndicatorSet,
}

#[derive(Debug)]
pub struct MarketDataStore {
    pair: PairSymbol,
    timeframe: Timeframe,
    bid_ladder: DepthLadder,
    ask_ladder: DepthLadder,
    book: OrderBookState,
    tape: TradeTape,
    candles: CandleSeries,
    ticker: Ticker,
    indicators: IndicatorSet,
}

impl MarketDataStore {
    pub fn new(pair: PairSymbol, timeframe: Timeframe) -> Self {
        Self {
            ticker: Ticker::empty(pair.clone()),
            pair,
            timeframe,
            bid_ladder: DepthLadder::new(),
            ask_ladder: DepthLadder::new(),
            book: OrderBookState::default(),
            tape: TradeTape::new(),
            candles: CandleSeries::default(),
            indicators: IndicatorSet::default(),
        }
    }

    pub fn pair(&self) -> &PairSymbol {
        &self.pair
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn pair_config(&self) -> &'static PairConfig {
        PairConfig::for_pair(&self.pair)
    }

    /// Apply an incremental depth diff: qty 0 deletes the level, qty > 0
    /// inserts or overwrites (an unknown price is an implicit insert).
    /// Rebuilds the top-of-book view afterwards.
    pub fn apply_depth_diff(&mut self, bid_updates: &[(f64, f64)], ask_updates: &[(f64, f64)]) {
        for &(price, qty) in bid_updates {
            self.bid_ladder.apply(price, qty);
        }
        for &(price, qty) in ask_updates {
            self.ask_ladder.apply(price, qty);
        }
        self.rebuild_order_book();
    }

    /// Replace both ladders from a full depth snapshot (polling path)
    pub fn set_depth_snapshot(&mut self, bids: &[(f64, f64)], asks: &[(f64, f64)]) {
        self.bid_ladder.clear();
        self.ask_ladder.clear();
        for &(price, qty) in bids {
            self.bid_ladder.apply(price, qty);
        }
        for &(price, qty) in asks {
            self.ask_ladder.apply(price, qty);
        }
        self.rebuild_order_book();
    }

    pub fn rebuild_order_book(&mut self) {
        self.book = OrderBookState::rebuild(&self.bid_ladder, &self.ask_ladder, self.ticker.last_price);
    }

    /// Fold one trade: tape, last price, candle bucket, indicators.
    pub fn apply_trade(&mut self, trade: Trade) {
        if !trade.price.value().is_finite() || trade.price.value() <= 0.0 {
            return;
        }
        self.ticker.last_price = trade.price;
        self.candles.apply_trade(
            trade.price.value(),
            trade.amount.value(),
            trade.timestamp.value(),
            self.timeframe.duration_ms(),
        );
        self.tape.push(trade);
        self.recompute_indicators();
    }

    /// Wholesale ticker replacement from an explicit ticker message
    pub fn set_ticker(&mut self, ticker: Ticker) {
        self.ticker = ticker;
        self.book.last_price = self.ticker.last_price;
    }

    /// Wholesale tape replacement from the polling path
    pub fn set_trades(&mut self, trades: Vec<Trade>) {
        self.tape.replace(trades);
        if let Some(latest) = self.tape.latest() {
            self.ticker.last_price = latest.price;
        }
    }

    /// Replace the candle series from a history fetch
    pub fn set_history(&mut self, candles: Vec<Candle>) {
        self.candles.set_history(candles);
        if let Some(price) = self.candles.get_latest_price() {
            if self.ticker.last_price.value() == 0.0 {
                self.ticker.last_price = price;
            }
        }
        self.recompute_indicators();
        get_logger().info(
            LogComponent::Domain("MarketStore"),
            &format!("📊 History loaded: {} candles for {}", self.candles.count(), self.pair),
        );
    }

    /// Switch the active bucket duration; the series is replaced by the next
    /// history fetch.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
    }

    /// Clear all per-pair mutable state before switching data sources
    pub fn reset(&mut self, pair: PairSymbol) {
        self.pair = pair.clone();
        self.bid_ladder.clear();
        self.ask_ladder.clear();
        self.book = OrderBookState::default();
        self.tape.clear();
        self.candles.clear();
        self.ticker = Ticker::empty(pair);
        self.indicators = IndicatorSet::default();
    }

    /// Recompute indicators; below the 30-candle minimum the previous values
    /// stay in place.
    pub fn recompute_indicators(&mut self) {
        let candles = self.candles.get_candles();
        let closes: Vec<f64> = candles.iter().map(|c| c.ohlcv.close.value()).collect();
        let highs: Vec<f64> = candles.iter().map(|c| c.ohlcv.high.value()).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.ohlcv.low.value()).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.ohlcv.volume.value()).collect();
        if let Some(set) = IndicatorEngine::compute(&closes, &highs, &lows, &volumes) {
            self.indicators = set;
        }
    }

    pub fn order_book(&self) -> &OrderBookState {
        &self.book
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn candles(&self) -> &CandleSeries {
        &self.candles
    }

    pub fn trades(&self) -> &TradeTape {
        &self.tape
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn last_price(&self) -> Price {
        self.ticker.last_price
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            pair: self.pair.clone(),
            timeframe: self.timeframe,
            ticker: self.ticker.clone(),
            order_book: self.book.clone(),
            candles: self.candles.to_vec(),
            trades: self.tape.to_vec(),
            indicators: self.indicators,
        }
    }
}
