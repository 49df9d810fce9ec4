pub use super::value_objects::{Amount, OHLCV, OrderSide, PairSymbol, Price, Timestamp, Volume};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Sliding-window cap for the candle series
pub const MAX_CANDLES: usize = 500;

/// Bounded length of the recent-trades tape
pub const MAX_TRADES: usize = 100;

/// Domain entity - Candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Timestamp,
    pub ohlcv: OHLCV,
}

impl Candle {
    pub fn new(time: Timestamp, ohlcv: OHLCV) -> Self {
        Self { time, ohlcv }
    }

    pub fn is_bullish(&self) -> bool {
        self.ohlcv.close >= self.ohlcv.open
    }
}

/// Domain entity - time-bucketed candle series
///
/// Ascending by bucket start time, one entry per bucket, bounded at
/// `MAX_CANDLES` with the oldest entry dropped on overflow.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    max_size: usize,
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new(MAX_CANDLES)
    }
}

impl CandleSeries {
    pub fn new(max_size: usize) -> Self {
        Self { candles: VecDeque::new(), max_size }
    }

    /// Replace the whole series from a history fetch. Input is sorted and
    /// de-duplicated on bucket time so the ordering invariant holds even for
    /// a sloppy upstream.
    pub fn set_history(&mut self, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.time.value());
        candles.dedup_by_key(|c| c.time.value());
        if candles.len() > self.max_size {
            candles.drain(..candles.len() - self.max_size);
        }
        self.candles = candles.into();
    }

    /// Fold a trade into the series.
    ///
    /// A trade inside the open bucket `[last.time, last.time + bucket_ms)`
    /// mutates the last candle; anything else appends a new candle exactly
    /// one bucket step forward. An empty series ignores trades - only a
    /// history fetch seeds the bucket origin.
    pub fn apply_trade(&mut self, price: f64, volume: f64, timestamp: u64, bucket_ms: u64) {
        let Some(last) = self.candles.back_mut() else {
            return;
        };

        let bucket_end = last.time.value() + bucket_ms;
        if timestamp >= last.time.value() && timestamp < bucket_end {
            last.ohlcv.close = Price::from(price);
            if price > last.ohlcv.high.value() {
                last.ohlcv.high = Price::from(price);
            }
            if price < last.ohlcv.low.value() {
                last.ohlcv.low = Price::from(price);
            }
            last.ohlcv.volume = Volume::from(last.ohlcv.volume.value() + volume);
        } else {
            let ohlcv = OHLCV::new(
                Price::from(price),
                Price::from(price),
                Price::from(price),
                Price::from(price),
                Volume::from(volume),
            );
            self.candles.push_back(Candle::new(Timestamp::from_millis(bucket_end), ohlcv));
            if self.candles.len() > self.max_size {
                self.candles.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    pub fn get_candles(&self) -> &VecDeque<Candle> {
        &self.candles
    }

    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn count(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn get_latest_price(&self) -> Option<Price> {
        self.candles.back().map(|candle| candle.ohlcv.close)
    }

    /// Low/high range over the whole series
    pub fn price_range(&self) -> Option<(Price, Price)> {
        if self.candles.is_empty() {
            return None;
        }

        let mut min_price = self.candles[0].ohlcv.low;
        let mut max_price = self.candles[0].ohlcv.high;
        for candle in &self.candles {
            if candle.ohlcv.low < min_price {
                min_price = candle.ohlcv.low;
            }
            if candle.ohlcv.high > max_price {
                max_price = candle.ohlcv.high;
            }
        }
        Some((min_price, max_price))
    }
}

/// Domain entity - a single executed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub price: Price,
    pub amount: Amount,
    pub side: OrderSide,
    pub timestamp: Timestamp,
}

/// Domain entity - append-only recent trades, newest first
#[derive(Debug, Clone, Default)]
pub struct TradeTape {
    trades: VecDeque<Trade>,
}

impl TradeTape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the newest trade to the front, dropping the oldest beyond the cap
    pub fn push(&mut self, trade: Trade) {
        self.trades.push_front(trade);
        if self.trades.len() > MAX_TRADES {
            self.trades.pop_back();
        }
    }

    /// Wholesale replacement from the polling path
    pub fn replace(&mut self, trades: Vec<Trade>) {
        self.trades = trades.into_iter().take(MAX_TRADES).collect();
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn to_vec(&self) -> Vec<Trade> {
        self.trades.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.trades.front()
    }
}

/// Domain entity - 24h pair summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: PairSymbol,
    pub last_price: Price,
    pub price_change_percent: f64,
    pub high_24h: Price,
    pub low_24h: Price,
    pub volume_24h: Volume,
}

impl Ticker {
    pub fn empty(symbol: PairSymbol) -> Self {
        Self {
            symbol,
            last_price: Price::from(0.0),
            price_change_percent: 0.0,
            high_24h: Price::from(0.0),
            low_24h: Price::from(0.0),
            volume_24h: Volume::from(0.0),
        }
    }
}
