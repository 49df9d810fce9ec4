//! Stateless indicator transforms over numeric series.

use serde::{Deserialize, Serialize};

/// History required before indicators are (re)computed. Below this the set
/// keeps its previous values.
pub const MIN_CANDLES_FOR_INDICATORS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdOutput {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Latest indicator outputs keyed by name
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub sma_20: f64,
    pub ema_20: f64,
    pub macd: MacdOutput,
    pub bollinger: BollingerBands,
    pub composite_index: f64,
}

/// Arithmetic mean of the last `period` values; 0 while underfilled
pub fn sma(data: &[f64], period: usize) -> f64 {
    if data.len() < period || period == 0 {
        return 0.0;
    }
    data[data.len() - period..].iter().sum::<f64>() / period as f64
}

/// EMA seeded with the first series value, k = 2/(period+1)
pub fn ema(data: &[f64], period: usize) -> f64 {
    let Some(&first) = data.first() else {
        return 0.0;
    };
    let k = 2.0 / (period as f64 + 1.0);
    data[1..].iter().fold(first, |prev, &value| value * k + prev * (1.0 - k))
}

/// Full EMA series, same seeding as `ema`
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = data.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    let mut prev = first;
    out.push(prev);
    for &value in &data[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// RSI over the trailing `period` deltas. Exactly 100 when the average loss
/// is zero; neutral 50 while underfilled.
pub fn rsi(data: &[f64], period: usize) -> f64 {
    if data.len() < period + 1 || period == 0 {
        return 50.0;
    }
    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in data.len() - period..data.len() {
        let delta = data[i] - data[i - 1];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    if losses == 0.0 {
        return 100.0;
    }
    let rs = (gains / period as f64) / (losses / period as f64);
    100.0 - 100.0 / (1.0 + rs)
}

/// RSI evaluated at every index, for sub-panel curves
pub fn rsi_series(data: &[f64], period: usize) -> Vec<f64> {
    (0..data.len()).map(|i| rsi(&data[..=i], period)).collect()
}

/// Population standard deviation of the last `period` values
pub fn std_dev(data: &[f64], period: usize) -> f64 {
    if data.len() < period || period == 0 {
        return 0.0;
    }
    let window = &data[data.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    variance.sqrt()
}

/// MACD(12,26,9): EMA12 - EMA26 line, EMA9 signal, histogram
pub fn macd(closes: &[f64]) -> MacdOutput {
    let ema_12 = ema_series(closes, 12);
    let ema_26 = ema_series(closes, 26);
    let macd_line: Vec<f64> = ema_12.iter().zip(&ema_26).map(|(a, b)| a - b).collect();
    let signal_line = ema_series(&macd_line, 9);

    let value = macd_line.last().copied().unwrap_or(0.0);
    let signal = signal_line.last().copied().unwrap_or(0.0);
    MacdOutput { value, signal, histogram: value - signal }
}

/// MACD histogram evaluated at every index, for sub-panel bars
pub fn macd_histogram_series(closes: &[f64]) -> Vec<f64> {
    let ema_12 = ema_series(closes, 12);
    let ema_26 = ema_series(closes, 26);
    let macd_line: Vec<f64> = ema_12.iter().zip(&ema_26).map(|(a, b)| a - b).collect();
    let signal_line = ema_series(&macd_line, 9);
    macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect()
}

/// Bollinger(20,2) around SMA20
pub fn bollinger(closes: &[f64]) -> BollingerBands {
    let middle = sma(closes, 20);
    let deviation = std_dev(closes, 20);
    BollingerBands { upper: middle + deviation * 2.0, middle, lower: middle - deviation * 2.0 }
}

/// Volatility-penalized, volume-rewarded score for the latest candle,
/// clamped to [0, 100].
pub fn composite_index(high: f64, low: f64, close: f64, volume: f64) -> f64 {
    if close == 0.0 {
        return 0.0;
    }
    let volatility = (high - low) / close;
    let raw = 50.0 + (volume + 1.0).log10() * 5.0 - volatility * 1000.0;
    raw.clamp(0.0, 100.0)
}

/// Engine recomputing the full indicator set from candle-derived arrays.
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Recompute every indicator. Returns `None` (leave previous values in
    /// place) while fewer than `MIN_CANDLES_FOR_INDICATORS` candles exist.
    pub fn compute(
        closes: &[f64],
        highs: &[f64],
        lows: &[f64],
        volumes: &[f64],
    ) -> Option<IndicatorSet> {
        if closes.len() < MIN_CANDLES_FOR_INDICATORS {
            return None;
        }
        let last = closes.len() - 1;
        Some(IndicatorSet {
            rsi: rsi(closes, 14),
            sma_20: sma(closes, 20),
            ema_20: ema(closes, 20),
            macd: macd(closes),
            bollinger: bollinger(closes),
            composite_index: composite_index(highs[last], lows[last], closes[last], volumes[last]),
        })
    }
}
