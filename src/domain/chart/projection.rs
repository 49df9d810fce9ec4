//! Bidirectional domain <-> pixel mapping for one frame.
//!
//! Every place where coordinates cross the domain/pixel boundary (rendering,
//! pointer-move previews, gesture commits, hit-testing) goes through one
//! `ChartProjection` built from the current viewport and canvas size, so the
//! inverse math can never drift between paths.

use super::viewport::ViewportState;
use crate::domain::market_data::Candle;

/// Price axis gutter on the right, in pixels
pub const PADDING_RIGHT: f64 = 60.0;
/// Time axis strip at the bottom, in pixels
pub const PADDING_BOTTOM: f64 = 25.0;
/// Horizontal grid row count
pub const GRID_ROWS: usize = 6;
/// Target pixel spacing between vertical grid lines
pub const PIXELS_PER_TIME_GRID: f64 = 100.0;
/// Each indicator sub-panel takes this fraction of total height
pub const PANEL_HEIGHT_RATIO: f64 = 0.15;
/// The main panel never shrinks below this fraction of total height
pub const MAIN_PANEL_MIN_RATIO: f64 = 0.3;
/// Volume lane fraction of the main panel
pub const VOLUME_LANE_RATIO: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct ChartProjection {
    pub candle_width: f64,
    pub gap: f64,
    pub chart_width: f64,
    pub main_height: f64,
    pub panel_height: f64,
    pub width: f64,
    pub height: f64,
    /// First visible candle index; may undershoot zero when scrolled past
    /// the start of history.
    pub start_idx: i64,
    /// One past the last visible candle index
    pub end_idx: i64,
    pub min_price: f64,
    pub max_price: f64,
    price_scale: f64,
}

impl ChartProjection {
    /// Build the frame projection from the visible slice of `candles`.
    pub fn new(
        candles: &[Candle],
        viewport: &ViewportState,
        width: f64,
        height: f64,
        panel_count: usize,
        bollinger_active: bool,
    ) -> Self {
        let chart_width = width - PADDING_RIGHT;
        let panel_height = height * PANEL_HEIGHT_RATIO;
        let total_panels = panel_count as f64 * panel_height;
        let main_height =
            (height - PADDING_BOTTOM - total_panels).max(height * MAIN_PANEL_MIN_RATIO);

        let candle_width = viewport.candle_width;
        let gap = viewport.gap();
        let max_visible = (chart_width / viewport.step()).ceil() as i64;

        let total = candles.len() as i64;
        let end_idx = (total - viewport.offset.floor() as i64).clamp(0, total);
        let start_idx = end_idx - max_visible;

        let (mut min_price, mut max_price) = visible_price_domain(candles, start_idx, end_idx);
        if bollinger_active && max_price > min_price {
            min_price *= 0.99;
            max_price *= 1.01;
        }
        // Degenerate range guard: a flat slice still needs a drawable domain
        if min_price == max_price {
            min_price *= 0.95;
            max_price *= 1.05;
            if min_price == max_price {
                min_price -= 1.0;
                max_price += 1.0;
            }
        }
        let price_scale = main_height / (max_price - min_price);

        Self {
            candle_width,
            gap,
            chart_width,
            main_height,
            panel_height,
            width,
            height,
            start_idx,
            end_idx,
            min_price,
            max_price,
            price_scale,
        }
    }

    /// Clamped-to-history bounds of the visible slice
    pub fn visible_bounds(&self, len: usize) -> (usize, usize) {
        let start = self.start_idx.max(0) as usize;
        let end = (self.end_idx.max(0) as usize).min(len);
        (start.min(end), end)
    }

    /// Left edge of the candle at `index`
    pub fn index_to_x(&self, index: i64) -> f64 {
        (index - self.start_idx) as f64 * (self.candle_width + self.gap)
    }

    /// Horizontal center of the candle at `index`
    pub fn index_to_x_center(&self, index: i64) -> f64 {
        self.index_to_x(index) + self.candle_width / 2.0
    }

    /// Inverse of `index_to_x_center`, rounded to the nearest candle
    pub fn x_to_index(&self, x: f64) -> i64 {
        let relative = (x - self.candle_width / 2.0) / (self.candle_width + self.gap);
        self.start_idx + relative.round() as i64
    }

    /// Pixel x for a bucket timestamp. Times past the live edge land one
    /// step beyond the last candle.
    pub fn time_to_x(&self, time: u64, candles: &[Candle]) -> f64 {
        let idx = match candles.iter().position(|c| c.time.value() >= time) {
            Some(idx) => idx as i64,
            None if !candles.is_empty() => candles.len() as i64 + 1,
            None => 0,
        };
        self.index_to_x_center(idx)
    }

    /// Bucket timestamp for a pixel x, clamped into history
    pub fn x_to_time(&self, x: f64, candles: &[Candle]) -> Option<u64> {
        if candles.is_empty() {
            return None;
        }
        let idx = self.x_to_index(x).clamp(0, candles.len() as i64 - 1) as usize;
        Some(candles[idx].time.value())
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        self.main_height - (price - self.min_price) * self.price_scale
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        self.min_price + (self.main_height - y) / self.price_scale
    }

    /// Top of the `panel`-th indicator sub-panel
    pub fn panel_top(&self, panel: usize) -> f64 {
        self.main_height + panel as f64 * self.panel_height
    }

    /// Candle indices between vertical grid lines
    pub fn candles_per_time_grid(&self) -> i64 {
        ((PIXELS_PER_TIME_GRID / (self.candle_width + self.gap)).ceil() as i64).max(1)
    }
}

fn visible_price_domain(candles: &[Candle], start_idx: i64, end_idx: i64) -> (f64, f64) {
    let start = start_idx.max(0) as usize;
    let end = (end_idx.max(0) as usize).min(candles.len());
    let slice = if start < end { &candles[start..end] } else { &[] };

    if slice.is_empty() {
        // Scrolled out of history or no data yet: fall back to the latest
        // candle padded, or an arbitrary non-empty domain.
        return match candles.last() {
            Some(last) => (last.ohlcv.low.value() * 0.9, last.ohlcv.high.value() * 1.1),
            None => (0.0, 100.0),
        };
    }

    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    for candle in slice {
        min_price = min_price.min(candle.ohlcv.low.value());
        max_price = max_price.max(candle.ohlcv.high.value());
    }
    (min_price, max_price)
}
