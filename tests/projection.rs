use trade_chart_wasm::domain::chart::projection::ChartProjection;
use trade_chart_wasm::domain::chart::viewport::ViewportState;
use trade_chart_wasm::domain::market_data::{Candle, OHLCV, Price, Timestamp, Volume};
use wasm_bindgen_test::*;

const MINUTE: u64 = 60_000;
const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 520.0;

fn flat_candle(time: u64, price: f64) -> Candle {
    Candle::new(
        Timestamp::from_millis(time),
        OHLCV::new(
            Price::from(price),
            Price::from(price + 2.0),
            Price::from(price - 2.0),
            Price::from(price + 1.0),
            Volume::from(1.0),
        ),
    )
}

fn history(len: usize) -> Vec<Candle> {
    (0..len).map(|i| flat_candle(i as u64 * MINUTE, 100.0 + i as f64 * 0.1)).collect()
}

fn projection(candles: &[Candle], viewport: &ViewportState) -> ChartProjection {
    ChartProjection::new(candles, viewport, WIDTH, HEIGHT, 0, false)
}

#[wasm_bindgen_test]
fn visible_range_follows_offset() {
    let candles = history(200);
    let viewport = ViewportState { offset: 0.0, candle_width: 8.0 };
    let p = projection(&candles, &viewport);
    assert_eq!(p.end_idx, 200);

    let viewport = ViewportState { offset: 50.0, candle_width: 8.0 };
    let p = projection(&candles, &viewport);
    assert_eq!(p.end_idx, 150);
}

#[wasm_bindgen_test]
fn deep_scroll_yields_empty_slice_not_panic() {
    let candles = history(50);
    let viewport = ViewportState { offset: 10_000.0, candle_width: 8.0 };
    let p = projection(&candles, &viewport);
    let (start, end) = p.visible_bounds(candles.len());
    assert_eq!(start, end);
    // Price domain falls back to a padded window around the latest candle
    assert!(p.min_price < p.max_price);
}

#[wasm_bindgen_test]
fn index_x_round_trip() {
    let candles = history(200);
    let viewport = ViewportState { offset: 30.0, candle_width: 10.0 };
    let p = projection(&candles, &viewport);

    for idx in [p.start_idx.max(0), p.start_idx.max(0) + 5, p.end_idx - 1] {
        let x = p.index_to_x_center(idx);
        assert_eq!(p.x_to_index(x), idx);
    }
}

#[wasm_bindgen_test]
fn price_y_round_trip() {
    let candles = history(100);
    let viewport = ViewportState::default();
    let p = projection(&candles, &viewport);

    for price in [p.min_price, (p.min_price + p.max_price) / 2.0, p.max_price] {
        let y = p.price_to_y(price);
        assert!((p.y_to_price(y) - price).abs() < 1e-6);
    }
}

#[wasm_bindgen_test]
fn y_axis_is_inverted() {
    let candles = history(100);
    let p = projection(&candles, &ViewportState::default());
    assert!(p.price_to_y(p.max_price) < p.price_to_y(p.min_price));
    assert!(p.price_to_y(p.max_price).abs() < 1e-9);
    assert!((p.price_to_y(p.min_price) - p.main_height).abs() < 1e-9);
}

#[wasm_bindgen_test]
fn degenerate_price_range_is_padded() {
    // Single flat candle: high == low after construction
    let candle = Candle::new(
        Timestamp::from_millis(0),
        OHLCV::new(
            Price::from(100.0),
            Price::from(100.0),
            Price::from(100.0),
            Price::from(100.0),
            Volume::from(1.0),
        ),
    );
    let candles = vec![candle];
    let p = projection(&candles, &ViewportState::default());
    assert!(p.max_price > p.min_price);
    assert!((p.min_price - 95.0).abs() < 1e-9);
    assert!((p.max_price - 105.0).abs() < 1e-9);
}

#[wasm_bindgen_test]
fn bollinger_expands_the_domain() {
    let candles = history(100);
    let viewport = ViewportState::default();
    let plain = ChartProjection::new(&candles, &viewport, WIDTH, HEIGHT, 0, false);
    let expanded = ChartProjection::new(&candles, &viewport, WIDTH, HEIGHT, 0, true);
    assert!(expanded.min_price < plain.min_price);
    assert!(expanded.max_price > plain.max_price);
}

#[wasm_bindgen_test]
fn panels_shrink_the_main_panel() {
    let candles = history(100);
    let viewport = ViewportState::default();
    let none = ChartProjection::new(&candles, &viewport, WIDTH, HEIGHT, 0, false);
    let two = ChartProjection::new(&candles, &viewport, WIDTH, HEIGHT, 2, false);
    assert!(two.main_height < none.main_height);
    assert_eq!(two.panel_top(0), two.main_height);
    assert_eq!(two.panel_top(1), two.main_height + two.panel_height);
}

#[wasm_bindgen_test]
fn no_candles_still_produces_a_domain() {
    let p = projection(&[], &ViewportState::default());
    assert!(p.max_price > p.min_price);
}

#[wasm_bindgen_test]
fn time_to_x_clamps_beyond_live_edge() {
    let candles = history(10);
    let viewport = ViewportState::default();
    let p = projection(&candles, &viewport);

    let known = p.time_to_x(candles[4].time.value(), &candles);
    assert_eq!(p.x_to_index(known), 4);

    // Future timestamp lands one step past the series
    let future = p.time_to_x(candles[9].time.value() + 10 * MINUTE, &candles);
    assert!(future > p.index_to_x_center(9));
}
