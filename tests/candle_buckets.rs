use trade_chart_wasm::domain::market_data::{
    Candle, CandleSeries, MAX_CANDLES, OHLCV, Price, Timestamp, Volume,
};
use wasm_bindgen_test::*;

const MINUTE: u64 = 60_000;

fn candle(time: u64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle::new(
        Timestamp::from_millis(time),
        OHLCV::new(
            Price::from(open),
            Price::from(high),
            Price::from(low),
            Price::from(close),
            Volume::from(volume),
        ),
    )
}

fn seeded(t0: u64, close: f64) -> CandleSeries {
    let mut series = CandleSeries::default();
    series.set_history(vec![candle(t0, close, close, close, close, 1.0)]);
    series
}

#[wasm_bindgen_test]
fn trade_inside_open_bucket_mutates_last_candle() {
    let t0 = 1_000_000;
    let mut series = seeded(t0, 100.0);

    // Scenario B, first trade: T0+30s at 105
    series.apply_trade(105.0, 2.0, t0 + 30_000, MINUTE);

    assert_eq!(series.count(), 1);
    let last = series.latest().unwrap();
    assert_eq!(last.ohlcv.close.value(), 105.0);
    assert_eq!(last.ohlcv.high.value(), 105.0);
    assert_eq!(last.ohlcv.low.value(), 100.0);
    assert_eq!(last.ohlcv.volume.value(), 3.0);
}

#[wasm_bindgen_test]
fn trade_after_bucket_appends_one_step_forward() {
    let t0 = 1_000_000;
    let mut series = seeded(t0, 100.0);

    // Scenario B, second trade: T0+70s opens the next bucket at T0+60s
    series.apply_trade(102.0, 1.0, t0 + 70_000, MINUTE);

    assert_eq!(series.count(), 2);
    let last = series.latest().unwrap();
    assert_eq!(last.time.value(), t0 + MINUTE);
    assert_eq!(last.ohlcv.open.value(), 102.0);
    assert_eq!(last.ohlcv.high.value(), 102.0);
    assert_eq!(last.ohlcv.low.value(), 102.0);
    assert_eq!(last.ohlcv.close.value(), 102.0);
    assert_eq!(last.ohlcv.volume.value(), 1.0);
}

#[wasm_bindgen_test]
fn bucket_boundary_is_half_open() {
    let t0 = 1_000_000;
    let mut series = seeded(t0, 100.0);

    // Exactly at the bucket end: belongs to the next bucket
    series.apply_trade(101.0, 1.0, t0 + MINUTE, MINUTE);
    assert_eq!(series.count(), 2);

    // Exactly at a bucket start: extends that bucket
    let mut series = seeded(t0, 100.0);
    series.apply_trade(101.0, 1.0, t0, MINUTE);
    assert_eq!(series.count(), 1);
}

#[wasm_bindgen_test]
fn high_low_track_running_extremes() {
    let t0 = 1_000_000;
    let mut series = seeded(t0, 100.0);

    for (price, expected_high, expected_low) in
        [(104.0, 104.0, 100.0), (97.0, 104.0, 97.0), (101.0, 104.0, 97.0)]
    {
        series.apply_trade(price, 1.0, t0 + 10_000, MINUTE);
        let last = series.latest().unwrap();
        assert_eq!(last.ohlcv.high.value(), expected_high);
        assert_eq!(last.ohlcv.low.value(), expected_low);
        assert_eq!(last.ohlcv.close.value(), price);
    }
}

#[wasm_bindgen_test]
fn series_caps_at_sliding_window() {
    let t0 = 1_000_000;
    let mut series = seeded(t0, 100.0);

    // Every trade lands past the open bucket, appending one candle each
    for i in 0..(MAX_CANDLES + 50) {
        let last_time = series.latest().unwrap().time.value();
        series.apply_trade(100.0 + i as f64, 1.0, last_time + 2 * MINUTE, MINUTE);
    }

    assert_eq!(series.count(), MAX_CANDLES);
    // Strictly increasing bucket times, one step apart
    let candles = series.get_candles();
    for pair in candles.iter().collect::<Vec<_>>().windows(2) {
        assert_eq!(pair[1].time.value(), pair[0].time.value() + MINUTE);
    }
}

#[wasm_bindgen_test]
fn empty_series_ignores_trades() {
    let mut series = CandleSeries::default();
    series.apply_trade(100.0, 1.0, 1_000_000, MINUTE);
    assert!(series.is_empty());
}

#[wasm_bindgen_test]
fn history_is_sorted_and_deduplicated() {
    let mut series = CandleSeries::default();
    series.set_history(vec![
        candle(3 * MINUTE, 103.0, 103.0, 103.0, 103.0, 1.0),
        candle(MINUTE, 101.0, 101.0, 101.0, 101.0, 1.0),
        candle(2 * MINUTE, 102.0, 102.0, 102.0, 102.0, 1.0),
        candle(MINUTE, 201.0, 201.0, 201.0, 201.0, 1.0),
    ]);

    let times: Vec<u64> = series.get_candles().iter().map(|c| c.time.value()).collect();
    assert_eq!(times, vec![MINUTE, 2 * MINUTE, 3 * MINUTE]);
}
