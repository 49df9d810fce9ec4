use trade_chart_wasm::domain::market_data::{
    Amount, Candle, MAX_TRADES, MarketDataStore, OHLCV, OrderSide, PairSymbol, Price, Ticker,
    Timeframe, Timestamp, Trade, Volume,
};
use wasm_bindgen_test::*;

const MINUTE: u64 = 60_000;

fn store() -> MarketDataStore {
    MarketDataStore::new(PairSymbol::from("AMR/NVR"), Timeframe::OneMinute)
}

fn candle(time: u64, price: f64) -> Candle {
    Candle::new(
        Timestamp::from_millis(time),
        OHLCV::new(
            Price::from(price),
            Price::from(price + 1.0),
            Price::from(price - 1.0),
            Price::from(price),
            Volume::from(1.0),
        ),
    )
}

fn trade(id: &str, price: f64, timestamp: u64) -> Trade {
    Trade {
        id: id.to_string(),
        price: Price::from(price),
        amount: Amount::from(0.5),
        side: OrderSide::Buy,
        timestamp: Timestamp::from_millis(timestamp),
    }
}

#[wasm_bindgen_test]
fn trades_update_tape_ticker_and_candles() {
    let mut store = store();
    store.set_history((0..5).map(|i| candle(i * MINUTE, 100.0)).collect());

    store.apply_trade(trade("a", 105.0, 4 * MINUTE + 30_000));

    assert_eq!(store.last_price().value(), 105.0);
    assert_eq!(store.trades().len(), 1);
    let last = store.candles().latest().unwrap();
    assert_eq!(last.ohlcv.close.value(), 105.0);
    assert_eq!(last.ohlcv.high.value(), 105.0);
}

#[wasm_bindgen_test]
fn tape_is_newest_first_and_bounded() {
    let mut store = store();
    store.set_history(vec![candle(0, 100.0)]);

    for i in 0..(MAX_TRADES as u64 + 20) {
        store.apply_trade(trade(&format!("t{i}"), 100.0, i));
    }

    assert_eq!(store.trades().len(), MAX_TRADES);
    let newest = store.trades().latest().unwrap();
    assert_eq!(newest.id, format!("t{}", MAX_TRADES as u64 + 19));
}

#[wasm_bindgen_test]
fn malformed_trades_are_dropped() {
    let mut store = store();
    store.set_history(vec![candle(0, 100.0)]);

    store.apply_trade(trade("bad", f64::NAN, 10));
    store.apply_trade(trade("bad2", -5.0, 10));

    assert!(store.trades().is_empty());
    assert_eq!(store.last_price().value(), 100.0);
}

#[wasm_bindgen_test]
fn explicit_ticker_replaces_wholesale() {
    let mut store = store();
    let ticker = Ticker {
        symbol: PairSymbol::from("AMR/NVR"),
        last_price: Price::from(4250.0),
        price_change_percent: 1.25,
        high_24h: Price::from(4300.0),
        low_24h: Price::from(4100.0),
        volume_24h: Volume::from(9000.0),
    };
    store.set_ticker(ticker.clone());

    assert_eq!(store.ticker(), &ticker);
    // Rebuilt book carries the ticker's last price forward
    assert_eq!(store.order_book().last_price.value(), 4250.0);
}

#[wasm_bindgen_test]
fn polling_trades_set_last_price() {
    let mut store = store();
    store.set_trades(vec![trade("newest", 111.0, 2000), trade("older", 109.0, 1000)]);
    assert_eq!(store.last_price().value(), 111.0);
    assert_eq!(store.trades().len(), 2);
}

#[wasm_bindgen_test]
fn reset_clears_all_per_pair_state() {
    let mut store = store();
    store.set_history((0..40).map(|i| candle(i * MINUTE, 100.0 + i as f64)).collect());
    store.apply_depth_diff(&[(100.0, 2.0)], &[(101.0, 3.0)]);
    store.apply_trade(trade("a", 105.0, 39 * MINUTE + 1));

    store.reset(PairSymbol::from("IONX/NVR"));

    assert_eq!(store.pair().value(), "IONX/NVR");
    assert_eq!(store.candles().count(), 0);
    assert!(store.trades().is_empty());
    assert!(store.order_book().bids.is_empty());
    assert!(store.order_book().asks.is_empty());
    assert_eq!(store.last_price().value(), 0.0);
    assert_eq!(store.indicators().rsi, 0.0);
}

#[wasm_bindgen_test]
fn indicators_wait_for_thirty_candles() {
    let mut store = store();
    store.set_history((0..29).map(|i| candle(i * MINUTE, 100.0 + i as f64)).collect());
    assert_eq!(store.indicators().rsi, 0.0);

    // One more bucket crosses the threshold
    store.apply_trade(trade("a", 130.0, 29 * MINUTE));
    assert!(store.indicators().rsi > 0.0);
    assert!(store.indicators().sma_20 > 0.0);
}

#[wasm_bindgen_test]
fn snapshot_reflects_store_state() {
    let mut store = store();
    store.set_history((0..3).map(|i| candle(i * MINUTE, 100.0)).collect());
    store.apply_depth_diff(&[(99.0, 1.0)], &[(101.0, 1.0)]);
    store.apply_trade(trade("a", 100.5, 2 * MINUTE + 1));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.pair.value(), "AMR/NVR");
    assert_eq!(snapshot.timeframe, Timeframe::OneMinute);
    assert_eq!(snapshot.candles.len(), 3);
    assert_eq!(snapshot.trades.len(), 1);
    assert_eq!(snapshot.order_book.bids.len(), 1);
    assert_eq!(snapshot.ticker.last_price.value(), 100.5);
}

#[wasm_bindgen_test]
fn pair_config_lookup() {
    let store = store();
    let config = store.pair_config();
    assert_eq!(config.symbol, "AMR/NVR");
    assert_eq!(config.price_decimals, 2);
    assert_eq!(config.min_amount, 0.1);
}

#[wasm_bindgen_test]
fn timeframe_switch_changes_bucket_duration() {
    let mut store = store();
    store.set_timeframe(Timeframe::FiveMinutes);
    store.set_history(vec![candle(0, 100.0)]);

    // Inside a five-minute bucket this would have been a new candle at 1m
    store.apply_trade(trade("a", 101.0, 4 * MINUTE));
    assert_eq!(store.candles().count(), 1);

    store.apply_trade(trade("b", 102.0, 6 * MINUTE));
    assert_eq!(store.candles().count(), 2);
}
