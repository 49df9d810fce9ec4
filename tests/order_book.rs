use trade_chart_wasm::domain::market_data::{
    DepthLadder, MarketDataStore, OrderBookState, PairSymbol, Price, Timeframe,
};
use wasm_bindgen_test::*;

fn store() -> MarketDataStore {
    MarketDataStore::new(PairSymbol::from("AMR/NVR"), Timeframe::OneMinute)
}

#[wasm_bindgen_test]
fn depth_diff_builds_book() {
    let mut store = store();
    store.apply_depth_diff(&[(100.0, 2.0)], &[(101.0, 3.0)]);

    let book = store.order_book();
    assert_eq!(book.bids.len(), 1);
    assert_eq!(book.asks.len(), 1);
    assert_eq!(book.bids[0].price, 100.0);
    assert_eq!(book.bids[0].amount, 2.0);
    assert_eq!(book.asks[0].price, 101.0);
    assert_eq!(book.asks[0].amount, 3.0);
}

#[wasm_bindgen_test]
fn zero_quantity_deletes_only_that_side() {
    let mut store = store();
    store.apply_depth_diff(&[(100.0, 2.0)], &[(101.0, 3.0)]);
    store.apply_depth_diff(&[(100.0, 0.0)], &[]);

    let book = store.order_book();
    assert!(book.bids.is_empty());
    assert_eq!(book.asks.len(), 1);
    assert_eq!(book.asks[0].price, 101.0);
}

#[wasm_bindgen_test]
fn delete_then_reinsert_uses_new_quantity() {
    let mut ladder = DepthLadder::new();
    ladder.apply(100.0, 2.0);
    ladder.apply(100.0, 0.0);
    assert!(!ladder.contains(100.0));

    ladder.apply(100.0, 7.0);
    assert_eq!(ladder.qty_at(100.0), Some(7.0));
}

#[wasm_bindgen_test]
fn nonzero_quantity_overwrites() {
    let mut ladder = DepthLadder::new();
    ladder.apply(100.0, 2.0);
    ladder.apply(100.0, 5.0);
    assert_eq!(ladder.qty_at(100.0), Some(5.0));
    assert_eq!(ladder.len(), 1);
}

#[wasm_bindgen_test]
fn malformed_levels_are_dropped() {
    let mut ladder = DepthLadder::new();
    ladder.apply(f64::NAN, 1.0);
    ladder.apply(-5.0, 1.0);
    ladder.apply(0.0, 1.0);
    ladder.apply(100.0, f64::INFINITY);
    ladder.apply(100.0, -1.0);
    assert!(ladder.is_empty());
}

#[wasm_bindgen_test]
fn bids_descend_asks_ascend() {
    let mut store = store();
    store.apply_depth_diff(
        &[(99.0, 1.0), (101.5, 1.0), (100.0, 1.0)],
        &[(103.0, 1.0), (102.0, 1.0), (104.5, 1.0)],
    );

    let book = store.order_book();
    let bid_prices: Vec<f64> = book.bids.iter().map(|l| l.price).collect();
    let ask_prices: Vec<f64> = book.asks.iter().map(|l| l.price).collect();
    assert_eq!(bid_prices, vec![101.5, 100.0, 99.0]);
    assert_eq!(ask_prices, vec![102.0, 103.0, 104.5]);
}

#[wasm_bindgen_test]
fn cumulative_notional_is_non_decreasing() {
    let mut store = store();
    let bids: Vec<(f64, f64)> = (1..=10).map(|i| (100.0 - i as f64, i as f64)).collect();
    let asks: Vec<(f64, f64)> = (1..=10).map(|i| (100.0 + i as f64, i as f64)).collect();
    store.apply_depth_diff(&bids, &asks);

    let book = store.order_book();
    for side in [&book.bids, &book.asks] {
        let mut previous = 0.0;
        for level in side.iter() {
            assert!((level.total - level.price * level.amount).abs() < 1e-9);
            assert!(level.cumulative_total >= previous);
            previous = level.cumulative_total;
        }
    }
}

#[wasm_bindgen_test]
fn book_truncates_to_top_twenty() {
    let mut store = store();
    let bids: Vec<(f64, f64)> = (1..=25).map(|i| (1000.0 - i as f64, 1.0)).collect();
    let asks: Vec<(f64, f64)> = (1..=25).map(|i| (1000.0 + i as f64, 1.0)).collect();
    store.apply_depth_diff(&bids, &asks);

    let book = store.order_book();
    assert_eq!(book.bids.len(), 20);
    assert_eq!(book.asks.len(), 20);
    // Best prices survive the cut
    assert_eq!(book.bids[0].price, 999.0);
    assert_eq!(book.asks[0].price, 1001.0);
}

#[wasm_bindgen_test]
fn spread_and_max_depth() {
    let mut store = store();
    store.apply_depth_diff(&[(100.0, 2.0)], &[(101.0, 3.0)]);

    let book = store.order_book();
    assert!((book.spread - 1.0).abs() < 1e-9);
    // bid depth 200, ask depth 303
    assert!((book.max_depth - 303.0).abs() < 1e-9);
}

#[wasm_bindgen_test]
fn empty_book_defaults_are_safe() {
    let book = OrderBookState::default();
    assert_eq!(book.max_depth, 1.0);
    assert_eq!(book.spread, 0.0);
    assert_eq!(book.last_price, Price::from(0.0));
}
