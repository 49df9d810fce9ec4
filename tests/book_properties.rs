#![cfg(not(target_arch = "wasm32"))]

use quickcheck_macros::quickcheck;
use trade_chart_wasm::domain::market_data::{DepthLadder, OrderBookState, Price};

/// Replay an arbitrary diff sequence and rebuild. Prices are drawn from a
/// small integer grid so deletes actually collide with earlier inserts.
fn replay(ops: &[(u8, u8)]) -> (DepthLadder, DepthLadder) {
    let mut bids = DepthLadder::new();
    let mut asks = DepthLadder::new();
    for (i, &(price, qty)) in ops.iter().enumerate() {
        let price = 1.0 + f64::from(price % 32);
        let qty = f64::from(qty % 8);
        if i % 2 == 0 {
            bids.apply(price, qty);
        } else {
            asks.apply(price, qty);
        }
    }
    (bids, asks)
}

#[quickcheck]
fn ladders_never_hold_zero_quantity(ops: Vec<(u8, u8)>) -> bool {
    let (bids, asks) = replay(&ops);
    let book = OrderBookState::rebuild(&bids, &asks, Price::from(0.0));
    book.bids.iter().chain(book.asks.iter()).all(|level| level.amount > 0.0)
}

#[quickcheck]
fn rebuilt_sides_are_strictly_sorted(ops: Vec<(u8, u8)>) -> bool {
    let (bids, asks) = replay(&ops);
    let book = OrderBookState::rebuild(&bids, &asks, Price::from(0.0));
    let bids_sorted = book.bids.windows(2).all(|w| w[0].price > w[1].price);
    let asks_sorted = book.asks.windows(2).all(|w| w[0].price < w[1].price);
    bids_sorted && asks_sorted
}

#[quickcheck]
fn cumulative_depth_walks_upward(ops: Vec<(u8, u8)>) -> bool {
    let (bids, asks) = replay(&ops);
    let book = OrderBookState::rebuild(&bids, &asks, Price::from(0.0));
    for side in [&book.bids, &book.asks] {
        let mut previous = 0.0;
        for level in side.iter() {
            if level.cumulative_total < previous {
                return false;
            }
            previous = level.cumulative_total;
        }
    }
    true
}

#[quickcheck]
fn deleted_price_never_survives(prices: Vec<u8>) -> bool {
    let mut ladder = DepthLadder::new();
    for &price in &prices {
        ladder.apply(1.0 + f64::from(price % 16), 1.0);
    }
    for &price in &prices {
        ladder.apply(1.0 + f64::from(price % 16), 0.0);
    }
    ladder.is_empty()
}
