use trade_chart_wasm::domain::market_data::OrderSide;
use trade_chart_wasm::infrastructure::websocket::{FeedMessage, parse_feed_message};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn parses_depth_update_with_string_numbers() {
    let raw = r#"{"e":"depthUpdate","b":[["100.5","2"],["99.0","0"]],"a":[["101.25","3.5"]]}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Depth { bid_updates, ask_updates } => {
            assert_eq!(bid_updates, vec![(100.5, 2.0), (99.0, 0.0)]);
            assert_eq!(ask_updates, vec![(101.25, 3.5)]);
        }
        other => panic!("expected depth, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn parses_depth_update_with_plain_numbers() {
    let raw = r#"{"e":"depthUpdate","b":[[100.5,2]],"a":[]}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Depth { bid_updates, ask_updates } => {
            assert_eq!(bid_updates, vec![(100.5, 2.0)]);
            assert!(ask_updates.is_empty());
        }
        other => panic!("expected depth, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn depth_sides_are_optional() {
    let raw = r#"{"e":"depthUpdate","a":[["101","1"]]}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Depth { bid_updates, ask_updates } => {
            assert!(bid_updates.is_empty());
            assert_eq!(ask_updates.len(), 1);
        }
        other => panic!("expected depth, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn parses_trade_and_maps_maker_flag_to_side() {
    let raw = r#"{"e":"trade","t":12345,"p":"4250.5","q":"0.25","m":true,"T":1700000000000}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Trade(trade) => {
            assert_eq!(trade.id, "12345");
            assert_eq!(trade.price.value(), 4250.5);
            assert_eq!(trade.amount.value(), 0.25);
            assert_eq!(trade.side, OrderSide::Sell);
            assert_eq!(trade.timestamp.value(), 1_700_000_000_000);
        }
        other => panic!("expected trade, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn agg_trade_without_id_gets_a_fallback() {
    let raw = r#"{"e":"aggTrade","p":100,"q":1,"m":false,"T":42}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Trade(trade) => {
            assert_eq!(trade.id, "t-42");
            assert_eq!(trade.side, OrderSide::Buy);
        }
        other => panic!("expected trade, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn parses_ticker_snapshot() {
    let raw = r#"{"e":"24hrTicker","c":"4250.00","P":"-1.5","h":"4300","l":"4100","v":"9000"}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Ticker(fields) => {
            assert_eq!(fields.last_price, 4250.0);
            assert_eq!(fields.price_change_percent, -1.5);
            assert_eq!(fields.high_24h, 4300.0);
            assert_eq!(fields.low_24h, 4100.0);
            assert_eq!(fields.volume_24h, 9000.0);
        }
        other => panic!("expected ticker, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn malformed_payloads_are_errors_not_panics() {
    assert!(parse_feed_message("not json at all").is_err());
    assert!(parse_feed_message(r#"{"no_event_tag":1}"#).is_err());
    assert!(parse_feed_message(r#"{"e":"somethingElse","x":1}"#).is_err());
    assert!(parse_feed_message(r#"{"e":"trade","p":"not-a-number","q":"1","T":1}"#).is_err());
}

#[wasm_bindgen_test]
fn unparsable_levels_are_skipped_silently() {
    let raw = r#"{"e":"depthUpdate","b":[["abc","2"],["100","1"]],"a":[]}"#;
    let message = parse_feed_message(raw).unwrap();
    match message {
        FeedMessage::Depth { bid_updates, .. } => {
            assert_eq!(bid_updates, vec![(100.0, 1.0)]);
        }
        other => panic!("expected depth, got {other:?}"),
    }
}
