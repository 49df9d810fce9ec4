//! JS-facing API: a thin bridge from the page to the application layer.

use wasm_bindgen::prelude::*;

use crate::application::market_service;
use crate::domain::market_data::{PairConfig, PairSymbol, Timeframe};
use crate::global_state::{current_pair, current_timeframe};
use leptos::SignalSet;
use std::str::FromStr;

/// Trading chart API for JavaScript interop
#[wasm_bindgen]
pub struct TradeChartApi;

#[wasm_bindgen]
impl TradeChartApi {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self
    }

    /// Mount the Leptos app into the document body and boot the engine
    #[wasm_bindgen(js_name = mountApp)]
    pub fn mount_app(&self) {
        leptos::mount_to_body(crate::app::App);
    }

    /// Switch the active traded pair
    #[wasm_bindgen(js_name = setPair)]
    pub fn set_pair(&self, pair: String) {
        current_pair().set(PairSymbol::from(pair));
    }

    /// Switch the candle timeframe; rejects unknown interval strings
    #[wasm_bindgen(js_name = setTimeframe)]
    pub fn set_timeframe(&self, timeframe: String) -> Result<(), JsValue> {
        let parsed = Timeframe::from_str(&timeframe)
            .map_err(|_| JsValue::from_str(&format!("invalid timeframe: {timeframe}")))?;
        current_timeframe().set(parsed);
        Ok(())
    }

    /// Full market snapshot as JSON: ticker, order book, candles, trades,
    /// indicators
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&market_service().snapshot())
            .map_err(|e| JsValue::from_str(&format!("snapshot serialization failed: {e}")))
    }

    /// Pause or resume the data engine. Pausing keeps the last-known-good
    /// state on screen; resuming reopens the feed and polling timer.
    #[wasm_bindgen(js_name = setLive)]
    pub fn set_live(&self, live: bool) {
        let service = market_service();
        if live {
            service.start();
        } else {
            service.stop();
        }
    }

    /// Order-entry prefill data for the active pair
    #[wasm_bindgen(js_name = getPairConfig)]
    pub fn get_pair_config(&self) -> Result<String, JsValue> {
        let config: &PairConfig = market_service().pair_config();
        serde_json::to_string(config)
            .map_err(|e| JsValue::from_str(&format!("config serialization failed: {e}")))
    }
}

impl Default for TradeChartApi {
    fn default() -> Self {
        Self::new()
    }
}
