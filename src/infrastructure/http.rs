//! REST client for history fetches and the polling fallback.

use super::websocket::dto::FlexNum;
use crate::domain::errors::{AppError, NetworkResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    Amount, Candle, OHLCV, OrderSide, PairSymbol, Price, Ticker, Timeframe, Timestamp, Trade,
    Volume,
};
use gloo::net::http::Request;
use serde::Deserialize;
use serde_json::Value;

/// REST endpoint base
pub const REST_API_BASE: &str = "https://price.orcaamr.com/api";

/// Candles requested per history fetch
pub const HISTORY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct DepthResponse {
    #[serde(default)]
    bids: Vec<(FlexNum, FlexNum)>,
    #[serde(default)]
    asks: Vec<(FlexNum, FlexNum)>,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(rename = "lastPrice")]
    last_price: FlexNum,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: FlexNum,
    #[serde(rename = "highPrice")]
    high_price: FlexNum,
    #[serde(rename = "lowPrice")]
    low_price: FlexNum,
    volume: FlexNum,
}

#[derive(Debug, Deserialize)]
struct TradeRow {
    #[serde(default)]
    id: Option<Value>,
    price: FlexNum,
    qty: FlexNum,
    #[serde(rename = "isBuyerMaker", default)]
    is_buyer_maker: bool,
    time: u64,
}

/// HTTP client for the market data API
#[derive(Clone)]
pub struct MarketRestClient {
    base_url: String,
}

impl Default for MarketRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketRestClient {
    pub fn new() -> Self {
        Self { base_url: REST_API_BASE.to_string() }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: base_url.to_string() }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> NetworkResult<T> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("request failed: {e:?}")))?;

        if !response.ok() {
            return Err(AppError::NetworkError(format!(
                "HTTP error: {} - {}",
                response.status(),
                response.status_text()
            )));
        }

        response.json::<T>().await.map_err(|e| AppError::ParseError(format!("bad payload: {e:?}")))
    }

    /// Ordered history for a pair/timeframe; replaces the candle series.
    /// Rows are arrays with open time and OHLCV in the first six slots;
    /// trailing fields are ignored and unparsable rows skipped.
    pub async fn get_klines(
        &self,
        pair: &PairSymbol,
        timeframe: Timeframe,
    ) -> NetworkResult<Vec<Candle>> {
        get_logger().info(
            LogComponent::Infrastructure("MarketRest"),
            &format!("📡 Fetching {} {} candles for {}", HISTORY_LIMIT, timeframe, pair),
        );

        let url = format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            pair.value(),
            timeframe.to_feed_str(),
            HISTORY_LIMIT
        );

        let rows: Vec<Vec<Value>> = self.get_json(&url).await?;
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();

        get_logger().info(
            LogComponent::Infrastructure("MarketRest"),
            &format!("✅ Loaded {} historical candles for {}", candles.len(), pair),
        );
        Ok(candles)
    }

    /// Full depth snapshot for the polling fallback
    pub async fn get_depth(
        &self,
        pair: &PairSymbol,
    ) -> NetworkResult<(Vec<(f64, f64)>, Vec<(f64, f64)>)> {
        let url = format!("{}/depth?symbol={}&limit=20", self.base_url, pair.value());
        let depth: DepthResponse = self.get_json(&url).await?;
        Ok((flatten_levels(&depth.bids), flatten_levels(&depth.asks)))
    }

    /// 24h ticker snapshot
    pub async fn get_ticker(&self, pair: &PairSymbol) -> NetworkResult<Ticker> {
        let url = format!("{}/ticker?symbol={}", self.base_url, pair.value());
        let dto: TickerResponse = self.get_json(&url).await?;
        Ok(Ticker {
            symbol: pair.clone(),
            last_price: Price::from(dto.last_price.as_f64().unwrap_or(0.0)),
            price_change_percent: dto.price_change_percent.as_f64().unwrap_or(0.0),
            high_24h: Price::from(dto.high_price.as_f64().unwrap_or(0.0)),
            low_24h: Price::from(dto.low_price.as_f64().unwrap_or(0.0)),
            volume_24h: Volume::from(dto.volume.as_f64().unwrap_or(0.0)),
        })
    }

    /// Recent public trades for the polling fallback
    pub async fn get_trades(&self, pair: &PairSymbol) -> NetworkResult<Vec<Trade>> {
        let url = format!("{}/trades?symbol={}&limit=50", self.base_url, pair.value());
        let rows: Vec<TradeRow> = self.get_json(&url).await?;
        Ok(rows.iter().filter_map(parse_trade).collect())
    }
}

/// Number-or-string coercion for loosely typed JSON fields
fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_kline(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let time = row[0].as_u64()?;
    let ohlcv = OHLCV::new(
        Price::from(value_f64(&row[1])?),
        Price::from(value_f64(&row[2])?),
        Price::from(value_f64(&row[3])?),
        Price::from(value_f64(&row[4])?),
        Volume::from(value_f64(&row[5])?),
    );
    if !ohlcv.is_valid() {
        return None;
    }
    Some(Candle::new(Timestamp::from_millis(time), ohlcv))
}

fn flatten_levels(raw: &[(FlexNum, FlexNum)]) -> Vec<(f64, f64)> {
    raw.iter().filter_map(|(p, q)| Some((p.as_f64()?, q.as_f64()?))).collect()
}

fn parse_trade(row: &TradeRow) -> Option<Trade> {
    let id = match &row.id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("t-{}", row.time),
    };
    Some(Trade {
        id,
        price: Price::from(row.price.as_f64()?),
        amount: Amount::from(row.qty.as_f64()?),
        side: if row.is_buyer_maker { OrderSide::Sell } else { OrderSide::Buy },
        timestamp: Timestamp::from_millis(row.time),
    })
}
