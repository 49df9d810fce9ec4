//! Wire DTOs for the market data feed. The feed tags every message with a
//! short `e` event type and ships numbers either as JSON numbers or as
//! strings; both forms must parse.

use crate::domain::market_data::{Amount, OrderSide, Price, Ticker, Timestamp, Trade, Volume};
use serde::Deserialize;

/// A JSON value that is numeric in spirit but may arrive quoted
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexNum {
    Num(f64),
    Str(String),
}

impl FlexNum {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlexNum::Num(n) => Some(*n),
            FlexNum::Str(s) => s.parse::<f64>().ok(),
        }
    }
}

/// Envelope: only the event tag, used to dispatch the concrete DTO
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(rename = "e")]
    event_type: String,
}

/// DTO - incremental depth diff
#[derive(Debug, Deserialize)]
pub struct DepthUpdateDto {
    #[serde(rename = "b", default)]
    pub bid_updates: Vec<(FlexNum, FlexNum)>,
    #[serde(rename = "a", default)]
    pub ask_updates: Vec<(FlexNum, FlexNum)>,
}

/// DTO - executed trade tick
#[derive(Debug, Deserialize)]
pub struct TradeDto {
    #[serde(rename = "t", default)]
    pub trade_id: Option<serde_json::Value>,
    #[serde(rename = "p")]
    pub price: FlexNum,
    #[serde(rename = "q")]
    pub quantity: FlexNum,
    #[serde(rename = "m", default)]
    pub is_buyer_maker: bool,
    #[serde(rename = "T")]
    pub timestamp: u64,
}

/// DTO - 24h ticker snapshot
#[derive(Debug, Deserialize)]
pub struct TickerDto {
    #[serde(rename = "c")]
    pub last_price: FlexNum,
    #[serde(rename = "P")]
    pub price_change_percent: FlexNum,
    #[serde(rename = "h")]
    pub high_price: FlexNum,
    #[serde(rename = "l")]
    pub low_price: FlexNum,
    #[serde(rename = "v")]
    pub volume: FlexNum,
}

/// Parsed domain-facing feed message
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Depth { bid_updates: Vec<(f64, f64)>, ask_updates: Vec<(f64, f64)> },
    Trade(Trade),
    Ticker(TickerFields),
}

/// Ticker payload without the pair symbol - the store owns the active pair
#[derive(Debug, Clone)]
pub struct TickerFields {
    pub last_price: f64,
    pub price_change_percent: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume_24h: f64,
}

impl TickerFields {
    pub fn into_ticker(self, symbol: crate::domain::market_data::PairSymbol) -> Ticker {
        Ticker {
            symbol,
            last_price: Price::from(self.last_price),
            price_change_percent: self.price_change_percent,
            high_24h: Price::from(self.high_24h),
            low_24h: Price::from(self.low_24h),
            volume_24h: Volume::from(self.volume_24h),
        }
    }
}

/// Parse one raw feed frame. Unknown event types and malformed payloads are
/// reported as errors for the stream loop to drop.
pub fn parse_feed_message(raw: &str) -> Result<FeedMessage, String> {
    let envelope: FeedEnvelope =
        serde_json::from_str(raw).map_err(|e| format!("not a feed message: {e}"))?;

    match envelope.event_type.as_str() {
        "depthUpdate" => {
            let dto: DepthUpdateDto =
                serde_json::from_str(raw).map_err(|e| format!("bad depth diff: {e}"))?;
            Ok(FeedMessage::Depth {
                bid_updates: parse_levels(&dto.bid_updates),
                ask_updates: parse_levels(&dto.ask_updates),
            })
        }
        "trade" | "aggTrade" => {
            let dto: TradeDto =
                serde_json::from_str(raw).map_err(|e| format!("bad trade: {e}"))?;
            dto.to_domain()
        }
        "24hrTicker" => {
            let dto: TickerDto =
                serde_json::from_str(raw).map_err(|e| format!("bad ticker: {e}"))?;
            dto.to_domain()
        }
        other => Err(format!("unknown event type: {other}")),
    }
}

/// Entries that fail numeric parsing are dropped, never propagated
fn parse_levels(raw: &[(FlexNum, FlexNum)]) -> Vec<(f64, f64)> {
    raw.iter()
        .filter_map(|(price, qty)| Some((price.as_f64()?, qty.as_f64()?)))
        .collect()
}

impl TradeDto {
    pub fn to_domain(&self) -> Result<FeedMessage, String> {
        let price = self.price.as_f64().ok_or("invalid trade price")?;
        let quantity = self.quantity.as_f64().ok_or("invalid trade quantity")?;
        let id = match &self.trade_id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => format!("t-{}", self.timestamp),
        };
        Ok(FeedMessage::Trade(Trade {
            id,
            price: Price::from(price),
            amount: Amount::from(quantity),
            // A buyer-maker print means the taker sold into the bid
            side: if self.is_buyer_maker { OrderSide::Sell } else { OrderSide::Buy },
            timestamp: Timestamp::from_millis(self.timestamp),
        }))
    }
}

impl TickerDto {
    pub fn to_domain(&self) -> Result<FeedMessage, String> {
        Ok(FeedMessage::Ticker(TickerFields {
            last_price: self.last_price.as_f64().ok_or("invalid last price")?,
            price_change_percent: self.price_change_percent.as_f64().ok_or("invalid change")?,
            high_24h: self.high_price.as_f64().ok_or("invalid high")?,
            low_24h: self.low_price.as_f64().ok_or("invalid low")?,
            volume_24h: self.volume.as_f64().ok_or("invalid volume")?,
        }))
    }
}
