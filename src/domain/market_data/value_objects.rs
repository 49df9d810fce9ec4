use derive_more::{Constructor, Deref, DerefMut, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - price level
#[derive(
    Debug, Clone, Copy, PartialEq, From, Into, Deref, DerefMut, Constructor, Serialize, Deserialize,
)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - traded amount in base units
#[derive(
    Debug, Clone, Copy, PartialEq, From, Into, Deref, DerefMut, Constructor, Serialize, Deserialize,
)]
pub struct Amount(f64);

impl Amount {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - aggregated volume
#[derive(
    Debug, Clone, Copy, PartialEq, From, Into, Deref, DerefMut, Constructor, Serialize, Deserialize,
)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - millisecond timestamp
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    From,
    Into,
    Deref,
    DerefMut,
    Constructor,
    Serialize,
    Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    pub fn from_millis(value: u64) -> Self {
        Self(value)
    }
}

/// Value Object - OHLCV bucket data
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl OHLCV {
    pub fn is_valid(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
            && self.volume.value() >= 0.0
    }
}

/// Value Object - traded pair symbol, e.g. "AMR/NVR"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, DerefMut, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct PairSymbol(String);

impl PairSymbol {
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Storage-safe form of the symbol ("AMR/NVR" -> "AMR-NVR")
    pub fn storage_key(&self) -> String {
        self.0.replace('/', "-")
    }
}

impl From<&str> for PairSymbol {
    fn from(value: &str) -> Self {
        Self(value.to_uppercase())
    }
}

impl From<String> for PairSymbol {
    fn from(value: String) -> Self {
        Self(value.to_uppercase())
    }
}

/// Value Object - taker side of a trade
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum OrderSide {
    #[strum(serialize = "buy")]
    #[serde(rename = "buy")]
    Buy,
    #[strum(serialize = "sell")]
    #[serde(rename = "sell")]
    Sell,
}

/// Value Object - candle bucket duration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Timeframe {
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    OneMinute,

    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    FiveMinutes,

    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,

    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    ThirtyMinutes,

    #[strum(serialize = "1H")]
    #[serde(rename = "1H")]
    OneHour,

    #[strum(serialize = "4H")]
    #[serde(rename = "4H")]
    FourHours,

    #[strum(serialize = "12H")]
    #[serde(rename = "12H")]
    TwelveHours,

    #[strum(serialize = "1D")]
    #[serde(rename = "1D")]
    OneDay,

    #[strum(serialize = "3D")]
    #[serde(rename = "3D")]
    ThreeDays,

    #[strum(serialize = "1W")]
    #[serde(rename = "1W")]
    OneWeek,

    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    OneMonth,

    #[strum(serialize = "1Y")]
    #[serde(rename = "1Y")]
    OneYear,
}

impl Timeframe {
    pub fn to_feed_str(&self) -> &str {
        self.as_ref()
    }

    /// Bucket duration lookup table
    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::OneMinute => 60 * 1000,
            Self::FiveMinutes => 5 * 60 * 1000,
            Self::FifteenMinutes => 15 * 60 * 1000,
            Self::ThirtyMinutes => 30 * 60 * 1000,
            Self::OneHour => 60 * 60 * 1000,
            Self::FourHours => 4 * 60 * 60 * 1000,
            Self::TwelveHours => 12 * 60 * 60 * 1000,
            Self::OneDay => 24 * 60 * 60 * 1000,
            Self::ThreeDays => 3 * 24 * 60 * 60 * 1000,
            Self::OneWeek => 7 * 24 * 60 * 60 * 1000,
            Self::OneMonth => 30 * 24 * 60 * 60 * 1000, // Approximate
            Self::OneYear => 365 * 24 * 60 * 60 * 1000,
        }
    }
}

/// Static per-pair trading configuration for order-entry prefill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairConfig {
    pub symbol: &'static str,
    pub base: &'static str,
    pub quote: &'static str,
    pub min_amount: f64,
    pub price_decimals: u32,
    pub amount_decimals: u32,
}

/// Supported markets
pub static PAIRS: [PairConfig; 3] = [
    PairConfig {
        symbol: "AMR/NVR",
        base: "AMR",
        quote: "NVR",
        min_amount: 0.1,
        price_decimals: 2,
        amount_decimals: 4,
    },
    PairConfig {
        symbol: "IONX/NVR",
        base: "IONX",
        quote: "NVR",
        min_amount: 1.0,
        price_decimals: 4,
        amount_decimals: 2,
    },
    PairConfig {
        symbol: "AMR/IONX",
        base: "AMR",
        quote: "IONX",
        min_amount: 0.01,
        price_decimals: 4,
        amount_decimals: 4,
    },
];

impl PairConfig {
    /// Lookup by symbol; unknown pairs fall back to the first market.
    pub fn for_pair(pair: &PairSymbol) -> &'static PairConfig {
        PAIRS.iter().find(|c| c.symbol == pair.value()).unwrap_or(&PAIRS[0])
    }
}
