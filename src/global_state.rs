use crate::domain::chart::drawings::DrawingKind;
use crate::domain::market_data::{PairSymbol, Timeframe};
use crate::infrastructure::rendering::{ActiveIndicators, PanelIndicator};
use leptos::*;
use once_cell::sync::OnceCell;

pub struct Globals {
    pub current_pair: RwSignal<PairSymbol>,
    pub current_timeframe: RwSignal<Timeframe>,
    pub last_price: RwSignal<f64>,
    pub price_change: RwSignal<f64>,
    pub candle_count: RwSignal<usize>,
    pub is_streaming: RwSignal<bool>,
    pub draw_mode: RwSignal<Option<DrawingKind>>,
    pub draw_color: RwSignal<String>,
    pub hovered_drawing: RwSignal<Option<String>>,
    pub active_indicators: RwSignal<ActiveIndicators>,
    pub is_dragging: RwSignal<bool>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        current_pair: create_rw_signal(PairSymbol::from("AMR/NVR")),
        current_timeframe: create_rw_signal(Timeframe::OneMinute),
        last_price: create_rw_signal(0.0),
        price_change: create_rw_signal(0.0),
        candle_count: create_rw_signal(0),
        is_streaming: create_rw_signal(false),
        draw_mode: create_rw_signal(None),
        draw_color: create_rw_signal(crate::domain::chart::drawings::DEFAULT_DRAW_COLOR.to_string()),
        hovered_drawing: create_rw_signal(None),
        active_indicators: create_rw_signal(ActiveIndicators {
            bollinger: false,
            panels: vec![PanelIndicator::Rsi],
        }),
        is_dragging: create_rw_signal(false),
    })
}

crate::global_signals! {
    pub current_pair => current_pair: crate::domain::market_data::PairSymbol,
    pub current_timeframe => current_timeframe: crate::domain::market_data::Timeframe,
    pub last_price => last_price: f64,
    pub price_change => price_change: f64,
    pub candle_count => candle_count: usize,
    pub is_streaming => is_streaming: bool,
    pub draw_mode => draw_mode: Option<crate::domain::chart::drawings::DrawingKind>,
    pub draw_color => draw_color: String,
    pub hovered_drawing => hovered_drawing: Option<String>,
    pub active_indicators => active_indicators: crate::infrastructure::rendering::ActiveIndicators,
    pub is_dragging => is_dragging: bool,
}
