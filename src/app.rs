use leptos::html::Canvas;
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use strum::IntoEnumIterator;

use crate::application::market_service;
use crate::domain::chart::drawings::{self, DrawingKind, DrawingObject, DrawingTool};
use crate::domain::chart::projection::ChartProjection;
use crate::domain::chart::viewport::ViewportState;
use crate::domain::market_data::{Candle, PAIRS, PairConfig, PairSymbol, Timeframe};
use crate::global_state::{
    candle_count, current_pair, current_timeframe, draw_color, draw_mode, hovered_drawing,
    is_dragging, is_streaming, last_price, price_change,
};
use crate::infrastructure::rendering::{CanvasChartRenderer, PanelIndicator, SceneParams, build_scene};
use crate::infrastructure::storage::ChartStorage;

const CANVAS_ID: &str = "trade-chart-canvas";
const CANVAS_WIDTH: u32 = 960;
const CANVAS_HEIGHT: u32 = 520;

/// 🦀 Trading terminal root component
#[component]
pub fn App() -> impl IntoView {
    // Engine starts once with the app shell
    market_service().start();

    view! {
        <style>
            {r#"
            .trade-terminal {
                font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
                background: #020309;
                min-height: 100vh;
                padding: 16px;
                color: #e6e8ea;
            }

            .terminal-header {
                display: flex;
                align-items: baseline;
                gap: 24px;
                padding: 12px 16px;
                background: #0b0e15;
                border: 1px solid #1e222d;
                border-radius: 8px;
                margin-bottom: 12px;
            }

            .pair-name {
                font-size: 20px;
                font-weight: 700;
            }

            .pair-price {
                font-size: 20px;
                font-family: 'Courier New', monospace;
            }

            .price-up { color: #2ebd85; }
            .price-down { color: #f6465d; }

            .ticker-stat {
                font-size: 12px;
                color: #848e9c;
            }

            .stream-badge {
                margin-left: auto;
                font-size: 12px;
            }

            .toolbar {
                display: flex;
                flex-wrap: wrap;
                gap: 6px;
                margin-bottom: 12px;
            }

            .toolbar button {
                background: #0b0e15;
                color: #848e9c;
                border: 1px solid #1e222d;
                border-radius: 6px;
                padding: 4px 10px;
                font-size: 12px;
                cursor: pointer;
            }

            .toolbar button:hover { color: #e6e8ea; }
            .toolbar button.active {
                color: #e6e8ea;
                border-color: #37c5ff;
            }

            .toolbar .spacer { width: 16px; }

            .chart-wrapper {
                position: relative;
                display: inline-block;
                border: 1px solid #1e222d;
                border-radius: 8px;
                overflow: hidden;
            }

            .delete-hint {
                position: absolute;
                top: 8px;
                left: 8px;
                background: rgba(246, 70, 93, 0.9);
                color: white;
                font-size: 10px;
                font-weight: 700;
                padding: 2px 8px;
                border-radius: 4px;
                pointer-events: none;
            }
            "#}
        </style>
        <div class="trade-terminal">
            <Header />
            <Toolbar />
            <ChartContainer />
        </div>
    }
}

/// 📊 Pair header driven by live ticker signals
#[component]
fn Header() -> impl IntoView {
    let decimals = move || PairConfig::for_pair(&current_pair().get()).price_decimals as usize;

    view! {
        <div class="terminal-header">
            <span class="pair-name">{move || current_pair().get().value().to_string()}</span>
            <span
                class="pair-price"
                class=("price-up", move || price_change().get() >= 0.0)
                class=("price-down", move || price_change().get() < 0.0)
            >
                {move || format!("{:.*}", decimals(), last_price().get())}
            </span>
            <span class="ticker-stat">
                {move || format!("{:+.2}%", price_change().get())}
            </span>
            <span class="ticker-stat">
                {move || format!("{} candles", candle_count().get())}
            </span>
            <span class="stream-badge">
                {move || if is_streaming().get() { "🟢 LIVE" } else { "🔴 POLL" }}
            </span>
        </div>
    }
}

/// 🧰 Pair / timeframe / drawing-tool selection
#[component]
fn Toolbar() -> impl IntoView {
    let pair_buttons = PAIRS
        .iter()
        .map(|config| {
            let symbol = config.symbol;
            view! {
                <button
                    class:active=move || current_pair().get().value() == symbol
                    on:click=move |_| current_pair().set(PairSymbol::from(symbol))
                >
                    {symbol}
                </button>
            }
        })
        .collect_view();

    let timeframe_buttons = Timeframe::iter()
        .map(|tf| {
            view! {
                <button
                    class:active=move || current_timeframe().get() == tf
                    on:click=move |_| current_timeframe().set(tf)
                >
                    {tf.to_feed_str().to_string()}
                </button>
            }
        })
        .collect_view();

    let tool_buttons = DrawingKind::TOOLS
        .iter()
        .map(|&kind| {
            view! {
                <button
                    class:active=move || draw_mode().get() == Some(kind)
                    on:click=move |_| {
                        let mode = draw_mode();
                        if mode.get_untracked() == Some(kind) {
                            mode.set(None);
                        } else {
                            mode.set(Some(kind));
                        }
                    }
                >
                    {kind.as_ref().to_string()}
                </button>
            }
        })
        .collect_view();

    let panel_buttons = [PanelIndicator::Rsi, PanelIndicator::Macd, PanelIndicator::CompositeIndex]
        .into_iter()
        .map(|panel| {
            view! {
                <button
                    class:active=move || {
                        crate::global_state::active_indicators()
                            .get()
                            .panels
                            .contains(&panel)
                    }
                    on:click=move |_| toggle_panel(panel)
                >
                    {panel.as_ref().to_uppercase()}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="toolbar">
            {pair_buttons}
            <span class="spacer"></span>
            {timeframe_buttons}
            <span class="spacer"></span>
            {tool_buttons}
            <span class="spacer"></span>
            {panel_buttons}
            <button
                class:active=move || crate::global_state::active_indicators().get().bollinger
                on:click=move |_| {
                    crate::global_state::active_indicators().update(|set| {
                        set.bollinger = !set.bollinger;
                    })
                }
            >
                "BOLL"
            </button>
        </div>
    }
}

/// Pointer-interaction state shared by the canvas handlers
struct ChartController {
    viewport: RefCell<ViewportState>,
    tool: RefCell<DrawingTool>,
    drag_start: RefCell<Option<(f64, f64)>>,
    renderer: CanvasChartRenderer,
}

impl ChartController {
    fn new() -> Self {
        Self {
            viewport: RefCell::new(ViewportState::default()),
            tool: RefCell::new(DrawingTool::new()),
            drag_start: RefCell::new(None),
            renderer: CanvasChartRenderer::new(CANVAS_ID, CANVAS_WIDTH, CANVAS_HEIGHT),
        }
    }

    /// Rebuild the frame projection the same way the renderer will
    fn projection(&self, candles: &[Candle]) -> ChartProjection {
        let indicators = crate::global_state::active_indicators().get_untracked();
        ChartProjection::new(
            candles,
            &self.viewport.borrow(),
            CANVAS_WIDTH as f64,
            CANVAS_HEIGHT as f64,
            indicators.panels.len(),
            indicators.bollinger,
        )
    }
}

/// 🎨 Canvas chart with the full pointer pipeline
#[component]
fn ChartContainer() -> impl IntoView {
    let service = market_service();
    let controller = Rc::new(ChartController::new());
    let canvas_ref = create_node_ref::<Canvas>();

    let drawings = create_rw_signal::<Vec<DrawingObject>>(Vec::new());
    let crosshair = create_rw_signal::<Option<(f64, f64)>>(None);
    // Bumped by the notification bus; every repaint hangs off this signal
    let revision = create_rw_signal(0u64);

    // Data-change notifications drive the ticker signals and a repaint
    {
        let service = service.clone();
        let subscription = market_service().subscribe(move || {
            let snapshot = service.snapshot();
            last_price().set(snapshot.ticker.last_price.value());
            price_change().set(snapshot.ticker.price_change_percent);
            candle_count().set(snapshot.candles.len());
            is_streaming().set(service.is_feed_open());
            revision.update(|r| *r += 1);
        });
        on_cleanup(move || drop(subscription));
    }

    // Pair switch: swap data sources and per-pair persisted state
    {
        let service = market_service();
        let controller = Rc::clone(&controller);
        create_effect(move |previous: Option<PairSymbol>| {
            let pair = current_pair().get();
            if previous.as_ref() != Some(&pair) {
                *controller.viewport.borrow_mut() = ChartStorage::load_viewport(&pair);
                drawings.set(ChartStorage::load_drawings(&pair));
                hovered_drawing().set(None);
                if previous.is_some() {
                    service.set_pair(pair.clone());
                }
            }
            pair
        });
    }

    // Timeframe switch refetches history
    {
        let service = market_service();
        create_effect(move |previous: Option<Timeframe>| {
            let timeframe = current_timeframe().get();
            if previous.is_some() && previous != Some(timeframe) {
                service.set_timeframe(timeframe);
            }
            timeframe
        });
    }

    // Arm/disarm the drawing tool from the toolbar signals
    {
        let controller = Rc::clone(&controller);
        create_effect(move |_| {
            let kind = draw_mode().get();
            controller.tool.borrow_mut().select(kind);
        });
    }
    {
        let controller = Rc::clone(&controller);
        create_effect(move |_| {
            controller.tool.borrow_mut().set_color(&draw_color().get());
        });
    }

    // Repaint on any reactive change
    {
        let service = market_service();
        let controller = Rc::clone(&controller);
        create_effect(move |_| {
            let _ = revision.get();
            let drawing_list = drawings.get();
            let pointer = crosshair.get();
            let hovered = hovered_drawing().get();
            let indicators = crate::global_state::active_indicators().get();
            if canvas_ref.get().is_none() {
                return;
            }

            service.with_store(|store| {
                let candles = store.candles().to_vec();
                let tool = controller.tool.borrow();
                let scene = build_scene(&SceneParams {
                    candles: &candles,
                    viewport: &controller.viewport.borrow(),
                    width: CANVAS_WIDTH as f64,
                    height: CANVAS_HEIGHT as f64,
                    indicators: &indicators,
                    drawings: &drawing_list,
                    hovered_drawing: hovered.as_deref(),
                    pending: tool.pending(),
                    draw_color: tool.color(),
                    crosshair: pointer,
                });
                if let Err(e) = controller.renderer.render(&scene) {
                    crate::log_warn!(
                        crate::domain::logging::LogComponent::Presentation("Chart"),
                        "Render failed: {e}"
                    );
                }
            });
        });
    }

    let on_mouse_down = {
        let controller = Rc::clone(&controller);
        move |ev: web_sys::MouseEvent| {
            let (x, y) = (ev.offset_x() as f64, ev.offset_y() as f64);

            // Secondary button: delete the hovered drawing in any tool state
            if ev.button() == 2 {
                if let Some(id) = hovered_drawing().get_untracked() {
                    ev.prevent_default();
                    drawings.update(|list| list.retain(|d| d.id != id));
                    ChartStorage::save_drawings(
                        &current_pair().get_untracked(),
                        &drawings.get_untracked(),
                    );
                    hovered_drawing().set(None);
                }
                return;
            }

            if controller.tool.borrow().is_armed() {
                controller.tool.borrow_mut().pointer_down(x, y);
            } else {
                is_dragging().set(true);
                *controller.drag_start.borrow_mut() = Some((x, y));
            }
        }
    };

    let on_mouse_move = {
        let service = service.clone();
        let controller = Rc::clone(&controller);
        move |ev: web_sys::MouseEvent| {
            let (x, y) = (ev.offset_x() as f64, ev.offset_y() as f64);
            crosshair.set(Some((x, y)));

            let mut tool = controller.tool.borrow_mut();
            if tool.pending().is_some() {
                tool.pointer_move(x, y);
                drop(tool);
                revision.update(|r| *r += 1);
                return;
            }
            drop(tool);

            if is_dragging().get_untracked() {
                let mut drag_start = controller.drag_start.borrow_mut();
                if let Some((start_x, _)) = *drag_start {
                    controller.viewport.borrow_mut().apply_drag(start_x - x);
                    *drag_start = Some((x, y));
                    drop(drag_start);
                    revision.update(|r| *r += 1);
                }
                return;
            }

            // Cursor mode: hover test against committed drawings
            if !controller.tool.borrow().is_armed() {
                let hit = service.with_store(|store| {
                    let candles = store.candles().to_vec();
                    let projection = controller.projection(&candles);
                    drawings::hit_test(&drawings.get_untracked(), x, y, &projection, &candles)
                        .map(|d| d.id.clone())
                });
                hovered_drawing().set(hit);
            }
        }
    };

    let on_mouse_up = {
        let service = service.clone();
        let controller = Rc::clone(&controller);
        move |_ev: web_sys::MouseEvent| {
            let committed = service.with_store(|store| {
                let candles = store.candles().to_vec();
                let projection = controller.projection(&candles);
                controller.tool.borrow_mut().pointer_up(&projection, &candles)
            });
            if let Some(drawing) = committed {
                drawings.update(|list| list.push(drawing));
                ChartStorage::save_drawings(
                    &current_pair().get_untracked(),
                    &drawings.get_untracked(),
                );
            }

            if is_dragging().get_untracked() {
                ChartStorage::save_viewport(
                    &current_pair().get_untracked(),
                    &controller.viewport.borrow(),
                );
            }
            is_dragging().set(false);
            *controller.drag_start.borrow_mut() = None;
        }
    };

    let on_mouse_leave = {
        let controller = Rc::clone(&controller);
        move |_ev: web_sys::MouseEvent| {
            crosshair.set(None);
            controller.tool.borrow_mut().cancel();
            is_dragging().set(false);
            *controller.drag_start.borrow_mut() = None;
            revision.update(|r| *r += 1);
        }
    };

    let on_wheel = {
        let controller = Rc::clone(&controller);
        move |ev: web_sys::WheelEvent| {
            ev.prevent_default();
            controller
                .viewport
                .borrow_mut()
                .apply_wheel(ev.delta_y(), ev.ctrl_key() || ev.meta_key());
            ChartStorage::save_viewport(
                &current_pair().get_untracked(),
                &controller.viewport.borrow(),
            );
            revision.update(|r| *r += 1);
        }
    };

    view! {
        <div class="chart-wrapper" on:contextmenu=|ev| ev.prevent_default()>
            <canvas
                id=CANVAS_ID
                node_ref=canvas_ref
                width=CANVAS_WIDTH
                height=CANVAS_HEIGHT
                on:mousedown=on_mouse_down
                on:mousemove=on_mouse_move
                on:mouseup=on_mouse_up
                on:mouseleave=on_mouse_leave
                on:wheel=on_wheel
            />
            <Show when=move || hovered_drawing().get().is_some()>
                <div class="delete-hint">"Right-click to delete"</div>
            </Show>
        </div>
    }
}

/// Toggle helper used by the indicator buttons in the toolbar
pub fn toggle_panel(panel: PanelIndicator) {
    crate::global_state::active_indicators().update(|set| {
        if let Some(pos) = set.panels.iter().position(|p| *p == panel) {
            set.panels.remove(pos);
        } else {
            set.panels.push(panel);
        }
    });
}
