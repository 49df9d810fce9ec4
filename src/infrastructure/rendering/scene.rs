//! Frame scene construction: projects the visible domain window onto pixel
//! space and emits an ordered draw-command list. Pure data in, pure data
//! out - the canvas backend only executes what is built here.

use crate::domain::chart::drawings::{
    DrawingKind, DrawingObject, FIB_LEVELS, PixelPoint, project_endpoints, ray_end,
};
use crate::domain::chart::projection::{
    ChartProjection, GRID_ROWS, VOLUME_LANE_RATIO,
};
use crate::domain::chart::viewport::ViewportState;
use crate::domain::market_data::{Candle, indicator_engine};
use crate::time_utils::format_time_label;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Indicators rendered as stacked sub-panels below the main panel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumIter, EnumString, AsRefStr,
)]
pub enum PanelIndicator {
    #[strum(serialize = "rsi")]
    Rsi,
    #[strum(serialize = "macd")]
    Macd,
    #[strum(serialize = "index")]
    CompositeIndex,
}

/// Render-layer indicator selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveIndicators {
    pub bollinger: bool,
    pub panels: Vec<PanelIndicator>,
}

/// Fixed chart palette
pub struct ChartPalette {
    pub background: &'static str,
    pub up: &'static str,
    pub down: &'static str,
    pub up_volume: &'static str,
    pub down_volume: &'static str,
    pub grid: &'static str,
    pub text: &'static str,
    pub crosshair: &'static str,
    pub panel_label: &'static str,
    pub rsi_line: &'static str,
    pub hover: &'static str,
}

pub const PALETTE: ChartPalette = ChartPalette {
    background: "#020309",
    up: "#2ebd85",
    down: "#f6465d",
    up_volume: "rgba(46, 189, 133, 0.15)",
    down_volume: "rgba(246, 70, 93, 0.15)",
    grid: "#1e222d",
    text: "#848e9c",
    crosshair: "#ffffff",
    panel_label: "#37c5ff",
    rsi_line: "#7b5bff",
    hover: "#ffffff",
};

/// One canvas operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear { color: String },
    Rect { x: f64, y: f64, w: f64, h: f64, color: String, filled: bool },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, color: String, width: f64, dashed: bool },
    Polyline { points: Vec<(f64, f64)>, color: String, width: f64 },
    Text { text: String, x: f64, y: f64, color: String },
}

/// Ordered command list for one frame
#[derive(Debug)]
pub struct Scene {
    pub commands: Vec<DrawCmd>,
    pub projection: ChartProjection,
}

pub struct SceneParams<'a> {
    pub candles: &'a [Candle],
    pub viewport: &'a ViewportState,
    pub width: f64,
    pub height: f64,
    pub indicators: &'a ActiveIndicators,
    pub drawings: &'a [DrawingObject],
    pub hovered_drawing: Option<&'a str>,
    pub pending: Option<(DrawingKind, PixelPoint, PixelPoint)>,
    pub draw_color: &'a str,
    pub crosshair: Option<(f64, f64)>,
}

/// Build the full frame: background, grids, volume, candles, indicator
/// sub-panels, committed drawings, pending preview, crosshair - in that
/// order.
pub fn build_scene(params: &SceneParams) -> Scene {
    let projection = ChartProjection::new(
        params.candles,
        params.viewport,
        params.width,
        params.height,
        params.indicators.panels.len(),
        params.indicators.bollinger,
    );

    let mut commands = Vec::new();
    commands.push(DrawCmd::Clear { color: PALETTE.background.to_string() });

    push_price_grid(&mut commands, &projection);
    push_time_grid(&mut commands, &projection, params.candles);
    push_volume_bars(&mut commands, &projection, params.candles);
    push_candles(&mut commands, &projection, params.candles);
    push_panels(&mut commands, &projection, params.candles, &params.indicators.panels);
    for drawing in params.drawings {
        let hovered = params.hovered_drawing == Some(drawing.id.as_str());
        push_drawing(&mut commands, &projection, params.candles, drawing, hovered);
    }
    if let Some((kind, p1, p2)) = params.pending {
        push_pending(&mut commands, kind, p1, p2, params.draw_color);
    }
    if let Some((x, y)) = params.crosshair {
        push_crosshair(&mut commands, &projection, x, y);
    }

    Scene { commands, projection }
}

/// Horizontal grid rows with price labels in the right gutter
fn push_price_grid(commands: &mut Vec<DrawCmd>, projection: &ChartProjection) {
    let range = projection.max_price - projection.min_price;
    for i in 0..=GRID_ROWS {
        let y = projection.main_height / GRID_ROWS as f64 * i as f64;
        commands.push(DrawCmd::Line {
            x1: 0.0,
            y1: y,
            x2: projection.chart_width,
            y2: y,
            color: PALETTE.grid.to_string(),
            width: 1.0,
            dashed: false,
        });
        let price = projection.max_price - range / GRID_ROWS as f64 * i as f64;
        commands.push(DrawCmd::Text {
            text: format!("{:.2}", price),
            x: projection.chart_width + 5.0,
            y: y + 3.0,
            color: PALETTE.text.to_string(),
        });
    }
}

/// Vertical grid lines at a fixed pixel cadence, snapped to candle
/// boundaries, with time labels along the bottom strip
fn push_time_grid(commands: &mut Vec<DrawCmd>, projection: &ChartProjection, candles: &[Candle]) {
    if candles.is_empty() {
        return;
    }
    let (start, end) = projection.visible_bounds(candles.len());
    let span_ms = if end > start + 1 {
        candles[end - 1].time.value().saturating_sub(candles[start].time.value())
    } else {
        0
    };

    let step = projection.candles_per_time_grid();
    let first = projection.start_idx - projection.start_idx.rem_euclid(step);
    let mut idx = first;
    while idx < projection.end_idx {
        if idx >= 0 && (idx as usize) < candles.len() {
            let x = projection.index_to_x_center(idx);
            if x >= 0.0 && x <= projection.chart_width {
                commands.push(DrawCmd::Line {
                    x1: x,
                    y1: 0.0,
                    x2: x,
                    y2: projection.height,
                    color: PALETTE.grid.to_string(),
                    width: 1.0,
                    dashed: false,
                });
                commands.push(DrawCmd::Text {
                    text: format_time_label(candles[idx as usize].time.value(), span_ms),
                    x,
                    y: projection.height - 5.0,
                    color: PALETTE.text.to_string(),
                });
            }
        }
        idx += step;
    }
}

/// Direction-tinted volume lane along the bottom of the main panel
fn push_volume_bars(commands: &mut Vec<DrawCmd>, projection: &ChartProjection, candles: &[Candle]) {
    let (start, end) = projection.visible_bounds(candles.len());
    let max_volume = candles[start..end]
        .iter()
        .map(|c| c.ohlcv.volume.value())
        .fold(0.0_f64, f64::max);
    if max_volume <= 0.0 {
        return;
    }

    let lane_height = projection.main_height * VOLUME_LANE_RATIO;
    for (i, candle) in candles[start..end].iter().enumerate() {
        let idx = (start + i) as i64;
        let bar_height = candle.ohlcv.volume.value() / max_volume * lane_height;
        let color = if candle.is_bullish() { PALETTE.up_volume } else { PALETTE.down_volume };
        commands.push(DrawCmd::Rect {
            x: projection.index_to_x(idx),
            y: projection.main_height - bar_height,
            w: projection.candle_width,
            h: bar_height,
            color: color.to_string(),
            filled: true,
        });
    }
}

/// Candle wicks and bodies, colored by close >= open
fn push_candles(commands: &mut Vec<DrawCmd>, projection: &ChartProjection, candles: &[Candle]) {
    let (start, end) = projection.visible_bounds(candles.len());
    for (i, candle) in candles[start..end].iter().enumerate() {
        let idx = (start + i) as i64;
        let x = projection.index_to_x(idx);
        let center = projection.index_to_x_center(idx);
        let color = if candle.is_bullish() { PALETTE.up } else { PALETTE.down };

        let open_y = projection.price_to_y(candle.ohlcv.open.value());
        let close_y = projection.price_to_y(candle.ohlcv.close.value());
        let high_y = projection.price_to_y(candle.ohlcv.high.value());
        let low_y = projection.price_to_y(candle.ohlcv.low.value());

        commands.push(DrawCmd::Line {
            x1: center,
            y1: high_y,
            x2: center,
            y2: low_y,
            color: color.to_string(),
            width: 1.0,
            dashed: false,
        });
        commands.push(DrawCmd::Rect {
            x,
            y: open_y.min(close_y),
            w: projection.candle_width,
            h: (close_y - open_y).abs().max(1.0),
            color: color.to_string(),
            filled: true,
        });
    }
}

/// Stacked indicator sub-panels below the main panel
fn push_panels(
    commands: &mut Vec<DrawCmd>,
    projection: &ChartProjection,
    candles: &[Candle],
    panels: &[PanelIndicator],
) {
    let (start, end) = projection.visible_bounds(candles.len());
    let closes: Vec<f64> = candles.iter().map(|c| c.ohlcv.close.value()).collect();

    for (panel_idx, panel) in panels.iter().enumerate() {
        let top = projection.panel_top(panel_idx);
        let bottom = top + projection.panel_height;
        commands.push(DrawCmd::Line {
            x1: 0.0,
            y1: top,
            x2: projection.width,
            y2: top,
            color: PALETTE.grid.to_string(),
            width: 1.0,
            dashed: false,
        });
        commands.push(DrawCmd::Text {
            text: panel.as_ref().to_uppercase(),
            x: 5.0,
            y: top + 15.0,
            color: PALETTE.panel_label.to_string(),
        });

        match panel {
            PanelIndicator::Rsi => {
                let series = indicator_engine::rsi_series(&closes, 14);
                push_ratio_curve(commands, projection, &series, start, end, bottom, PALETTE.rsi_line);
            }
            PanelIndicator::CompositeIndex => {
                let series: Vec<f64> = candles
                    .iter()
                    .map(|c| {
                        indicator_engine::composite_index(
                            c.ohlcv.high.value(),
                            c.ohlcv.low.value(),
                            c.ohlcv.close.value(),
                            c.ohlcv.volume.value(),
                        )
                    })
                    .collect();
                push_ratio_curve(
                    commands, projection, &series, start, end, bottom, PALETTE.panel_label,
                );
            }
            PanelIndicator::Macd => {
                push_macd_histogram(commands, projection, &closes, start, end, top, bottom);
            }
        }
    }
}

/// Polyline of a [0, 100]-valued series inside one panel
fn push_ratio_curve(
    commands: &mut Vec<DrawCmd>,
    projection: &ChartProjection,
    series: &[f64],
    start: usize,
    end: usize,
    bottom: f64,
    color: &str,
) {
    let points: Vec<(f64, f64)> = series[start..end.min(series.len())]
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = projection.index_to_x_center((start + i) as i64);
            let y = bottom - value.clamp(0.0, 100.0) / 100.0 * projection.panel_height;
            (x, y)
        })
        .collect();
    if points.len() > 1 {
        commands.push(DrawCmd::Polyline { points, color: color.to_string(), width: 1.0 });
    }
}

/// Histogram bars around the panel midline, scaled to the visible extreme
fn push_macd_histogram(
    commands: &mut Vec<DrawCmd>,
    projection: &ChartProjection,
    closes: &[f64],
    start: usize,
    end: usize,
    top: f64,
    bottom: f64,
) {
    let series = indicator_engine::macd_histogram_series(closes);
    let end = end.min(series.len());
    if start >= end {
        return;
    }
    let extreme = series[start..end].iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if extreme <= 0.0 {
        return;
    }
    let mid = (top + bottom) / 2.0;
    let half = projection.panel_height / 2.0;
    for (i, value) in series[start..end].iter().enumerate() {
        let idx = (start + i) as i64;
        let height = value / extreme * half;
        let color = if *value >= 0.0 { PALETTE.up } else { PALETTE.down };
        commands.push(DrawCmd::Rect {
            x: projection.index_to_x(idx),
            y: mid - height.max(0.0),
            w: projection.candle_width,
            h: height.abs().max(1.0),
            color: color.to_string(),
            filled: true,
        });
    }
}

/// One committed drawing, re-projected from domain coordinates
fn push_drawing(
    commands: &mut Vec<DrawCmd>,
    projection: &ChartProjection,
    candles: &[Candle],
    drawing: &DrawingObject,
    hovered: bool,
) {
    let (x1, y1, x2, y2) = project_endpoints(drawing, projection, candles);
    let color =
        if hovered { PALETTE.hover.to_string() } else { drawing.color.clone() };
    let width = if hovered { 3.0 } else { 2.0 };

    match drawing.kind {
        DrawingKind::Trendline | DrawingKind::Horizontal | DrawingKind::Channel => {
            commands.push(DrawCmd::Line { x1, y1, x2, y2, color, width, dashed: false });
        }
        DrawingKind::Ray => {
            let (end_x, end_y) = ray_end(x1, y1, x2, y2, projection.chart_width);
            commands.push(DrawCmd::Line {
                x1,
                y1,
                x2: end_x,
                y2: end_y,
                color,
                width,
                dashed: false,
            });
        }
        DrawingKind::Rect => {
            push_rect_shape(commands, x1, y1, x2, y2, &color);
        }
        DrawingKind::Fib => {
            push_fib_shape(commands, x1, y1, x2, y2, &color, width);
        }
    }
}

/// Dashed preview of the in-flight gesture, rendered in pixel space. Rays are
/// not extrapolated while pending - only committed state earns the edge
/// extension.
fn push_pending(
    commands: &mut Vec<DrawCmd>,
    kind: DrawingKind,
    p1: PixelPoint,
    p2: PixelPoint,
    color: &str,
) {
    match kind {
        DrawingKind::Rect => {
            commands.push(DrawCmd::Rect {
                x: p1.x.min(p2.x),
                y: p1.y.min(p2.y),
                w: (p2.x - p1.x).abs(),
                h: (p2.y - p1.y).abs(),
                color: format!("{color}20"),
                filled: true,
            });
            commands.push(DrawCmd::Line {
                x1: p1.x,
                y1: p1.y,
                x2: p2.x,
                y2: p2.y,
                color: color.to_string(),
                width: 2.0,
                dashed: true,
            });
        }
        _ => {
            commands.push(DrawCmd::Line {
                x1: p1.x,
                y1: p1.y,
                x2: p2.x,
                y2: p2.y,
                color: color.to_string(),
                width: 2.0,
                dashed: true,
            });
        }
    }
}

fn push_rect_shape(commands: &mut Vec<DrawCmd>, x1: f64, y1: f64, x2: f64, y2: f64, color: &str) {
    let (x, w) = (x1.min(x2), (x2 - x1).abs());
    let (y, h) = (y1.min(y2), (y2 - y1).abs());
    // Hex alpha suffix fills translucent, outline stays solid
    commands.push(DrawCmd::Rect { x, y, w, h, color: format!("{color}20"), filled: true });
    commands.push(DrawCmd::Rect { x, y, w, h, color: color.to_string(), filled: false });
}

fn push_fib_shape(
    commands: &mut Vec<DrawCmd>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    color: &str,
    width: f64,
) {
    commands.push(DrawCmd::Line {
        x1,
        y1,
        x2,
        y2,
        color: color.to_string(),
        width,
        dashed: true,
    });
    let diff_y = y2 - y1;
    let (left, right) = (x1.min(x2), x1.max(x2));
    for level in FIB_LEVELS {
        let y = y1 + diff_y * level;
        commands.push(DrawCmd::Line {
            x1: left,
            y1: y,
            x2: right,
            y2: y,
            color: color.to_string(),
            width,
            dashed: false,
        });
        commands.push(DrawCmd::Text {
            text: format!("{level}"),
            x: right + 2.0,
            y: y + 3.0,
            color: color.to_string(),
        });
    }
}

/// Crosshair with a price tag in the right gutter, only inside the plot area
fn push_crosshair(commands: &mut Vec<DrawCmd>, projection: &ChartProjection, x: f64, y: f64) {
    if x >= projection.chart_width || y >= projection.main_height {
        return;
    }
    commands.push(DrawCmd::Line {
        x1: x,
        y1: 0.0,
        x2: x,
        y2: projection.main_height,
        color: PALETTE.crosshair.to_string(),
        width: 1.0,
        dashed: true,
    });
    commands.push(DrawCmd::Line {
        x1: 0.0,
        y1: y,
        x2: projection.chart_width,
        y2: y,
        color: PALETTE.crosshair.to_string(),
        width: 1.0,
        dashed: true,
    });
    commands.push(DrawCmd::Rect {
        x: projection.chart_width,
        y: y - 10.0,
        w: projection.width - projection.chart_width,
        h: 20.0,
        color: PALETTE.grid.to_string(),
        filled: true,
    });
    commands.push(DrawCmd::Text {
        text: format!("{:.2}", projection.y_to_price(y)),
        x: projection.chart_width + 5.0,
        y: y + 4.0,
        color: PALETTE.crosshair.to_string(),
    });
}
