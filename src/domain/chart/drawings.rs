//! Annotation drawings: the armed/dragging tool state machine, commit via
//! inverse projection, and pixel-space hit-testing.

use super::projection::ChartProjection;
use crate::domain::market_data::Candle;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Hover distance for line-type drawings, in pixels
pub const HIT_DISTANCE_PX: f64 = 10.0;

/// Default annotation color
pub const DEFAULT_DRAW_COLOR: &str = "#eab308";

/// Fibonacci retracement levels
pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

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
pub enum DrawingKind {
    #[strum(serialize = "trendline")]
    #[serde(rename = "trendline")]
    Trendline,
    #[strum(serialize = "ray")]
    #[serde(rename = "ray")]
    Ray,
    #[strum(serialize = "horizontal")]
    #[serde(rename = "horizontal")]
    Horizontal,
    #[strum(serialize = "rect")]
    #[serde(rename = "rect")]
    Rect,
    #[strum(serialize = "fib")]
    #[serde(rename = "fib")]
    Fib,
    #[strum(serialize = "channel")]
    #[serde(rename = "channel")]
    Channel,
}

impl DrawingKind {
    /// Kinds offered in the tool palette. Channel exists only as stored
    /// data from older sessions.
    pub const TOOLS: [DrawingKind; 5] = [
        DrawingKind::Trendline,
        DrawingKind::Ray,
        DrawingKind::Horizontal,
        DrawingKind::Rect,
        DrawingKind::Fib,
    ];

    pub fn is_rect(&self) -> bool {
        matches!(self, DrawingKind::Rect)
    }
}

/// Anchor point in domain coordinates - never pixels, so drawings re-project
/// cleanly after any zoom or scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    pub time: u64,
    pub price: f64,
}

/// Committed, persistable annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    pub id: String,
    pub kind: DrawingKind,
    pub p1: DomainPoint,
    pub p2: DomainPoint,
    pub color: String,
    pub locked: bool,
}

/// Live gesture endpoint in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Tool gesture state. A pending drawing lives purely in pixel space until
/// pointer-up commits it through the projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawingGesture {
    Idle,
    Armed,
    Dragging { p1: PixelPoint, p2: PixelPoint },
}

/// Finite-state annotation tool:
/// Idle -> Armed (tool selected) -> Dragging (pointer down) -> commit -> Armed
#[derive(Debug)]
pub struct DrawingTool {
    kind: Option<DrawingKind>,
    color: String,
    gesture: DrawingGesture,
    next_id: u64,
}

impl Default for DrawingTool {
    fn default() -> Self {
        Self {
            kind: None,
            color: DEFAULT_DRAW_COLOR.to_string(),
            gesture: DrawingGesture::Idle,
            next_id: 1,
        }
    }
}

impl DrawingTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<DrawingKind> {
        self.kind
    }

    pub fn gesture(&self) -> &DrawingGesture {
        &self.gesture
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Select (arm) or deselect the tool; any in-flight gesture is discarded
    pub fn select(&mut self, kind: Option<DrawingKind>) {
        self.kind = kind;
        self.gesture = if kind.is_some() { DrawingGesture::Armed } else { DrawingGesture::Idle };
    }

    pub fn is_armed(&self) -> bool {
        self.kind.is_some()
    }

    /// Pointer down while armed fixes p1 and starts tracking p2
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if self.is_armed() {
            let point = PixelPoint { x, y };
            self.gesture = DrawingGesture::Dragging { p1: point, p2: point };
        }
    }

    /// Pointer move updates the live endpoint without touching p1
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let DrawingGesture::Dragging { p2, .. } = &mut self.gesture {
            *p2 = PixelPoint { x, y };
        }
    }

    /// Pointer up converts both endpoints to domain coordinates and emits a
    /// completed drawing, returning the tool to `Armed`. Without candle
    /// history there is no time axis to project onto, so the gesture is
    /// dropped.
    pub fn pointer_up(
        &mut self,
        projection: &ChartProjection,
        candles: &[Candle],
    ) -> Option<DrawingObject> {
        let DrawingGesture::Dragging { p1, p2 } = self.gesture else {
            return None;
        };
        self.gesture = if self.kind.is_some() { DrawingGesture::Armed } else { DrawingGesture::Idle };
        let kind = self.kind?;

        let p1_time = projection.x_to_time(p1.x, candles)?;
        let p2_time = projection.x_to_time(p2.x, candles)?;
        let drawing = DrawingObject {
            id: format!("drawing-{}", self.next_id),
            kind,
            p1: DomainPoint { time: p1_time, price: projection.y_to_price(p1.y) },
            p2: DomainPoint { time: p2_time, price: projection.y_to_price(p2.y) },
            color: self.color.clone(),
            locked: false,
        };
        self.next_id += 1;
        Some(drawing)
    }

    /// Abort an in-flight gesture (pointer left the canvas)
    pub fn cancel(&mut self) {
        if self.is_armed() {
            self.gesture = DrawingGesture::Armed;
        } else {
            self.gesture = DrawingGesture::Idle;
        }
    }

    /// Pending preview endpoints, if a gesture is in flight
    pub fn pending(&self) -> Option<(DrawingKind, PixelPoint, PixelPoint)> {
        match (&self.gesture, self.kind) {
            (DrawingGesture::Dragging { p1, p2 }, Some(kind)) => Some((kind, *p1, *p2)),
            _ => None,
        }
    }
}

/// Projected pixel endpoints of a committed drawing for the current frame.
/// Horizontal lines pin y2 to y1 and extend to the chart edge.
pub fn project_endpoints(
    drawing: &DrawingObject,
    projection: &ChartProjection,
    candles: &[Candle],
) -> (f64, f64, f64, f64) {
    let x1 = projection.time_to_x(drawing.p1.time, candles);
    let y1 = projection.price_to_y(drawing.p1.price);
    let (x2, y2) = if drawing.kind == DrawingKind::Horizontal {
        (projection.chart_width, y1)
    } else {
        (projection.time_to_x(drawing.p2.time, candles), projection.price_to_y(drawing.p2.price))
    };
    (x1, y1, x2, y2)
}

/// Render-time ray extrapolation to the viewport edge. Stored state keeps
/// only the original two endpoints.
pub fn ray_end(x1: f64, y1: f64, x2: f64, y2: f64, chart_width: f64) -> (f64, f64) {
    let dx = x2 - x1;
    if dx == 0.0 {
        return (x2, y2);
    }
    let slope = (y2 - y1) / dx;
    let end_x = if dx > 0.0 { chart_width } else { 0.0 };
    (end_x, y1 + slope * (end_x - x1))
}

/// Perpendicular distance from a point to the segment (x1,y1)-(x2,y2)
pub fn distance_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let a = px - x1;
    let b = py - y1;
    let c = x2 - x1;
    let d = y2 - y1;
    let len_sq = c * c + d * d;
    let param = if len_sq == 0.0 { -1.0 } else { (a * c + b * d) / len_sq };
    let (xx, yy) = if param < 0.0 {
        (x1, y1)
    } else if param > 1.0 {
        (x2, y2)
    } else {
        (x1 + param * c, y1 + param * d)
    };
    let dx = px - xx;
    let dy = py - yy;
    (dx * dx + dy * dy).sqrt()
}

/// Cursor-mode hover test over committed drawings: segment distance for line
/// kinds, bounding-box containment for rects. Later drawings win, matching
/// their paint order.
pub fn hit_test<'a>(
    drawings: &'a [DrawingObject],
    px: f64,
    py: f64,
    projection: &ChartProjection,
    candles: &[Candle],
) -> Option<&'a DrawingObject> {
    let mut found = None;
    for drawing in drawings {
        let (x1, y1, x2, y2) = project_endpoints(drawing, projection, candles);
        let hit = if drawing.kind.is_rect() {
            let (left, right) = (x1.min(x2), x1.max(x2));
            let (top, bottom) = (y1.min(y2), y1.max(y2));
            px >= left && px <= right && py >= top && py <= bottom
        } else {
            distance_to_segment(px, py, x1, y1, x2, y2) < HIT_DISTANCE_PX
        };
        if hit {
            found = Some(drawing);
        }
    }
    found
}
