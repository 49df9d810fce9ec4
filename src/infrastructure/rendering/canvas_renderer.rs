//! Canvas 2D execution of a built scene.

use super::scene::{DrawCmd, Scene};
use crate::domain::errors::{AppError, RenderingResult};
use crate::domain::logging::{LogComponent, get_logger};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Canvas 2D renderer for the chart - infrastructure implementation
pub struct CanvasChartRenderer {
    canvas_id: String,
    width: u32,
    height: u32,
}

impl CanvasChartRenderer {
    pub fn new(canvas_id: &str, width: u32, height: u32) -> Self {
        Self { canvas_id: canvas_id.to_string(), width, height }
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get canvas element and context
    fn get_canvas_context(&self) -> RenderingResult<(HtmlCanvasElement, CanvasRenderingContext2d)> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| AppError::RenderingError("document not available".to_string()))?;
        let canvas = document
            .get_element_by_id(&self.canvas_id)
            .ok_or_else(|| AppError::RenderingError(format!("canvas '{}' not found", self.canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::RenderingError("element is not a canvas".to_string()))?;

        canvas.set_width(self.width);
        canvas.set_height(self.height);

        let context = canvas
            .get_context("2d")
            .map_err(|_| AppError::RenderingError("failed to get 2D context".to_string()))?
            .ok_or_else(|| AppError::RenderingError("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::RenderingError("failed to cast 2D context".to_string()))?;

        Ok((canvas, context))
    }

    /// Execute one frame. Performs no I/O beyond canvas calls and never
    /// suspends mid-frame.
    pub fn render(&self, scene: &Scene) -> RenderingResult<()> {
        let (_canvas, context) = self.get_canvas_context()?;
        context.set_font("10px Inter, sans-serif");

        for command in &scene.commands {
            self.execute(&context, command);
        }

        get_logger().trace(
            LogComponent::Infrastructure("CanvasRenderer"),
            &format!("Frame rendered: {} commands", scene.commands.len()),
        );
        Ok(())
    }

    fn execute(&self, context: &CanvasRenderingContext2d, command: &DrawCmd) {
        match command {
            DrawCmd::Clear { color } => {
                context.clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
                context.set_fill_style(&JsValue::from_str(color));
                context.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
            }
            DrawCmd::Rect { x, y, w, h, color, filled } => {
                if *filled {
                    context.set_fill_style(&JsValue::from_str(color));
                    context.fill_rect(*x, *y, *w, *h);
                } else {
                    context.set_stroke_style(&JsValue::from_str(color));
                    context.set_line_width(1.0);
                    context.stroke_rect(*x, *y, *w, *h);
                }
            }
            DrawCmd::Line { x1, y1, x2, y2, color, width, dashed } => {
                context.set_stroke_style(&JsValue::from_str(color));
                context.set_line_width(*width);
                if *dashed {
                    set_dash(context, &[4.0, 4.0]);
                }
                context.begin_path();
                context.move_to(*x1, *y1);
                context.line_to(*x2, *y2);
                context.stroke();
                if *dashed {
                    set_dash(context, &[]);
                }
            }
            DrawCmd::Polyline { points, color, width } => {
                if points.len() < 2 {
                    return;
                }
                context.set_stroke_style(&JsValue::from_str(color));
                context.set_line_width(*width);
                context.begin_path();
                context.move_to(points[0].0, points[0].1);
                for (x, y) in &points[1..] {
                    context.line_to(*x, *y);
                }
                context.stroke();
            }
            DrawCmd::Text { text, x, y, color } => {
                context.set_fill_style(&JsValue::from_str(color));
                let _ = context.fill_text(text, *x, *y);
            }
        }
    }
}

fn set_dash(context: &CanvasRenderingContext2d, segments: &[f64]) {
    let array = js_sys::Array::new();
    for segment in segments {
        array.push(&JsValue::from_f64(*segment));
    }
    let _ = context.set_line_dash(&array);
}
