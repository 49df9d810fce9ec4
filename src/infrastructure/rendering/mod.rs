pub mod canvas_renderer;
pub mod scene;

pub use canvas_renderer::CanvasChartRenderer;
pub use scene::{ActiveIndicators, DrawCmd, PanelIndicator, Scene, SceneParams, build_scene};
