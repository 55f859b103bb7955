mod context;
mod frame;
mod marker_shapes;
mod null_renderer;
mod primitives;

pub use context::{DrawCommand, DrawingContext, RecordingContext, ScopedContextState, save_scoped};
pub use frame::MarkerFrame;
pub use marker_shapes::{
    BitmapShapeCoordinates, INNER_TEXT_FONT_FAMILY, INNER_TEXT_MAX_CHARS, INNER_TEXT_MIN_FONT_PX,
    default_inner_text_size, draw_circle, draw_circle_with_text, draw_marker, truncate_inner_text,
};
pub use null_renderer::{NullRenderer, draw_marker_frame};
pub use primitives::{Color, FontSpec, TextBaseline, TextHAlign};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully placed, validated `MarkerFrame` so drawing code
/// stays isolated from marker ingestion and pointer interaction.
pub trait Renderer {
    fn render(&mut self, frame: &MarkerFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoDrawingContext, CairoRenderStats, CairoRenderer};
