use crate::error::ChartResult;
use crate::render::{DrawingContext, MarkerFrame, RecordingContext, Renderer, draw_marker};

/// Headless renderer used by tests and hosts without a raster backend.
///
/// It still validates frame content and replays it into a
/// [`RecordingContext`], so invalid geometry and unbalanced context state are
/// caught before a real backend is involved.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_marker_count: usize,
    pub last_drawn_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &MarkerFrame) -> ChartResult<()> {
        frame.validate()?;
        let mut context = RecordingContext::new();
        let drawn = draw_marker_frame(&mut context, frame)?;

        self.last_marker_count = frame.items.len();
        self.last_drawn_count = drawn;
        self.last_text_count = context.drawn_texts().len();
        Ok(())
    }
}

/// Draws every item of `frame` in order and returns how many were drawn.
pub fn draw_marker_frame<C: DrawingContext + ?Sized>(
    context: &mut C,
    frame: &MarkerFrame,
) -> ChartResult<usize> {
    let mut drawn = 0;
    for item in &frame.items {
        if draw_marker(context, item, frame.pixel_ratio)? {
            drawn += 1;
        }
    }
    Ok(drawn)
}
