use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, DrawingContext, FontSpec, MarkerFrame, Renderer, TextBaseline, TextHAlign,
    draw_marker_frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub markers_drawn: usize,
    pub texts_drawn: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct TextState {
    font: FontSpec,
    align: TextHAlign,
    baseline: TextBaseline,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: FontSpec::new(10.0, "Sans"),
            align: TextHAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// [`DrawingContext`] over a borrowed Cairo context with Pango text.
///
/// Cairo has no font/alignment state of its own for Pango layouts, so this
/// adapter keeps that state and saves/restores it alongside Cairo's.
pub struct CairoDrawingContext<'a> {
    context: &'a Context,
    text: TextState,
    saved: Vec<TextState>,
    texts_drawn: usize,
}

impl<'a> CairoDrawingContext<'a> {
    #[must_use]
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            text: TextState::default(),
            saved: Vec::new(),
            texts_drawn: 0,
        }
    }

    #[must_use]
    pub fn texts_drawn(&self) -> usize {
        self.texts_drawn
    }
}

impl DrawingContext for CairoDrawingContext<'_> {
    fn save(&mut self) -> ChartResult<()> {
        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save cairo state", err))?;
        self.saved.push(self.text.clone());
        Ok(())
    }

    fn restore(&mut self) -> ChartResult<()> {
        let text = self.saved.pop().ok_or_else(|| {
            ChartError::InvalidState("restore called without matching save".to_owned())
        })?;
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore cairo state", err))?;
        self.text = text;
        Ok(())
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.context.scale(sx, sy);
    }

    fn begin_path(&mut self) {
        self.context.new_path();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.context.arc(x, y, radius, start_angle, end_angle);
    }

    fn set_fill_color(&mut self, color: Color) {
        apply_color(self.context, color);
    }

    fn fill(&mut self) -> ChartResult<()> {
        self.context
            .fill()
            .map_err(|err| map_backend_error("failed to fill marker path", err))
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.text.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextHAlign) {
        self.text.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.text.baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()> {
        let layout = pangocairo::functions::create_layout(self.context);
        let mut font_description = FontDescription::new();
        font_description.set_family(&self.text.font.family);
        font_description.set_absolute_size(self.text.font.size_px * f64::from(pango::SCALE));
        layout.set_font_description(Some(&font_description));
        layout.set_text(text);

        let (text_width, text_height) = layout.pixel_size();
        let left = match self.text.align {
            TextHAlign::Left => x,
            TextHAlign::Center => x - f64::from(text_width) / 2.0,
            TextHAlign::Right => x - f64::from(text_width),
        };
        let top = match self.text.baseline {
            TextBaseline::Top => y,
            TextBaseline::Middle => y - f64::from(text_height) / 2.0,
            TextBaseline::Bottom => y - f64::from(text_height),
            TextBaseline::Alphabetic => y - f64::from(layout.baseline()) / f64::from(pango::SCALE),
        };

        self.context.move_to(left, top);
        pangocairo::functions::show_layout(self.context, &layout);
        self.context.new_path();
        self.texts_drawn += 1;
        Ok(())
    }
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &MarkerFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo marker renderer.
///
/// This renderer supports two modes:
/// - offscreen image-surface rendering through `Renderer::render`, cleared
///   with `clear_color` first
/// - in-place rendering on an external Cairo context through
///   `CairoContextRenderer`, drawing markers over whatever is already there
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::rgba(0.0, 0.0, 0.0, 0.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn draw_frame(&mut self, context: &Context, frame: &MarkerFrame) -> ChartResult<()> {
        let mut drawing = CairoDrawingContext::new(context);
        let markers_drawn = draw_marker_frame(&mut drawing, frame)?;
        self.last_stats = CairoRenderStats {
            markers_drawn,
            texts_drawn: drawing.texts_drawn(),
        };
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &MarkerFrame) -> ChartResult<()> {
        frame.validate()?;
        self.clear_color.validate()?;

        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context.set_operator(cairo::Operator::Source);
        apply_color(&context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        context.set_operator(cairo::Operator::Over);

        self.draw_frame(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &MarkerFrame,
    ) -> ChartResult<()> {
        frame.validate()?;
        self.draw_frame(context, frame)
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
