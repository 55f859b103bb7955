use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::error::{ChartError, ChartResult};
use crate::render::{Color, FontSpec, TextBaseline, TextHAlign};

/// Immediate-mode 2D drawing surface borrowed from the host for one draw call.
///
/// Coordinates are in the context's current user space. Font, alignment and
/// fill color are persistent context state: anything that changes them and
/// wants them back must bracket the change with `save`/`restore`, preferably
/// through [`save_scoped`].
pub trait DrawingContext {
    fn save(&mut self) -> ChartResult<()>;
    fn restore(&mut self) -> ChartResult<()>;
    fn scale(&mut self, sx: f64, sy: f64);
    fn begin_path(&mut self);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn set_fill_color(&mut self, color: Color);
    fn fill(&mut self) -> ChartResult<()>;
    fn set_font(&mut self, font: &FontSpec);
    fn set_text_align(&mut self, align: TextHAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()>;
}

/// Saved drawing state that is restored when the guard goes out of scope.
///
/// Drawing through the guard (it derefs to the context) keeps transforms and
/// text state from leaking into later draw calls, including on `?` returns.
pub struct ScopedContextState<'a, C: DrawingContext + ?Sized> {
    context: &'a mut C,
}

/// Saves `context` and returns a guard that restores it on drop.
pub fn save_scoped<C: DrawingContext + ?Sized>(
    context: &mut C,
) -> ChartResult<ScopedContextState<'_, C>> {
    context.save()?;
    Ok(ScopedContextState { context })
}

impl<C: DrawingContext + ?Sized> Deref for ScopedContextState<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<C: DrawingContext + ?Sized> DerefMut for ScopedContextState<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<C: DrawingContext + ?Sized> Drop for ScopedContextState<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.context.restore() {
            warn!(error = %err, "failed to restore drawing context state");
        }
    }
}

/// One call observed by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Scale {
        sx: f64,
        sy: f64,
    },
    BeginPath,
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    SetFillColor(Color),
    Fill,
    SetFont(FontSpec),
    SetTextAlign(TextHAlign),
    SetTextBaseline(TextBaseline),
    FillText {
        text: String,
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct RecordedState {
    scale_x: f64,
    scale_y: f64,
    fill_color: Color,
    font: Option<FontSpec>,
    text_align: TextHAlign,
    text_baseline: TextBaseline,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            fill_color: Color::BLACK,
            font: None,
            text_align: TextHAlign::Left,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Headless drawing context that records every call.
///
/// Used by tests and by hosts that want to inspect marker output without a
/// raster backend. It tracks the save stack so unbalanced restores surface as
/// errors.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    state: RecordedState,
    saved: Vec<RecordedState>,
}

impl RecordingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    #[must_use]
    pub fn current_scale(&self) -> (f64, f64) {
        (self.state.scale_x, self.state.scale_y)
    }

    #[must_use]
    pub fn current_fill_color(&self) -> Color {
        self.state.fill_color
    }

    #[must_use]
    pub fn current_font(&self) -> Option<&FontSpec> {
        self.state.font.as_ref()
    }

    #[must_use]
    pub fn current_text_align(&self) -> TextHAlign {
        self.state.text_align
    }

    /// Text payloads of every `fill_text` call, in order.
    #[must_use]
    pub fn drawn_texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingContext for RecordingContext {
    fn save(&mut self) -> ChartResult<()> {
        self.saved.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
        Ok(())
    }

    fn restore(&mut self) -> ChartResult<()> {
        let state = self.saved.pop().ok_or_else(|| {
            ChartError::InvalidState("restore called without matching save".to_owned())
        })?;
        self.state = state;
        self.commands.push(DrawCommand::Restore);
        Ok(())
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.scale_x *= sx;
        self.state.scale_y *= sy;
        self.commands.push(DrawCommand::Scale { sx, sy });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.commands.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
        self.commands.push(DrawCommand::SetFillColor(color));
    }

    fn fill(&mut self) -> ChartResult<()> {
        self.commands.push(DrawCommand::Fill);
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = Some(font.clone());
        self.commands.push(DrawCommand::SetFont(font.clone()));
    }

    fn set_text_align(&mut self, align: TextHAlign) {
        self.state.text_align = align;
        self.commands.push(DrawCommand::SetTextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
        self.commands.push(DrawCommand::SetTextBaseline(baseline));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()> {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            x,
            y,
        });
        Ok(())
    }
}
