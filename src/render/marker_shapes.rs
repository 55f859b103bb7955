//! Per-shape marker drawing.
//!
//! Marker centers arrive in device (bitmap) pixels together with the device
//! pixel ratio. Shapes are filled directly in device space; text is drawn in
//! a temporarily scaled logical space so font metrics stay resolution
//! independent.

use std::f64::consts::TAU;

use tracing::debug;

use crate::core::{MarkerShape, shape_size};
use crate::error::ChartResult;
use crate::extensions::MarkerRenderItem;
use crate::render::{Color, DrawingContext, FontSpec, TextBaseline, TextHAlign, save_scoped};

pub const INNER_TEXT_MAX_CHARS: usize = 2;
pub const INNER_TEXT_MIN_FONT_PX: f64 = 8.0;
pub const INNER_TEXT_FONT_FAMILY: &str = "Arial";

/// Shape center in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapShapeCoordinates {
    pub x: f64,
    pub y: f64,
    pub pixel_ratio: f64,
}

impl BitmapShapeCoordinates {
    #[must_use]
    pub fn new(x: f64, y: f64, pixel_ratio: f64) -> Self {
        Self { x, y, pixel_ratio }
    }

    /// Converts a media-space center into device pixels.
    #[must_use]
    pub fn from_media(x: f64, y: f64, pixel_ratio: f64) -> Self {
        Self::new(x * pixel_ratio, y * pixel_ratio, pixel_ratio)
    }
}

/// Fills a circle for a `circle` marker with the current fill color.
pub fn draw_circle<C: DrawingContext + ?Sized>(
    context: &mut C,
    coords: BitmapShapeCoordinates,
    size: f64,
) -> ChartResult<()> {
    let half_size = (shape_size(MarkerShape::Circle, size) - 1.0) / 2.0;
    fill_circle(context, coords, half_size)
}

/// Fills a `circleWithText` marker and paints up to two inner characters.
///
/// The circle uses the context's current fill color. Inner text is centered
/// on the circle with `inner_text_color` (white by default) at
/// `inner_text_size`, or `max(8, half_size * 0.6)` logical pixels. Longer
/// inner text is truncated.
pub fn draw_circle_with_text<C: DrawingContext + ?Sized>(
    context: &mut C,
    coords: BitmapShapeCoordinates,
    size: f64,
    inner_text: Option<&str>,
    inner_text_color: Option<Color>,
    inner_text_size: Option<f64>,
) -> ChartResult<()> {
    let half_size = (shape_size(MarkerShape::CircleWithText, size) - 1.0) / 2.0;
    fill_circle(context, coords, half_size)?;

    let Some(text) = inner_text.map(truncate_inner_text).filter(|text| !text.is_empty()) else {
        return Ok(());
    };
    let font_size = inner_text_size.unwrap_or_else(|| default_inner_text_size(half_size));

    let mut scoped = save_scoped(context)?;
    scoped.scale(coords.pixel_ratio, coords.pixel_ratio);
    scoped.set_fill_color(inner_text_color.unwrap_or(Color::WHITE));
    scoped.set_font(&FontSpec::new(font_size, INNER_TEXT_FONT_FAMILY));
    scoped.set_text_align(TextHAlign::Center);
    scoped.set_text_baseline(TextBaseline::Middle);
    scoped.fill_text(
        text,
        coords.x / coords.pixel_ratio,
        coords.y / coords.pixel_ratio,
    )
}

/// Draws one placed marker, setting its fill color first.
///
/// Square and arrow shapes are sized by `shape_size` but not drawn here.
pub fn draw_marker<C: DrawingContext + ?Sized>(
    context: &mut C,
    item: &MarkerRenderItem,
    pixel_ratio: f64,
) -> ChartResult<bool> {
    let coords = BitmapShapeCoordinates::from_media(item.x, item.y, pixel_ratio);
    match item.shape {
        MarkerShape::Circle => {
            context.set_fill_color(item.color);
            draw_circle(context, coords, item.size)?;
        }
        MarkerShape::CircleWithText => {
            context.set_fill_color(item.color);
            draw_circle_with_text(
                context,
                coords,
                item.size,
                item.inner_text.as_deref(),
                item.inner_text_color,
                item.inner_text_size,
            )?;
        }
        MarkerShape::Square | MarkerShape::ArrowUp | MarkerShape::ArrowDown => {
            debug!(
                shape = ?item.shape,
                internal_id = item.internal_id,
                "marker shape not drawable"
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// First `INNER_TEXT_MAX_CHARS` characters of `text`.
#[must_use]
pub fn truncate_inner_text(text: &str) -> &str {
    match text.char_indices().nth(INNER_TEXT_MAX_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[must_use]
pub fn default_inner_text_size(half_size: f64) -> f64 {
    (half_size * 0.6).max(INNER_TEXT_MIN_FONT_PX)
}

fn fill_circle<C: DrawingContext + ?Sized>(
    context: &mut C,
    coords: BitmapShapeCoordinates,
    half_size: f64,
) -> ChartResult<()> {
    context.begin_path();
    context.arc(coords.x, coords.y, half_size * coords.pixel_ratio, 0.0, TAU);
    context.fill()
}
