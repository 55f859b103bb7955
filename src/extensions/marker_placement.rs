use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{MarkerShape, calculate_shape_height, shape_margin};
use crate::error::{ChartError, ChartResult};
use crate::interaction::hit_test_marker;
use crate::render::Color;

use super::markers::{BarPosition, InternalSeriesMarker, MarkerAnchor, PricePosition};

/// Pixel extent of the bar a marker is attached to, in media coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarExtent {
    /// Y of the bar's highest rendered point.
    pub top_y: f64,
    /// Y of the bar's lowest rendered point.
    pub bottom_y: f64,
    /// Y of the bar's representative value (close for OHLC bars).
    pub value_y: f64,
}

/// Coordinate conversion supplied by the host chart.
///
/// Returning `None` means the time or price is not currently projectable
/// (outside the data set or visible range); such markers are skipped.
pub trait SeriesCoordinateSource {
    fn time_to_x(&self, time: f64) -> Option<f64>;
    fn price_to_y(&self, price: f64) -> Option<f64>;
    fn bar_extent(&self, time: f64) -> Option<BarExtent>;
    fn bar_spacing(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPlacementConfig {
    /// Lower bound for the gap kept between a bar and its markers.
    pub min_shape_margin_px: f64,
    /// Bar spacing used when the host reports a non-positive spacing.
    pub fallback_bar_spacing_px: f64,
}

impl Default for MarkerPlacementConfig {
    fn default() -> Self {
        Self {
            min_shape_margin_px: 3.0,
            fallback_bar_spacing_px: 6.0,
        }
    }
}

impl MarkerPlacementConfig {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.min_shape_margin_px, "min_shape_margin_px"),
            (self.fallback_bar_spacing_px, "fallback_bar_spacing_px"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "marker config `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Marker ready to draw: media-space center plus resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRenderItem {
    pub(crate) internal_id: u64,
    pub id: Option<String>,
    pub time: f64,
    pub shape: MarkerShape,
    pub x: f64,
    pub y: f64,
    /// Base pixel size (shape height for the bar spacing times the multiplier).
    pub size: f64,
    pub color: Color,
    pub text: Option<String>,
    pub inner_text: Option<String>,
    pub inner_text_color: Option<Color>,
    pub inner_text_size: Option<f64>,
}

impl MarkerRenderItem {
    /// Standalone item, for hosts that place markers themselves.
    #[must_use]
    pub fn new(shape: MarkerShape, x: f64, y: f64, size: f64, color: Color) -> Self {
        Self {
            internal_id: 0,
            id: None,
            time: 0.0,
            shape,
            x,
            y,
            size,
            color,
            text: None,
            inner_text: None,
            inner_text_color: None,
            inner_text_size: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_inner_text(mut self, inner_text: impl Into<String>) -> Self {
        self.inner_text = Some(inner_text.into());
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "marker coordinates must be finite".to_owned(),
            ));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ChartError::InvalidData(
                "marker size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()?;
        if let Some(color) = self.inner_text_color {
            color.validate()?;
        }
        Ok(())
    }

    /// Hit test against this item's rendered footprint, in media coordinates.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        hit_test_marker(self.shape, self.x, self.y, self.size, x, y)
    }
}

/// Places markers relative to their bar or price anchor.
///
/// Markers sharing a time stack away from the bar in input order: each
/// further above-bar (below-bar) marker moves up (down) by its size plus the
/// shape margin.
pub fn place_markers<T, S>(
    markers: &[InternalSeriesMarker<T>],
    source: &S,
    config: MarkerPlacementConfig,
) -> ChartResult<Vec<MarkerRenderItem>>
where
    S: SeriesCoordinateSource + ?Sized,
{
    let config = config.validate()?;
    if markers.is_empty() {
        return Ok(Vec::new());
    }

    let bar_spacing = match source.bar_spacing() {
        spacing if spacing.is_finite() && spacing > 0.0 => spacing,
        _ => config.fallback_bar_spacing_px,
    };
    let base_height = calculate_shape_height(bar_spacing);
    let margin = shape_margin(bar_spacing).max(config.min_shape_margin_px);

    let mut placed = Vec::with_capacity(markers.len());
    let mut group_time = None;
    let mut above_offset = 0.0;
    let mut below_offset = 0.0;

    for marker in markers {
        if group_time != Some(OrderedFloat(marker.time)) {
            group_time = Some(OrderedFloat(marker.time));
            above_offset = 0.0;
            below_offset = 0.0;
        }

        let Some(x) = source.time_to_x(marker.time) else {
            trace!(internal_id = marker.internal_id, "marker time not projectable, skipping");
            continue;
        };

        let size = base_height * marker.size;
        let half = size / 2.0;
        let y = match marker.anchor {
            MarkerAnchor::Bar(position) => {
                let Some(bar) = source.bar_extent(marker.time) else {
                    trace!(internal_id = marker.internal_id, "marker bar missing, skipping");
                    continue;
                };
                match position {
                    BarPosition::Above => {
                        let y = bar.top_y - margin - above_offset - half;
                        above_offset += size + margin;
                        y
                    }
                    BarPosition::Below => {
                        let y = bar.bottom_y + margin + below_offset + half;
                        below_offset += size + margin;
                        y
                    }
                    BarPosition::In => bar.value_y,
                }
            }
            MarkerAnchor::Price { position, price } => {
                let Some(price_y) = source.price_to_y(price) else {
                    trace!(
                        internal_id = marker.internal_id,
                        "marker price not projectable, skipping"
                    );
                    continue;
                };
                match position {
                    PricePosition::Top => price_y - half,
                    PricePosition::Bottom => price_y + half,
                    PricePosition::Middle => price_y,
                }
            }
        };

        placed.push(MarkerRenderItem {
            internal_id: marker.internal_id,
            id: marker.id.clone(),
            time: marker.time,
            shape: marker.shape,
            x,
            y,
            size,
            color: marker.color,
            text: marker.text.clone(),
            inner_text: marker.inner_text.clone(),
            inner_text_color: marker.inner_text_color,
            inner_text_size: marker.inner_text_size,
        });
    }

    Ok(placed)
}
