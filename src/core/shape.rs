//! Pixel footprint of marker shapes.
//!
//! Every shape is sized from the same clamped base so markers of equal
//! nominal size occupy comparable area regardless of their shape.

use serde::{Deserialize, Serialize};

pub const MIN_SHAPE_SIZE_PX: f64 = 12.0;
pub const MAX_SHAPE_SIZE_PX: f64 = 30.0;
pub const MIN_SHAPE_MARGIN_PX: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    Circle,
    Square,
    ArrowUp,
    ArrowDown,
    CircleWithText,
}

impl MarkerShape {
    pub const ALL: [MarkerShape; 5] = [
        MarkerShape::Circle,
        MarkerShape::Square,
        MarkerShape::ArrowUp,
        MarkerShape::ArrowDown,
        MarkerShape::CircleWithText,
    ];

    /// Area coefficient applied on top of the clamped base size.
    #[must_use]
    pub fn size_coefficient(self) -> f64 {
        match self {
            MarkerShape::ArrowUp | MarkerShape::ArrowDown => 1.0,
            MarkerShape::Circle => 0.8,
            MarkerShape::Square => 0.7,
            MarkerShape::CircleWithText => 1.0,
        }
    }
}

/// Ceils `x` and steps an even result down to the previous odd integer.
#[must_use]
pub fn ceiled_odd(x: f64) -> f64 {
    let ceiled = x.ceil();
    if ceiled % 2.0 == 0.0 {
        ceiled - 1.0
    } else {
        ceiled
    }
}

/// Ceils `x` and steps an odd result down to the previous even integer.
#[must_use]
pub fn ceiled_even(x: f64) -> f64 {
    let ceiled = x.ceil();
    if ceiled % 2.0 != 0.0 {
        ceiled - 1.0
    } else {
        ceiled
    }
}

fn clamped_size(size: f64, coefficient: f64) -> f64 {
    // NaN sizes collapse to the minimum footprint.
    let base = if size.is_nan() {
        MIN_SHAPE_SIZE_PX
    } else {
        size.clamp(MIN_SHAPE_SIZE_PX, MAX_SHAPE_SIZE_PX)
    };
    ceiled_odd(base * coefficient)
}

/// Pixel diameter (or side/height) of `shape` for a base marker size.
#[must_use]
pub fn shape_size(shape: MarkerShape, size: f64) -> f64 {
    clamped_size(size, shape.size_coefficient())
}

/// Base marker height for a given bar spacing, before the size multiplier.
#[must_use]
pub fn calculate_shape_height(bar_spacing: f64) -> f64 {
    ceiled_even(clamped_size(bar_spacing, 1.0))
}

/// Gap kept between a bar and the marker next to it.
#[must_use]
pub fn shape_margin(bar_spacing: f64) -> f64 {
    clamped_size(bar_spacing, 0.1).max(MIN_SHAPE_MARGIN_PX)
}
