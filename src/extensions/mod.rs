//! Marker model and placement.
//!
//! Drawing lives in `render`, hit testing and tooltips in `interaction`.

pub mod marker_placement;
pub mod markers;

pub use marker_placement::{
    BarExtent, MarkerPlacementConfig, MarkerRenderItem, SeriesCoordinateSource, place_markers,
};
pub use markers::{
    BarPosition, InternalSeriesMarker, MarkerAnchor, MarkerPosition, MarkerSet, PricePosition,
    SeriesMarker,
};
