mod series_markers;
mod series_markers_config;

pub use series_markers::SeriesMarkersLayer;
pub use series_markers_config::SeriesMarkersConfig;
