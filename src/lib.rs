//! chart-markers: interactive series markers for Rust-native charts.
//!
//! The crate models marker annotations, draws the circle and
//! circle-with-text shapes into a 2D drawing context, hit-tests them, and
//! drives a floating tooltip overlay from host pointer notifications.
//! Coordinate conversion and pointer plumbing stay with the host chart and
//! are consumed through traits.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{SeriesMarkersConfig, SeriesMarkersLayer};
pub use error::{ChartError, ChartResult};
