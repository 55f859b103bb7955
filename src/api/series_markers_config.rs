use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::extensions::MarkerPlacementConfig;
use crate::interaction::TooltipConfig;

/// Public marker layer configuration.
///
/// This type is serializable so host applications can persist/load marker
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesMarkersConfig {
    pub viewport: Viewport,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    #[serde(default)]
    pub placement: MarkerPlacementConfig,
    #[serde(default)]
    pub tooltip: TooltipConfig,
}

impl SeriesMarkersConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pixel_ratio: default_pixel_ratio(),
            placement: MarkerPlacementConfig::default(),
            tooltip: TooltipConfig::default(),
        }
    }

    /// Sets the device pixel ratio used to scale marker geometry.
    #[must_use]
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: MarkerPlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipConfig) -> Self {
        self.tooltip = tooltip;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        validate_pixel_ratio(self.pixel_ratio)?;
        self.placement.validate()?;
        self.tooltip.validate()?;
        Ok(self)
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

pub(super) fn validate_pixel_ratio(pixel_ratio: f64) -> ChartResult<()> {
    if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
        return Err(ChartError::InvalidData(
            "pixel ratio must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

fn default_pixel_ratio() -> f64 {
    1.0
}
