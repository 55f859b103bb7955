use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::extensions::MarkerRenderItem;

/// Backend-agnostic marker scene for one draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    pub viewport: Viewport,
    pub pixel_ratio: f64,
    pub items: Vec<MarkerRenderItem>,
}

impl MarkerFrame {
    #[must_use]
    pub fn new(viewport: Viewport, pixel_ratio: f64) -> Self {
        Self {
            viewport,
            pixel_ratio,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: MarkerRenderItem) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = MarkerRenderItem>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "pixel ratio must be finite and > 0".to_owned(),
            ));
        }

        for item in &self.items {
            item.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
