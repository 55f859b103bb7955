#![allow(dead_code)]

use chart_markers::extensions::{BarExtent, SeriesCoordinateSource};

/// Linear host projection: `x = time * 10`, `y = 400 - price * 2`, bars span
/// y 100..200 with their value at 150.
pub struct LinearSource {
    pub bar_spacing: f64,
    pub visible_time: (f64, f64),
}

impl Default for LinearSource {
    fn default() -> Self {
        Self {
            bar_spacing: 6.0,
            visible_time: (0.0, 100.0),
        }
    }
}

impl SeriesCoordinateSource for LinearSource {
    fn time_to_x(&self, time: f64) -> Option<f64> {
        (self.visible_time.0..=self.visible_time.1)
            .contains(&time)
            .then_some(time * 10.0)
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        Some(400.0 - price * 2.0)
    }

    fn bar_extent(&self, time: f64) -> Option<BarExtent> {
        (time.fract() == 0.0).then_some(BarExtent {
            top_y: 100.0,
            bottom_y: 200.0,
            value_y: 150.0,
        })
    }

    fn bar_spacing(&self) -> f64 {
        self.bar_spacing
    }
}

pub mod tooltip_host;
