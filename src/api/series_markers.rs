use tracing::debug;

use crate::core::{Point, TimeKey, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{
    InternalSeriesMarker, MarkerRenderItem, MarkerSet, SeriesCoordinateSource, SeriesMarker,
    place_markers,
};
use crate::interaction::{HoveredObjectId, PointerEvent};
use crate::render::{MarkerFrame, Renderer};

use super::SeriesMarkersConfig;
use super::series_markers_config::validate_pixel_ratio;

/// Marker layer attached to one series.
///
/// Owns the active marker set and the renderer. Marker sets are replaced
/// wholesale; a rejected batch leaves the previous set active.
pub struct SeriesMarkersLayer<R: Renderer, T = f64> {
    renderer: R,
    config: SeriesMarkersConfig,
    markers: MarkerSet<T>,
}

impl<R: Renderer, T: TimeKey> SeriesMarkersLayer<R, T> {
    pub fn new(renderer: R, config: SeriesMarkersConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            renderer,
            config,
            markers: MarkerSet::default(),
        })
    }

    /// Validates and activates a new marker set.
    pub fn set_markers(&mut self, markers: Vec<SeriesMarker<T>>) -> ChartResult<()> {
        let set = MarkerSet::from_markers(markers)?;
        debug!(markers = set.len(), "series markers replaced");
        self.markers = set;
        Ok(())
    }

    pub fn clear_markers(&mut self) {
        self.markers = MarkerSet::default();
    }

    #[must_use]
    pub fn markers(&self) -> &[InternalSeriesMarker<T>] {
        self.markers.markers()
    }

    #[must_use]
    pub fn marker_set(&self) -> &MarkerSet<T> {
        &self.markers
    }

    #[must_use]
    pub fn config(&self) -> SeriesMarkersConfig {
        self.config
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.config.viewport = viewport;
        Ok(())
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) -> ChartResult<()> {
        validate_pixel_ratio(pixel_ratio)?;
        self.config.pixel_ratio = pixel_ratio;
        Ok(())
    }

    /// Places the active markers using the host's coordinate conversion.
    pub fn layout<S>(&self, source: &S) -> ChartResult<Vec<MarkerRenderItem>>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        place_markers(self.markers.markers(), source, self.config.placement)
    }

    pub fn build_frame<S>(&self, source: &S) -> ChartResult<MarkerFrame>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        let items = self.layout(source)?;
        Ok(MarkerFrame::new(self.config.viewport, self.config.pixel_ratio).with_items(items))
    }

    pub fn render<S>(&mut self, source: &S) -> ChartResult<()>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        let frame = self.build_frame(source)?;
        self.renderer.render(&frame)
    }

    /// Identity of the topmost marker with an `id` under `(x, y)`.
    ///
    /// Markers are drawn in set order, so later markers win overlaps.
    pub fn hit_test<S>(&self, source: &S, x: f64, y: f64) -> ChartResult<Option<HoveredObjectId>>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        let items = self.layout(source)?;
        Ok(items
            .iter()
            .rev()
            .filter(|item| item.contains(x, y))
            .find_map(|item| item.id.clone())
            .map(HoveredObjectId::Text))
    }

    /// Builds the pointer notification a host would emit for `(x, y)`.
    pub fn pointer_event<S>(&self, source: &S, x: f64, y: f64) -> ChartResult<PointerEvent>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        Ok(PointerEvent {
            point: Some(Point::new(x, y)),
            hovered_object_id: self.hit_test(source, x, y)?,
        })
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(feature = "cairo-backend")]
impl<R, T> SeriesMarkersLayer<R, T>
where
    R: Renderer + crate::render::CairoContextRenderer,
    T: TimeKey,
{
    /// Draws the active markers over an external Cairo context.
    pub fn render_on_cairo_context<S>(
        &mut self,
        context: &cairo::Context,
        source: &S,
    ) -> ChartResult<()>
    where
        S: SeriesCoordinateSource + ?Sized,
    {
        let frame = self.build_frame(source)?;
        self.renderer.render_on_cairo_context(context, &frame)
    }
}
