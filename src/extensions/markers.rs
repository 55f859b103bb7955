use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{MarkerShape, TimeKey, decimal_to_f64};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Where a marker sits vertically.
///
/// Bar-relative positions derive Y from the bar's rendered extent.
/// Price-relative positions (`AtPrice*`) derive Y from `SeriesMarker::price`,
/// which is then mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
    InBar,
    AtPriceTop,
    AtPriceBottom,
    AtPriceMiddle,
}

impl MarkerPosition {
    #[must_use]
    pub fn is_price_relative(self) -> bool {
        self.price_position().is_some()
    }

    #[must_use]
    pub fn bar_position(self) -> Option<BarPosition> {
        match self {
            MarkerPosition::AboveBar => Some(BarPosition::Above),
            MarkerPosition::BelowBar => Some(BarPosition::Below),
            MarkerPosition::InBar => Some(BarPosition::In),
            _ => None,
        }
    }

    #[must_use]
    pub fn price_position(self) -> Option<PricePosition> {
        match self {
            MarkerPosition::AtPriceTop => Some(PricePosition::Top),
            MarkerPosition::AtPriceBottom => Some(PricePosition::Bottom),
            MarkerPosition::AtPriceMiddle => Some(PricePosition::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarPosition {
    Above,
    Below,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricePosition {
    Top,
    Bottom,
    Middle,
}

/// Resolved vertical anchor of an ingested marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkerAnchor {
    Bar(BarPosition),
    Price { position: PricePosition, price: f64 },
}

impl MarkerAnchor {
    #[must_use]
    pub fn position(self) -> MarkerPosition {
        match self {
            MarkerAnchor::Bar(BarPosition::Above) => MarkerPosition::AboveBar,
            MarkerAnchor::Bar(BarPosition::Below) => MarkerPosition::BelowBar,
            MarkerAnchor::Bar(BarPosition::In) => MarkerPosition::InBar,
            MarkerAnchor::Price {
                position: PricePosition::Top,
                ..
            } => MarkerPosition::AtPriceTop,
            MarkerAnchor::Price {
                position: PricePosition::Bottom,
                ..
            } => MarkerPosition::AtPriceBottom,
            MarkerAnchor::Price {
                position: PricePosition::Middle,
                ..
            } => MarkerPosition::AtPriceMiddle,
        }
    }

    #[must_use]
    pub fn price(self) -> Option<f64> {
        match self {
            MarkerAnchor::Bar(_) => None,
            MarkerAnchor::Price { price, .. } => Some(price),
        }
    }
}

/// Marker annotation as supplied by the caller.
///
/// `T` is the caller's time key. It is kept verbatim on the ingested marker
/// and normalized through [`TimeKey`] for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMarker<T> {
    pub time: T,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Size multiplier, `1` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Up to two characters drawn inside `circleWithText` markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_text_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip_text: Option<String>,
}

impl<T> SeriesMarker<T> {
    #[must_use]
    pub fn new(
        time: T,
        position: MarkerPosition,
        shape: MarkerShape,
        color: impl Into<String>,
    ) -> Self {
        Self {
            time,
            position,
            shape,
            color: color.into(),
            id: None,
            text: None,
            size: None,
            price: None,
            inner_text: None,
            inner_text_color: None,
            inner_text_size: None,
            tooltip_text: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_decimal_price(self, price: Decimal) -> ChartResult<Self> {
        Ok(self.with_price(decimal_to_f64(price, "marker price")?))
    }

    #[must_use]
    pub fn with_inner_text(mut self, inner_text: impl Into<String>) -> Self {
        self.inner_text = Some(inner_text.into());
        self
    }

    #[must_use]
    pub fn with_inner_text_color(mut self, color: impl Into<String>) -> Self {
        self.inner_text_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_inner_text_size(mut self, size: f64) -> Self {
        self.inner_text_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_tooltip_text(mut self, tooltip_text: impl Into<String>) -> Self {
        self.tooltip_text = Some(tooltip_text.into());
        self
    }
}

impl<T: DeserializeOwned> SeriesMarker<T> {
    /// Parses a JSON array of markers using the camelCase wire names.
    pub fn list_from_json_str(input: &str) -> ChartResult<Vec<Self>> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse markers json: {e}")))
    }
}

impl<T: Serialize> SeriesMarker<T> {
    pub fn list_to_json_pretty(markers: &[Self]) -> ChartResult<String> {
        serde_json::to_string_pretty(markers)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize markers: {e}")))
    }
}

/// Marker after ingestion, enriched with ordering identity and parsed styles.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalSeriesMarker<T> {
    /// Input-order sequence number, only used to break ties between markers
    /// sharing a time.
    pub(crate) internal_id: u64,
    /// Normalized time in UNIX seconds.
    pub time: f64,
    pub original_time: T,
    pub anchor: MarkerAnchor,
    pub shape: MarkerShape,
    pub color: Color,
    pub id: Option<String>,
    pub text: Option<String>,
    pub size: f64,
    pub inner_text: Option<String>,
    pub inner_text_color: Option<Color>,
    pub inner_text_size: Option<f64>,
    pub tooltip_text: Option<String>,
}

impl<T> InternalSeriesMarker<T> {
    #[must_use]
    pub fn position(&self) -> MarkerPosition {
        self.anchor.position()
    }

    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.anchor.price()
    }
}

/// Active, validated marker set ordered by `(time, internal_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSet<T> {
    markers: Vec<InternalSeriesMarker<T>>,
}

impl<T> Default for MarkerSet<T> {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
        }
    }
}

impl<T: TimeKey> MarkerSet<T> {
    /// Validates and ingests a full marker batch.
    ///
    /// The batch is rejected as a whole on the first marker whose time or
    /// price cannot be resolved. Unparsable colors and out-of-range sizes
    /// fall back to their defaults with a warning.
    pub fn from_markers(markers: Vec<SeriesMarker<T>>) -> ChartResult<Self> {
        let mut ingested = Vec::with_capacity(markers.len());
        for (index, marker) in markers.into_iter().enumerate() {
            ingested.push(ingest_marker(index, marker)?);
        }

        ingested.sort_by(|a, b| {
            OrderedFloat(a.time)
                .cmp(&OrderedFloat(b.time))
                .then_with(|| a.internal_id.cmp(&b.internal_id))
        });

        debug!(markers = ingested.len(), "ingested series markers");
        Ok(Self { markers: ingested })
    }
}

impl<T> MarkerSet<T> {
    #[must_use]
    pub fn markers(&self) -> &[InternalSeriesMarker<T>] {
        &self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers sharing the normalized `time`, in input order.
    #[must_use]
    pub fn markers_at(&self, time: f64) -> SmallVec<[&InternalSeriesMarker<T>; 4]> {
        let start = self
            .markers
            .partition_point(|marker| OrderedFloat(marker.time) < OrderedFloat(time));
        self.markers[start..]
            .iter()
            .take_while(|marker| OrderedFloat(marker.time) == OrderedFloat(time))
            .collect()
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&InternalSeriesMarker<T>> {
        self.markers
            .iter()
            .find(|marker| marker.id.as_deref() == Some(id))
    }
}

fn ingest_marker<T: TimeKey>(
    index: usize,
    marker: SeriesMarker<T>,
) -> ChartResult<InternalSeriesMarker<T>> {
    let time = marker.time.to_unix_seconds()?;
    let anchor = resolve_anchor(index, marker.position, marker.price)?;

    let size = match marker.size {
        None => 1.0,
        Some(size) if size.is_finite() && size > 0.0 => size,
        Some(size) => {
            warn!(index, size, "marker size must be finite and > 0, using 1");
            1.0
        }
    };
    // Non-positive inner text sizes fall back to the shape-derived default.
    let inner_text_size = marker
        .inner_text_size
        .filter(|size| size.is_finite() && *size > 0.0);

    let color = Color::parse(&marker.color).unwrap_or_else(|err| {
        warn!(index, error = %err, "marker color not parsable, using black");
        Color::BLACK
    });
    let inner_text_color = marker.inner_text_color.as_deref().and_then(|color| {
        Color::parse(color)
            .inspect_err(|err| {
                warn!(index, error = %err, "inner text color not parsable, using default");
            })
            .ok()
    });

    Ok(InternalSeriesMarker {
        internal_id: index as u64,
        time,
        original_time: marker.time,
        anchor,
        shape: marker.shape,
        color,
        id: marker.id,
        text: marker.text,
        size,
        inner_text: marker.inner_text,
        inner_text_color,
        inner_text_size,
        tooltip_text: marker.tooltip_text,
    })
}

fn resolve_anchor(
    index: usize,
    position: MarkerPosition,
    price: Option<f64>,
) -> ChartResult<MarkerAnchor> {
    if let Some(bar_position) = position.bar_position() {
        return Ok(MarkerAnchor::Bar(bar_position));
    }

    let price_position = position
        .price_position()
        .ok_or_else(|| ChartError::InvalidData(format!("marker #{index} has no position")))?;
    let price = price.ok_or(ChartError::MissingMarkerPrice { index, position })?;
    if !price.is_finite() {
        return Err(ChartError::InvalidData(format!(
            "marker #{index} price must be finite"
        )));
    }
    Ok(MarkerAnchor::Price {
        position: price_position,
        price,
    })
}
