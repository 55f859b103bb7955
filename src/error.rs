use thiserror::Error;

use crate::extensions::MarkerPosition;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("marker #{index} uses price-relative position `{position:?}` without a price")]
    MissingMarkerPrice {
        index: usize,
        position: MarkerPosition,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),
}
