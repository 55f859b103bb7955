pub mod primitives;
pub mod shape;
pub mod types;

pub use primitives::{BusinessDay, TimeKey, datetime_to_unix_seconds, decimal_to_f64};
pub use shape::{
    MarkerShape, calculate_shape_height, ceiled_even, ceiled_odd, shape_margin, shape_size,
};
pub use types::{Point, Rect, Size, Viewport};
