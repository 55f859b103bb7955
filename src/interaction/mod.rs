//! Pointer-facing marker behavior: hit testing and tooltips.

pub mod host;
pub mod tooltip;

pub use hit_test::{
    HIT_TOLERANCE_PX, hit_test_circle, hit_test_circle_with_text, hit_test_marker,
};
pub use host::{
    ChartHost, DrawingRoot, HoveredObjectId, LeaveHandler, ListenerId, PointerEvent,
    PointerHandler, SubscriptionId, TooltipOverlay,
};
pub use tooltip::{
    MarkerTooltipController, TooltipConfig, TooltipRecord, TooltipSource, TooltipVisibility,
    resolve_tooltip_position,
};
