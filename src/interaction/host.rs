use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect, Size};

/// Identity of the object under the pointer, as resolved by the host.
///
/// Markers are identified by their string `id`; hosts may report other
/// objects with numeric identities, which never resolve to a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HoveredObjectId {
    Text(String),
    Numeric(u64),
}

impl HoveredObjectId {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HoveredObjectId::Text(id) => Some(id),
            HoveredObjectId::Numeric(_) => None,
        }
    }
}

impl From<&str> for HoveredObjectId {
    fn from(value: &str) -> Self {
        HoveredObjectId::Text(value.to_owned())
    }
}

impl From<String> for HoveredObjectId {
    fn from(value: String) -> Self {
        HoveredObjectId::Text(value)
    }
}

/// Payload of host pointer-move and click notifications.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    #[serde(default)]
    pub point: Option<Point>,
    #[serde(default)]
    pub hovered_object_id: Option<HoveredObjectId>,
}

impl PointerEvent {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            point: Some(Point::new(x, y)),
            hovered_object_id: None,
        }
    }

    #[must_use]
    pub fn with_hovered(mut self, id: impl Into<HoveredObjectId>) -> Self {
        self.hovered_object_id = Some(id.into());
        self
    }
}

/// Token for a host-level pointer subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Token for a raw listener registered on the drawing root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type PointerHandler = Box<dyn FnMut(&PointerEvent)>;
pub type LeaveHandler = Box<dyn FnMut()>;

/// Chart-level notification source consumed by the tooltip controller.
pub trait ChartHost {
    type Root: DrawingRoot;

    /// Root container hosting overlay elements, `None` before layout.
    fn drawing_root(&self) -> Option<Self::Root>;
    fn subscribe_pointer_move(&mut self, handler: PointerHandler) -> SubscriptionId;
    fn subscribe_click(&mut self, handler: PointerHandler) -> SubscriptionId;
    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// Root drawing container of the host chart.
///
/// Implementations are cheap handles (reference counted widgets, DOM nodes)
/// and may be cloned freely.
pub trait DrawingRoot: Clone {
    type Overlay: TooltipOverlay;

    /// Bounding box in pointer coordinates, `None` while not laid out.
    fn bounds(&self) -> Option<Rect>;
    /// Creates an overlay element and appends it to this root.
    fn append_overlay(&self) -> Option<Self::Overlay>;
    fn connect_pointer_leave(&self, handler: LeaveHandler) -> ListenerId;
    fn disconnect_pointer_leave(&self, listener: ListenerId);
}

/// Floating element showing tooltip text.
pub trait TooltipOverlay {
    fn set_text(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
    /// Moves the element's top-left corner, in pointer coordinates.
    fn set_position(&mut self, position: Point);
    /// Rendered size, `None` when the element cannot be measured yet.
    fn measure(&self) -> Option<Size>;
    /// Detaches the element from its parent if it still has one.
    fn remove_from_parent(&mut self);
}
