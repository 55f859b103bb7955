use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Point, Rect, Size};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{InternalSeriesMarker, SeriesMarker};

use super::host::{
    ChartHost, DrawingRoot, LeaveHandler, ListenerId, PointerEvent, PointerHandler,
    SubscriptionId, TooltipOverlay,
};

/// Tooltip offsets relative to the pointer, in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipConfig {
    #[serde(default = "default_offset_x_px")]
    pub offset_x_px: f64,
    #[serde(default = "default_offset_y_px")]
    pub offset_y_px: f64,
    /// Gap between pointer and overlay right edge after a horizontal flip.
    #[serde(default = "default_flip_gap_px")]
    pub flip_gap_px: f64,
    /// Downward offset used when the overlay would leave the surface top.
    #[serde(default = "default_drop_offset_px")]
    pub drop_offset_px: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x_px: default_offset_x_px(),
            offset_y_px: default_offset_y_px(),
            flip_gap_px: default_flip_gap_px(),
            drop_offset_px: default_drop_offset_px(),
        }
    }
}

impl TooltipConfig {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.offset_x_px, "offset_x_px"),
            (self.offset_y_px, "offset_y_px"),
            (self.flip_gap_px, "flip_gap_px"),
            (self.drop_offset_px, "drop_offset_px"),
        ] {
            if !value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "tooltip config `{name}` must be finite"
                )));
            }
        }
        Ok(self)
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize tooltip config: {e}"))
        })
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse tooltip config: {e}")))?;
        config.validate()
    }
}

fn default_offset_x_px() -> f64 {
    10.0
}

fn default_offset_y_px() -> f64 {
    -10.0
}

fn default_flip_gap_px() -> f64 {
    10.0
}

fn default_drop_offset_px() -> f64 {
    20.0
}

/// Top-left corner for the tooltip overlay.
///
/// Starts at the pointer plus the configured offset. With a measurable
/// surface, an overlay crossing the surface's right edge flips to the left of
/// the pointer, and one above the surface's top drops below the pointer. The
/// two adjustments are independent.
#[must_use]
pub fn resolve_tooltip_position(
    pointer: Point,
    overlay: Size,
    surface: Option<Rect>,
    config: &TooltipConfig,
) -> Point {
    let mut x = pointer.x + config.offset_x_px;
    let mut y = pointer.y + config.offset_y_px;

    if let Some(surface) = surface {
        if x + overlay.width > surface.right() {
            x = pointer.x - overlay.width - config.flip_gap_px;
        }
        if y < surface.top {
            y = pointer.y + config.drop_offset_px;
        }
    }

    Point::new(x, y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipRecord<T> {
    pub id: String,
    pub text: String,
    pub time: T,
}

/// Marker-like value that may contribute a tooltip entry.
pub trait TooltipSource<T> {
    /// `(id, tooltip text, time)` when both id and tooltip text are present.
    fn tooltip_entry(&self) -> Option<(&str, &str, &T)>;
}

impl<T> TooltipSource<T> for InternalSeriesMarker<T> {
    fn tooltip_entry(&self) -> Option<(&str, &str, &T)> {
        Some((
            self.id.as_deref()?,
            self.tooltip_text.as_deref()?,
            &self.original_time,
        ))
    }
}

impl<T> TooltipSource<T> for SeriesMarker<T> {
    fn tooltip_entry(&self) -> Option<(&str, &str, &T)> {
        Some((self.id.as_deref()?, self.tooltip_text.as_deref()?, &self.time))
    }
}

struct TooltipState<R: DrawingRoot, T> {
    config: TooltipConfig,
    records: IndexMap<String, TooltipRecord<T>>,
    attached: bool,
    root: Option<R>,
    overlay: Option<R::Overlay>,
    visibility: TooltipVisibility,
}

impl<R: DrawingRoot, T> TooltipState<R, T> {
    fn handle_pointer(&mut self, event: &PointerEvent) {
        if !self.attached {
            return;
        }

        let hovered = event.point.zip(
            event
                .hovered_object_id
                .as_ref()
                .and_then(|id| id.as_str())
                .and_then(|id| self.records.get(id)),
        );
        match hovered {
            Some((point, record)) => {
                let text = record.text.clone();
                self.show(&text, point);
            }
            None => self.hide(),
        }
    }

    fn show(&mut self, text: &str, pointer: Point) {
        let Some(overlay) = self.overlay.as_mut() else {
            self.visibility = TooltipVisibility::Hidden;
            return;
        };

        overlay.set_text(text);
        overlay.set_visible(true);

        let overlay_size = overlay.measure().unwrap_or_default();
        let surface = self.root.as_ref().and_then(DrawingRoot::bounds);
        let position = resolve_tooltip_position(pointer, overlay_size, surface, &self.config);
        overlay.set_position(position);

        if self.visibility != TooltipVisibility::Visible {
            trace!(x = position.x, y = position.y, "marker tooltip shown");
        }
        self.visibility = TooltipVisibility::Visible;
    }

    fn hide(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_visible(false);
        }
        if self.visibility != TooltipVisibility::Hidden {
            trace!("marker tooltip hidden");
        }
        self.visibility = TooltipVisibility::Hidden;
    }

    fn release(&mut self) {
        self.attached = false;
        if let Some(mut overlay) = self.overlay.take() {
            overlay.remove_from_parent();
        }
        self.root = None;
        self.records.clear();
        self.visibility = TooltipVisibility::Hidden;
    }
}

struct Attachment<R> {
    move_subscription: SubscriptionId,
    click_subscription: SubscriptionId,
    root: Option<R>,
    leave_listener: Option<ListenerId>,
}

/// Bridges host pointer notifications into a floating tooltip keyed by
/// marker id.
///
/// Lifecycle is `Unattached -> Attached -> Unattached`. Registered handlers
/// only hold weak references to the controller state and ignore
/// notifications once the controller is detached or dropped.
pub struct MarkerTooltipController<R: DrawingRoot, T = f64> {
    state: Rc<RefCell<TooltipState<R, T>>>,
    attachment: Option<Attachment<R>>,
}

impl<R, T> MarkerTooltipController<R, T>
where
    R: DrawingRoot + 'static,
    T: Clone + 'static,
{
    pub fn new(config: TooltipConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            state: Rc::new(RefCell::new(TooltipState {
                config,
                records: IndexMap::new(),
                attached: false,
                root: None,
                overlay: None,
                visibility: TooltipVisibility::Hidden,
            })),
            attachment: None,
        })
    }

    /// Subscribes to host pointer notifications and creates the overlay.
    ///
    /// A missing drawing root is tolerated: the controller still attaches but
    /// has no overlay to show.
    pub fn attach<H>(&mut self, host: &mut H) -> ChartResult<()>
    where
        H: ChartHost<Root = R>,
    {
        if self.attachment.is_some() {
            return Err(ChartError::InvalidState(
                "marker tooltip controller is already attached".to_owned(),
            ));
        }

        let root = host.drawing_root();
        let mut overlay = root.as_ref().and_then(DrawingRoot::append_overlay);
        if let Some(overlay) = overlay.as_mut() {
            overlay.set_visible(false);
        }
        let overlay_created = overlay.is_some();

        {
            let mut state = self.state.borrow_mut();
            state.attached = true;
            state.root = root.clone();
            state.overlay = overlay;
            state.visibility = TooltipVisibility::Hidden;
        }

        let move_subscription = host.subscribe_pointer_move(self.pointer_handler());
        let click_subscription = host.subscribe_click(self.pointer_handler());
        let leave_listener = root
            .as_ref()
            .map(|root| root.connect_pointer_leave(self.leave_handler()));

        self.attachment = Some(Attachment {
            move_subscription,
            click_subscription,
            root,
            leave_listener,
        });
        debug!(overlay_created, "marker tooltip controller attached");
        Ok(())
    }

    /// Unsubscribes every handler, removes the overlay and clears tooltip data.
    ///
    /// Detaching an unattached controller is a no-op.
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: ChartHost<Root = R>,
    {
        let Some(attachment) = self.attachment.take() else {
            return;
        };

        host.unsubscribe(attachment.move_subscription);
        host.unsubscribe(attachment.click_subscription);
        if let (Some(root), Some(listener)) = (attachment.root.as_ref(), attachment.leave_listener)
        {
            root.disconnect_pointer_leave(listener);
        }
        self.state.borrow_mut().release();
        debug!("marker tooltip controller detached");
    }

    /// Replaces all tooltip records with entries from `markers` that carry
    /// both an id and tooltip text. Later duplicates of an id win.
    pub fn set_marker_tooltip_data<M>(&mut self, markers: &[M])
    where
        M: TooltipSource<T>,
    {
        let mut state = self.state.borrow_mut();
        state.records.clear();
        for (id, text, time) in markers
            .iter()
            .filter_map(<M as TooltipSource<T>>::tooltip_entry)
        {
            state.records.insert(
                id.to_owned(),
                TooltipRecord {
                    id: id.to_owned(),
                    text: text.to_owned(),
                    time: time.clone(),
                },
            );
        }
        debug!(records = state.records.len(), "marker tooltip data replaced");
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    #[must_use]
    pub fn visibility(&self) -> TooltipVisibility {
        self.state.borrow().visibility
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility() == TooltipVisibility::Visible
    }

    #[must_use]
    pub fn config(&self) -> TooltipConfig {
        self.state.borrow().config
    }

    #[must_use]
    pub fn tooltip_count(&self) -> usize {
        self.state.borrow().records.len()
    }

    #[must_use]
    pub fn tooltip_record(&self, id: &str) -> Option<TooltipRecord<T>> {
        self.state.borrow().records.get(id).cloned()
    }

    #[must_use]
    pub fn tooltip_text_for(&self, id: &str) -> Option<String> {
        self.state
            .borrow()
            .records
            .get(id)
            .map(|record| record.text.clone())
    }

    fn pointer_handler(&self) -> PointerHandler {
        let state = Rc::downgrade(&self.state);
        Box::new(move |event: &PointerEvent| {
            with_live_state(&state, |state| state.handle_pointer(event));
        })
    }

    fn leave_handler(&self) -> LeaveHandler {
        let state = Rc::downgrade(&self.state);
        Box::new(move || {
            with_live_state(&state, |state| {
                if state.attached {
                    state.hide();
                }
            });
        })
    }
}

impl<R: DrawingRoot, T> Drop for MarkerTooltipController<R, T> {
    fn drop(&mut self) {
        let Some(attachment) = self.attachment.take() else {
            return;
        };
        // Host subscriptions cannot be released without the host; their
        // handlers become no-ops once the state is gone.
        warn!("marker tooltip controller dropped while attached");
        if let (Some(root), Some(listener)) = (attachment.root.as_ref(), attachment.leave_listener)
        {
            root.disconnect_pointer_leave(listener);
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.release();
        }
    }
}

fn with_live_state<R: DrawingRoot, T>(
    state: &Weak<RefCell<TooltipState<R, T>>>,
    f: impl FnOnce(&mut TooltipState<R, T>),
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => f(&mut state),
        Err(_) => warn!("re-entrant pointer notification ignored"),
    };
}
