//! GTK4 hosting for marker layers and their tooltip overlay.
//!
//! `GtkDrawingRoot` plays the host root container: the tooltip is a
//! non-targetable `gtk::Label` stacked on a `gtk::Overlay` and positioned
//! through its margins.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk::prelude::*;
use gtk4 as gtk;
use indexmap::IndexMap;
use tracing::warn;

use crate::api::SeriesMarkersLayer;
use crate::core::{Point, Rect, Size, TimeKey};
use crate::extensions::SeriesCoordinateSource;
use crate::interaction::{DrawingRoot, LeaveHandler, ListenerId, TooltipOverlay};
use crate::render::CairoRenderer;

pub const TOOLTIP_CSS_CLASS: &str = "chart-marker-tooltip";

#[derive(Clone)]
pub struct GtkDrawingRoot {
    overlay: gtk::Overlay,
    listeners: Rc<RefCell<IndexMap<u64, gtk::EventControllerMotion>>>,
    next_listener: Rc<Cell<u64>>,
}

impl GtkDrawingRoot {
    #[must_use]
    pub fn new(overlay: gtk::Overlay) -> Self {
        Self {
            overlay,
            listeners: Rc::new(RefCell::new(IndexMap::new())),
            next_listener: Rc::new(Cell::new(0)),
        }
    }

    #[must_use]
    pub fn overlay(&self) -> &gtk::Overlay {
        &self.overlay
    }
}

impl DrawingRoot for GtkDrawingRoot {
    type Overlay = GtkTooltipOverlay;

    fn bounds(&self) -> Option<Rect> {
        let width = self.overlay.width();
        let height = self.overlay.height();
        (width > 0 && height > 0)
            .then(|| Rect::new(0.0, 0.0, f64::from(width), f64::from(height)))
    }

    fn append_overlay(&self) -> Option<Self::Overlay> {
        let label = gtk::Label::new(None);
        label.set_halign(gtk::Align::Start);
        label.set_valign(gtk::Align::Start);
        label.set_can_target(false);
        label.set_wrap(false);
        label.add_css_class(TOOLTIP_CSS_CLASS);
        label.set_visible(false);
        self.overlay.add_overlay(&label);
        Some(GtkTooltipOverlay { label })
    }

    fn connect_pointer_leave(&self, handler: LeaveHandler) -> ListenerId {
        let controller = gtk::EventControllerMotion::new();
        let handler = RefCell::new(handler);
        controller.connect_leave(move |_| {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                let handler: &mut LeaveHandler = &mut handler;
                handler();
            }
        });
        self.overlay.add_controller(controller.clone());

        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().insert(id, controller);
        ListenerId(id)
    }

    fn disconnect_pointer_leave(&self, listener: ListenerId) {
        if let Some(controller) = self.listeners.borrow_mut().shift_remove(&listener.0) {
            self.overlay.remove_controller(&controller);
        }
    }
}

pub struct GtkTooltipOverlay {
    label: gtk::Label,
}

impl GtkTooltipOverlay {
    #[must_use]
    pub fn label(&self) -> &gtk::Label {
        &self.label
    }
}

impl TooltipOverlay for GtkTooltipOverlay {
    fn set_text(&mut self, text: &str) {
        self.label.set_text(text);
    }

    fn set_visible(&mut self, visible: bool) {
        self.label.set_visible(visible);
    }

    fn set_position(&mut self, position: Point) {
        // Margins cannot be negative; the overlay pins at the root edge instead.
        self.label.set_margin_start(position.x.max(0.0).round() as i32);
        self.label.set_margin_top(position.y.max(0.0).round() as i32);
    }

    fn measure(&self) -> Option<Size> {
        let (_, width, _, _) = self.label.measure(gtk::Orientation::Horizontal, -1);
        let (_, height, _, _) = self.label.measure(gtk::Orientation::Vertical, width);
        (width > 0).then(|| Size::new(f64::from(width), f64::from(height)))
    }

    fn remove_from_parent(&mut self) {
        let Some(parent) = self.label.parent() else {
            return;
        };
        match parent.downcast::<gtk::Overlay>() {
            Ok(overlay) => overlay.remove_overlay(&self.label),
            Err(_) => self.label.unparent(),
        }
    }
}

/// Draws `layer` on every `area` redraw.
///
/// GTK already applies the widget scale factor to the Cairo context it hands
/// out, so the layer should keep a pixel ratio of 1 here.
pub fn connect_markers_draw<T, S>(
    area: &gtk::DrawingArea,
    layer: Rc<RefCell<SeriesMarkersLayer<CairoRenderer, T>>>,
    source: Rc<S>,
) where
    T: TimeKey + 'static,
    S: SeriesCoordinateSource + ?Sized + 'static,
{
    area.set_draw_func(move |_area, context, _width, _height| {
        let Ok(mut layer) = layer.try_borrow_mut() else {
            warn!("series markers layer busy, skipping draw");
            return;
        };
        if let Err(err) = layer.render_on_cairo_context(context, source.as_ref()) {
            warn!(error = %err, "failed to draw series markers");
        }
    });
}
