use std::cell::RefCell;
use std::rc::Rc;

use chart_markers::core::{Point, Rect, Size};
use chart_markers::interaction::{
    ChartHost, DrawingRoot, LeaveHandler, ListenerId, PointerEvent, PointerHandler,
    SubscriptionId, TooltipOverlay,
};

#[derive(Debug, Default)]
pub struct OverlayLog {
    pub text: Option<String>,
    pub visible: bool,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub removed: bool,
    pub touches_after_removal: usize,
    pub show_count: usize,
}

pub struct FakeOverlay {
    log: Rc<RefCell<OverlayLog>>,
}

impl FakeOverlay {
    fn touch(&self) -> std::cell::RefMut<'_, OverlayLog> {
        let mut log = self.log.borrow_mut();
        if log.removed {
            log.touches_after_removal += 1;
        }
        log
    }
}

impl TooltipOverlay for FakeOverlay {
    fn set_text(&mut self, text: &str) {
        self.touch().text = Some(text.to_owned());
    }

    fn set_visible(&mut self, visible: bool) {
        let mut log = self.touch();
        if visible && !log.visible {
            log.show_count += 1;
        }
        log.visible = visible;
    }

    fn set_position(&mut self, position: Point) {
        self.touch().position = Some(position);
    }

    fn measure(&self) -> Option<Size> {
        self.log.borrow().size
    }

    fn remove_from_parent(&mut self) {
        self.log.borrow_mut().removed = true;
    }
}

#[derive(Default)]
pub struct RootState {
    pub bounds: Option<Rect>,
    pub overlay_size: Option<Size>,
    pub overlays: Vec<Rc<RefCell<OverlayLog>>>,
    pub leave_handlers: Vec<(u64, LeaveHandler)>,
    pub next_listener: u64,
}

#[derive(Clone, Default)]
pub struct FakeRoot {
    pub state: Rc<RefCell<RootState>>,
}

impl FakeRoot {
    pub fn laid_out(bounds: Rect, overlay_size: Size) -> Self {
        let root = Self::default();
        {
            let mut state = root.state.borrow_mut();
            state.bounds = Some(bounds);
            state.overlay_size = Some(overlay_size);
        }
        root
    }

    /// Most recently appended overlay.
    pub fn overlay(&self) -> Rc<RefCell<OverlayLog>> {
        self.state
            .borrow()
            .overlays
            .last()
            .cloned()
            .expect("overlay appended")
    }

    pub fn overlay_count(&self) -> usize {
        self.state.borrow().overlays.len()
    }

    pub fn leave_listener_count(&self) -> usize {
        self.state.borrow().leave_handlers.len()
    }

    pub fn fire_leave(&self) {
        let mut handlers = std::mem::take(&mut self.state.borrow_mut().leave_handlers);
        for (_, handler) in &mut handlers {
            handler();
        }
        let mut state = self.state.borrow_mut();
        handlers.append(&mut state.leave_handlers);
        state.leave_handlers = handlers;
    }
}

impl DrawingRoot for FakeRoot {
    type Overlay = FakeOverlay;

    fn bounds(&self) -> Option<Rect> {
        self.state.borrow().bounds
    }

    fn append_overlay(&self) -> Option<Self::Overlay> {
        let mut state = self.state.borrow_mut();
        let log = Rc::new(RefCell::new(OverlayLog {
            size: state.overlay_size,
            ..OverlayLog::default()
        }));
        state.overlays.push(log.clone());
        Some(FakeOverlay { log })
    }

    fn connect_pointer_leave(&self, handler: LeaveHandler) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = state.next_listener;
        state.leave_handlers.push((id, handler));
        ListenerId(id)
    }

    fn disconnect_pointer_leave(&self, listener: ListenerId) {
        self.state
            .borrow_mut()
            .leave_handlers
            .retain(|(id, _)| *id != listener.0);
    }
}

/// Host that keeps every subscription and replays notifications on demand.
#[derive(Default)]
pub struct FakeHost {
    pub root: Option<FakeRoot>,
    pub move_handlers: Vec<(SubscriptionId, PointerHandler)>,
    pub click_handlers: Vec<(SubscriptionId, PointerHandler)>,
    /// Keeps handlers registered after `unsubscribe`, like a host that
    /// delivers one last queued notification.
    pub ignore_unsubscribe: bool,
    next_subscription: u64,
}

impl FakeHost {
    pub fn with_root(root: FakeRoot) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn emit_move(&mut self, event: PointerEvent) {
        for (_, handler) in &mut self.move_handlers {
            handler(&event);
        }
    }

    pub fn emit_click(&mut self, event: PointerEvent) {
        for (_, handler) in &mut self.click_handlers {
            handler(&event);
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.move_handlers.len() + self.click_handlers.len()
    }

    fn next_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }
}

impl ChartHost for FakeHost {
    type Root = FakeRoot;

    fn drawing_root(&self) -> Option<Self::Root> {
        self.root.clone()
    }

    fn subscribe_pointer_move(&mut self, handler: PointerHandler) -> SubscriptionId {
        let id = self.next_id();
        self.move_handlers.push((id, handler));
        id
    }

    fn subscribe_click(&mut self, handler: PointerHandler) -> SubscriptionId {
        let id = self.next_id();
        self.click_handlers.push((id, handler));
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        if self.ignore_unsubscribe {
            return;
        }
        self.move_handlers.retain(|(id, _)| *id != subscription);
        self.click_handlers.retain(|(id, _)| *id != subscription);
    }
}
