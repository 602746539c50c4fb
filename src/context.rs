//! Central interaction state and the Reply effect processor.
//!
//! [`InteractionContext`] owns the widget arena, the window set, the
//! hit-test grid, and every piece of interaction state (captures, focus,
//! drag machinery, tooltip, modal and menu stacks). The per-event routing
//! state machines live in `dispatch`; everything they mutate lives here,
//! and every side effect a widget requests through a [`Reply`] is applied
//! in exactly one place: [`InteractionContext::process_reply`].
//!
//! There are no globals. The embedder constructs one context, feeds it
//! translated events, and reads back cursor/focus/capture state through
//! the query methods.

use peniko::kurbo::{Point, Rect};
use rustc_hash::FxHashMap;

use crate::capture::{CaptureRegistry, CaptureSet};
use crate::config::InputConfig;
use crate::drag::{DragDetector, DragDropHandle, DragDropSession};
use crate::error::Error;
use crate::event::{Cursor, DragEvent, WidgetEvent};
use crate::focus::{FocusCause, FocusTracker};
use crate::gamepad::GamepadUser;
use crate::hit_test::HitTestGrid;
use crate::keyboard::Modifiers;
use crate::modal::{MenuStack, ModalStack};
use crate::path::{ArrangedWidget, WeakWidgetPath, WidgetPath};
use crate::pointer::{PointerButtons, PointerEvent, PointerIndex};
use crate::renderer::{NullRenderSync, RenderSync};
use crate::reply::Reply;
use crate::tooltip::{TooltipClosed, TooltipController};
use crate::widget::{Widget, WidgetArena, WidgetId};
use crate::window::{WindowId, WindowKind, Windows};

pub struct InteractionContext {
    pub(crate) arena: WidgetArena,
    pub(crate) windows: Windows,
    pub(crate) config: InputConfig,
    pub(crate) grid: HitTestGrid,
    pub(crate) grid_dirty: bool,
    pub(crate) captures: CaptureRegistry,
    pub(crate) focus: FocusTracker,
    pub(crate) detector: DragDetector,
    pub(crate) drag_drop: Option<DragDropSession>,
    pub(crate) tooltip: TooltipController,
    pub(crate) modal: ModalStack,
    pub(crate) menus: MenuStack,
    renderer: Box<dyn RenderSync>,

    /// Last known cursor position, virtual-desktop coordinates.
    pub(crate) cursor_pos: Point,
    /// Last known position per pointer stream (touches included).
    pub(crate) pointer_positions: FxHashMap<PointerIndex, Point>,
    /// Currently held buttons per pointer stream.
    pub(crate) pressed: FxHashMap<PointerIndex, PointerButtons>,
    /// Path each pointer's enter/leave diffing last ran against.
    pub(crate) last_under: FxHashMap<PointerIndex, WeakWidgetPath>,
    /// Modifier state as of the latest translated event.
    pub(crate) modifiers: Modifiers,

    requested_cursor_pos: Option<Point>,
    pub(crate) cursor_lock: Option<WidgetId>,
    pub(crate) high_precision: Option<WidgetId>,
    pub(crate) prevent_throttling: bool,
    pub(crate) current_cursor: Cursor,
    app_active: bool,
    active_window: Option<WindowId>,
    /// Set whenever a Reply (or the context itself) moves focus during the
    /// current dispatch; pointer-down's focus fallback checks it.
    pub(crate) focus_moved_in_dispatch: bool,
}

impl InteractionContext {
    pub fn new(config: InputConfig) -> Self {
        Self::with_renderer(config, Box::new(NullRenderSync))
    }

    pub fn with_renderer(config: InputConfig, renderer: Box<dyn RenderSync>) -> Self {
        let cell = config.hit_test_cell_size;
        Self {
            arena: WidgetArena::new(),
            windows: Windows::new(),
            config,
            grid: HitTestGrid::new(cell),
            grid_dirty: true,
            captures: CaptureRegistry::new(),
            focus: FocusTracker::new(),
            detector: DragDetector::default(),
            drag_drop: None,
            tooltip: TooltipController::new(),
            modal: ModalStack::new(),
            menus: MenuStack::new(),
            renderer,
            cursor_pos: Point::ZERO,
            pointer_positions: FxHashMap::default(),
            pressed: FxHashMap::default(),
            last_under: FxHashMap::default(),
            modifiers: Modifiers::empty(),
            requested_cursor_pos: None,
            cursor_lock: None,
            high_precision: None,
            prevent_throttling: false,
            current_cursor: Cursor::Default,
            app_active: true,
            active_window: None,
            focus_moved_in_dispatch: false,
        }
    }

    // ---- windows and tree -------------------------------------------------

    pub fn open_window(
        &mut self,
        rect: Rect,
        kind: WindowKind,
        parent: Option<WindowId>,
    ) -> Result<WindowId, Error> {
        let window = self.windows.open(rect, kind, parent)?;
        self.grid_dirty = true;
        log::debug!(target: "wicket::window", "opened {kind:?} window {window:?} at {rect:?}");
        Ok(window)
    }

    /// Open a popup window and push it on the menu chain. Dismissal rules
    /// of the menu stack apply from here on.
    pub fn open_menu(&mut self, rect: Rect, parent: WindowId) -> Result<WindowId, Error> {
        let window = self.windows.open(rect, WindowKind::Menu, Some(parent))?;
        self.menus.push(window);
        self.grid_dirty = true;
        log::debug!(
            target: "wicket::menu",
            "opened menu level {} as {window:?}",
            self.menus.len() - 1,
        );
        Ok(window)
    }

    /// Close `window` and its popup children. Closing an open menu also
    /// dismisses every deeper menu first.
    pub fn close_window(&mut self, window: WindowId) {
        if !self.windows.contains(window) {
            return;
        }
        if let Some(level) = self.menus.level_of(window) {
            for dismissed in self.menus.dismiss_from(level) {
                if dismissed != window {
                    self.close_window_inner(dismissed);
                }
            }
        }
        self.close_window_inner(window);
    }

    fn close_window_inner(&mut self, window: WindowId) {
        if !self.windows.contains(window) {
            return;
        }
        // The renderer may still be consuming this window's draw data.
        self.renderer.sync();
        let had_focus_here = self.focus.window() == Some(window);
        for (id, record) in self.windows.remove(window) {
            log::debug!(target: "wicket::window", "closed window {id:?}");
            self.modal.remove(id);
            if self.menus.level_of(id).is_some() {
                self.menus.forget(id);
            }
            if self.tooltip.visible_window() == Some(id) {
                // The spawned window is going away underneath the
                // controller; just notify the source.
                if let Some(closed) = self.tooltip.close() {
                    self.notify_tooltip_closed(closed.source);
                }
            }
            if self.active_window == Some(id) {
                self.active_window = None;
            }
            if let Some(root) = record.root() {
                self.arena.remove(root);
            }
        }
        if had_focus_here {
            self.clear_focus(FocusCause::OtherWidgetLostFocus);
        }
        self.repair_focus();
        self.grid_dirty = true;
    }

    pub fn set_window_rect(&mut self, window: WindowId, rect: Rect) -> Result<(), Error> {
        if !self.windows.contains(window) {
            return Err(Error::UnknownWindow);
        }
        self.renderer.sync();
        if let Some(record) = self.windows.get_mut(window) {
            record.rect = rect;
        }
        self.renderer.resize_surface(window, rect.size());
        self.grid_dirty = true;
        Ok(())
    }

    /// Embedder-level input gate for one window.
    pub fn set_window_enabled(&mut self, window: WindowId, enabled: bool) -> Result<(), Error> {
        let record = self.windows.get_mut(window).ok_or(Error::UnknownWindow)?;
        record.enabled = enabled;
        Ok(())
    }

    pub fn set_window_visible(&mut self, window: WindowId, visible: bool) -> Result<(), Error> {
        let record = self.windows.get_mut(window).ok_or(Error::UnknownWindow)?;
        record.visible = visible;
        self.grid_dirty = true;
        Ok(())
    }

    pub fn insert_root(
        &mut self,
        window: WindowId,
        widget: impl Widget + 'static,
    ) -> Result<WidgetId, Error> {
        let record = self.windows.get(window).ok_or(Error::UnknownWindow)?;
        if record.root().is_some() {
            return Err(Error::RootAlreadySet);
        }
        let id = self.arena.insert(window, None, widget)?;
        self.windows.set_root(window, id)?;
        self.grid_dirty = true;
        Ok(id)
    }

    pub fn insert_child(
        &mut self,
        parent: WidgetId,
        widget: impl Widget + 'static,
    ) -> Result<WidgetId, Error> {
        let window = self.arena.window_of(parent).ok_or(Error::UnknownWidget)?;
        let id = self.arena.insert(window, Some(parent), widget)?;
        self.grid_dirty = true;
        Ok(id)
    }

    pub fn remove_widget(&mut self, id: WidgetId) -> Result<(), Error> {
        if !self.arena.contains(id) {
            return Err(Error::UnknownWidget);
        }
        let window = self.arena.window_of(id);
        self.arena.remove(id);
        if let Some(window) = window {
            if let Some(record) = self.windows.get_mut(window) {
                if record.root() == Some(id) {
                    record.root = None;
                }
            }
        }
        self.repair_focus();
        if let Some(source) = self.tooltip.source() {
            if !self.arena.contains(source) {
                self.close_tooltip();
            }
        }
        self.grid_dirty = true;
        Ok(())
    }

    /// Record a widget's arranged screen rect for this frame.
    pub fn arrange(&mut self, id: WidgetId, rect: Rect) -> Result<(), Error> {
        self.arena.arrange(id, rect)?;
        self.grid_dirty = true;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<(), Error> {
        self.arena.set_enabled(id, enabled)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), Error> {
        self.arena.set_visible(id, visible)?;
        self.grid_dirty = true;
        Ok(())
    }

    // ---- hit-test grid ----------------------------------------------------

    /// Flush arranged geometry into the hit-test grid. Called by the
    /// embedder at the start of full-frame drawing; dispatch reuses the
    /// existing grid between rebuilds.
    pub fn rebuild_hit_grid(&mut self) {
        let bounds = self.windows.virtual_desktop();
        self.grid.reset(bounds, self.config.hit_test_cell_size);
        for window in self.windows.draw_order() {
            let Some(record) = self.windows.get(window) else {
                continue;
            };
            if record.kind() == WindowKind::Tooltip || !record.visible {
                continue;
            }
            if let Some(root) = record.root() {
                self.grid_window_subtree(window, root, None);
            }
        }
        self.grid_dirty = false;
        log::trace!(
            target: "wicket::dispatch",
            "hit-test grid rebuilt: {} entries over {bounds:?}",
            self.grid.entry_count(),
        );
    }

    fn grid_window_subtree(&mut self, window: WindowId, widget: WidgetId, parent: Option<u32>) {
        if !self.arena.is_visible(widget) {
            return;
        }
        let Some(rect) = self.arena.rect(widget) else {
            return;
        };
        let index = self.grid.add(window, widget, rect, parent);
        let children: Vec<WidgetId> = self.arena.children(widget).to_vec();
        for child in children {
            self.grid_window_subtree(window, child, Some(index));
        }
    }

    pub fn needs_grid_rebuild(&self) -> bool {
        self.grid_dirty
    }

    /// Hit-test `point` among the currently interactive windows.
    pub(crate) fn path_under_point(&self, point: Point, ignore_disabled: bool) -> WidgetPath {
        let window = self
            .windows
            .window_under(point, |w| self.modal.allows(&self.windows, w));
        match window {
            Some(window) => self.grid.path_at(&self.arena, window, point, ignore_disabled),
            None => WidgetPath::empty(),
        }
    }

    // ---- widget callbacks -------------------------------------------------

    /// Borrow `id`'s widget and run `f` with an [`EventCx`]. Skips dead
    /// widgets and reentrant borrows (a widget cannot take a nested
    /// callback while one of its own is on the stack).
    pub(crate) fn call_widget<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut EventCx) -> R,
    ) -> Option<R> {
        let rc = self.arena.widget(id)?;
        let Ok(mut widget) = rc.try_borrow_mut() else {
            log::trace!(
                target: "wicket::dispatch",
                "skipping reentrant delivery to {}",
                self.arena.name(id),
            );
            return None;
        };
        let mut cx = EventCx { ctx: self };
        Some(f(&mut *widget, &mut cx))
    }

    /// Notification-style delivery: the widget sees the event, its reply's
    /// side effects are not applied (enter/leave and their drag
    /// equivalents).
    pub(crate) fn notify(&mut self, arranged: &ArrangedWidget, event: &WidgetEvent) {
        let this = *arranged;
        self.call_widget(this.widget, |w, cx| {
            let _ = w.event(cx, &this, event);
        });
    }

    pub(crate) fn notify_capture_lost(&mut self, id: WidgetId) {
        log::debug!(target: "wicket::capture", "capture lost by {}", self.arena.name(id));
        self.call_widget(id, |w, cx| w.capture_lost(cx));
    }

    // ---- reply processing -------------------------------------------------

    /// Apply every side effect carried by `reply`, in a fixed order, before
    /// the next widget in the current pass runs.
    pub(crate) fn process_reply(
        &mut self,
        reply: Reply,
        event_path: &WidgetPath,
        pointer: Option<&PointerEvent>,
    ) {
        let pointer_index = pointer.map(|p| p.pointer).unwrap_or(PointerIndex::CURSOR);
        let position = pointer.map(|p| p.position).unwrap_or(self.cursor_pos);

        if reply.release_pointer {
            self.release_pointer_capture(pointer_index);
        }
        if let Some(user) = reply.release_gamepad {
            if self.captures.release_gamepad(user).is_some() {
                log::debug!(target: "wicket::capture", "gamepad capture released for {user:?}");
            }
        }
        if reply.end_drag_drop {
            self.cancel_drag_drop();
        }
        if let Some(payload) = reply.begin_drag_drop {
            self.begin_drag_drop(payload, pointer_index, position);
        }
        if let Some(widget) = reply.capture_pointer {
            self.set_pointer_capture(pointer_index, event_path, widget);
        }
        if let Some(widget) = reply.high_precision_mouse {
            if self.set_pointer_capture(pointer_index, event_path, widget) {
                self.high_precision = Some(widget);
                log::debug!(
                    target: "wicket::capture",
                    "high-precision mouse movement for {}",
                    self.arena.name(widget),
                );
            }
        }
        if let Some((user, widget)) = reply.capture_gamepad {
            if let CaptureSet::Installed(_) =
                self.captures.set_gamepad(&self.arena, user, event_path, widget)
            {
                log::debug!(
                    target: "wicket::capture",
                    "{user:?} gamepad captured by {}",
                    self.arena.name(widget),
                );
            }
        }
        if let Some(requested) = reply.set_cursor_pos {
            self.requested_cursor_pos = Some(requested);
            self.cursor_pos = requested;
            self.pointer_positions.insert(PointerIndex::CURSOR, requested);
        }
        if let Some(widget) = reply.lock_cursor {
            self.cursor_lock = Some(widget);
        }
        if reply.unlock_cursor {
            self.cursor_lock = None;
        }
        if let Some((widget, button)) = reply.detect_drag {
            match event_path.down_to(widget) {
                Some(candidate) => {
                    self.detector.arm(&candidate, pointer_index, button, position);
                    log::trace!(
                        target: "wicket::drag",
                        "drag-detect armed for {} ({button:?})",
                        self.arena.name(widget),
                    );
                }
                None => log::warn!(
                    target: "wicket::drag",
                    "dropping drag-detect request for {}: not on the event path",
                    self.arena.name(widget),
                ),
            }
        }
        if reply.prevent_throttling {
            self.prevent_throttling = true;
        }
        if let Some((widget, cause)) = reply.focus {
            self.set_focus(widget, cause);
        }
        if reply.clear_focus {
            self.clear_focus(FocusCause::Programmatic);
        }
    }

    pub(crate) fn release_pointer_capture(&mut self, pointer: PointerIndex) {
        if let Some(leaf) = self.captures.release(pointer) {
            log::debug!(target: "wicket::capture", "pointer {pointer:?} capture released");
            if self.arena.contains(leaf) {
                self.notify_capture_lost(leaf);
            }
        }
        if pointer.is_cursor() {
            self.cursor_lock = None;
            self.high_precision = None;
        }
    }

    /// Returns true when the capture was installed.
    fn set_pointer_capture(
        &mut self,
        pointer: PointerIndex,
        event_path: &WidgetPath,
        widget: WidgetId,
    ) -> bool {
        match self.captures.set(&self.arena, pointer, event_path, widget) {
            CaptureSet::Installed(previous) => {
                log::debug!(
                    target: "wicket::capture",
                    "pointer {pointer:?} captured by {}",
                    self.arena.name(widget),
                );
                if let Some(previous) = previous {
                    if self.arena.contains(previous) {
                        self.notify_capture_lost(previous);
                    }
                }
                self.close_tooltip();
                true
            }
            CaptureSet::Rejected => false,
        }
    }

    // ---- drag-and-drop ----------------------------------------------------

    fn begin_drag_drop(
        &mut self,
        payload: DragDropHandle,
        pointer: PointerIndex,
        position: Point,
    ) {
        if self.drag_drop.is_some() {
            self.cancel_drag_drop();
        }
        self.close_tooltip();
        self.detector.clear();
        // The session owns routing from here; capture would fight it.
        self.release_pointer_capture(pointer);

        let under = self.resolve_last_under(pointer);
        for index in (0..under.len()).rev() {
            let Some(arranged) = under.get(index).copied() else {
                continue;
            };
            self.notify(&arranged, &WidgetEvent::PointerLeave);
        }
        let pointer_event = self.synth_pointer_event(pointer, position);
        let drag_event = DragEvent {
            pointer: pointer_event,
            payload: payload.clone(),
        };
        for index in 0..under.len() {
            let Some(arranged) = under.get(index).copied() else {
                continue;
            };
            self.notify(&arranged, &WidgetEvent::DragEnter(drag_event.clone()));
        }
        self.drag_drop = Some(DragDropSession { payload, pointer });
        log::debug!(target: "wicket::drag", "drag-and-drop session started");
    }

    /// Tear down the active session without a drop: dragged-over widgets
    /// get a drag-leave and the payload is told the drop never happened.
    pub(crate) fn cancel_drag_drop(&mut self) {
        let Some(session) = self.drag_drop.take() else {
            return;
        };
        log::debug!(target: "wicket::drag", "drag-and-drop session cancelled");
        let position = self
            .pointer_positions
            .get(&session.pointer)
            .copied()
            .unwrap_or(self.cursor_pos);
        let pointer_event = self.synth_pointer_event(session.pointer, position);
        let drag_event = DragEvent {
            pointer: pointer_event.clone(),
            payload: session.payload.clone(),
        };
        let under = self.resolve_last_under(session.pointer);
        for index in (0..under.len()).rev() {
            let Some(arranged) = under.get(index).copied() else {
                continue;
            };
            self.notify(&arranged, &WidgetEvent::DragLeave(drag_event.clone()));
        }
        if let Ok(mut payload) = session.payload.try_borrow_mut() {
            payload.on_drop(false, &pointer_event);
        }
    }

    pub(crate) fn resolve_last_under(&self, pointer: PointerIndex) -> WidgetPath {
        self.last_under
            .get(&pointer)
            .map(|weak| weak.resolve(&self.arena).into_path())
            .unwrap_or_else(WidgetPath::empty)
    }

    /// Build a pointer event from stored stream state, for moves the loop
    /// makes up itself.
    pub(crate) fn synth_pointer_event(
        &self,
        pointer: PointerIndex,
        position: Point,
    ) -> PointerEvent {
        let last = self
            .pointer_positions
            .get(&pointer)
            .copied()
            .unwrap_or(position);
        let mut event = PointerEvent::new(pointer, position);
        event.last_position = last;
        event.delta = position - last;
        event.buttons = self.pressed.get(&pointer).copied().unwrap_or_default();
        event.modifiers = self.modifiers;
        event.touch = !pointer.is_cursor();
        event.synthetic = true;
        event
    }

    // ---- tooltip ----------------------------------------------------------

    pub(crate) fn close_tooltip(&mut self) {
        if let Some(closed) = self.tooltip.close() {
            self.finish_tooltip_close(closed);
        }
    }

    pub(crate) fn finish_tooltip_close(&mut self, closed: TooltipClosed) {
        log::debug!(
            target: "wicket::tooltip",
            "tooltip for {} dismissed",
            self.arena.name(closed.source),
        );
        if self.windows.contains(closed.window) {
            self.close_window(closed.window);
        }
        self.notify_tooltip_closed(closed.source);
    }

    fn notify_tooltip_closed(&mut self, source: WidgetId) {
        if let Some(rc) = self.arena.widget(source) {
            if let Ok(mut widget) = rc.try_borrow_mut() {
                widget.tooltip_closed();
            }
        }
    }

    // ---- focus ------------------------------------------------------------

    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.focused()
    }

    /// Move focus directly to `widget`. Fails (with a warning) when the
    /// widget is dead, disabled, or does not accept focus.
    pub fn set_focus(&mut self, widget: WidgetId, cause: FocusCause) -> bool {
        if !self.arena.contains(widget) || !self.arena.is_enabled(widget) {
            log::warn!(
                target: "wicket::focus",
                "dropping focus request: widget is dead or disabled",
            );
            return false;
        }
        if !self.widget_supports_focus(widget) {
            log::warn!(
                target: "wicket::focus",
                "dropping focus request: {} does not accept focus",
                self.arena.name(widget),
            );
            return false;
        }
        let Some(path) = WidgetPath::from_widget(&self.arena, widget) else {
            return false;
        };
        self.transfer_focus(Some(path), cause)
    }

    /// Focus the deepest focusable, enabled widget at or above `path`'s
    /// leaf. Returns false when nothing on the path can take focus.
    pub(crate) fn set_focus_to_path(&mut self, path: &WidgetPath, cause: FocusCause) -> bool {
        let candidate = path
            .iter()
            .rev()
            .find(|a| self.arena.is_enabled(a.widget) && self.widget_supports_focus(a.widget))
            .map(|a| a.widget);
        match candidate.and_then(|widget| path.down_to(widget)) {
            Some(prefix) => self.transfer_focus(Some(prefix), cause),
            None => false,
        }
    }

    pub fn clear_focus(&mut self, cause: FocusCause) {
        self.transfer_focus(None, cause);
    }

    fn transfer_focus(&mut self, path: Option<WidgetPath>, cause: FocusCause) -> bool {
        let new_leaf = path.as_ref().and_then(|p| p.leaf()).map(|a| a.widget);
        let old_leaf = self.focus.focused();
        if new_leaf == old_leaf {
            if let Some(path) = &path {
                self.focus.set(path, cause);
            }
            return true;
        }
        self.focus_moved_in_dispatch = true;

        let old_ids: Vec<WidgetId> = self
            .focus
            .path()
            .map(|p| p.ids().to_vec())
            .unwrap_or_default();
        let new_ids: Vec<WidgetId> = path
            .as_ref()
            .map(|p| p.iter().map(|a| a.widget).collect())
            .unwrap_or_default();
        for id in old_ids.iter().chain(new_ids.iter()) {
            if let Some(rc) = self.arena.widget(*id) {
                if let Ok(mut widget) = rc.try_borrow_mut() {
                    widget.focus_changing(old_leaf, new_leaf);
                }
            }
        }

        if let Some(old) = old_leaf {
            if self.arena.contains(old) {
                self.call_widget(old, |w, cx| w.focus_lost(cx, cause));
            }
        }
        match &path {
            Some(p) => self.focus.set(p, cause),
            None => {
                self.focus.take();
            }
        }
        log::debug!(
            target: "wicket::focus",
            "focus moved to {} ({cause:?})",
            match new_leaf {
                Some(id) => self.arena.name(id),
                None => "nothing".into(),
            },
        );
        if let Some(new) = new_leaf {
            if let Some(reply) = self.call_widget(new, |w, cx| w.focus_received(cx, cause)) {
                let event_path = path.unwrap_or_else(WidgetPath::empty);
                self.process_reply(reply, &event_path, None);
            }
        }
        true
    }

    pub(crate) fn widget_supports_focus(&self, id: WidgetId) -> bool {
        self.arena
            .widget(id)
            .and_then(|rc| rc.try_borrow().ok().map(|w| w.supports_focus()))
            .unwrap_or(false)
    }

    /// Focusable widgets of `window` in pre-order. Disabled or invisible
    /// subtrees are pruned wholesale.
    pub(crate) fn focus_traversal(&self, window: WindowId) -> Vec<WidgetId> {
        let mut order = Vec::new();
        let Some(root) = self.windows.get(window).and_then(|w| w.root()) else {
            return order;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.arena.is_enabled(id) || !self.arena.is_visible(id) {
                continue;
            }
            if self.widget_supports_focus(id) {
                order.push(id);
            }
            for &child in self.arena.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Tab navigation: move focus to the next (or previous) focusable
    /// widget in traversal order, wrapping around.
    pub(crate) fn focus_next(&mut self, reverse: bool) -> bool {
        let Some(window) = self.focus.window().or(self.active_window) else {
            return false;
        };
        let order = self.focus_traversal(window);
        if order.is_empty() {
            return false;
        }
        let next = match self
            .focus
            .focused()
            .and_then(|current| order.iter().position(|w| *w == current))
        {
            Some(index) => order[(index + if reverse { order.len() - 1 } else { 1 }) % order.len()],
            None => order[if reverse { order.len() - 1 } else { 0 }],
        };
        self.set_focus(next, FocusCause::Keyboard)
    }

    /// After tree surgery, re-anchor focus on the deepest live ancestor of
    /// the old focus leaf, or clear it when nothing remains.
    pub(crate) fn repair_focus(&mut self) {
        let Some(weak) = self.focus.path().cloned() else {
            return;
        };
        match weak.resolve(&self.arena) {
            crate::path::PathResolution::Full(_) => {}
            crate::path::PathResolution::Truncated(prefix) => {
                if !self.set_focus_to_path(&prefix, FocusCause::OtherWidgetLostFocus) {
                    self.clear_focus(FocusCause::OtherWidgetLostFocus);
                }
            }
            crate::path::PathResolution::Dead => {
                self.clear_focus(FocusCause::OtherWidgetLostFocus);
            }
        }
    }

    // ---- modality and menus -----------------------------------------------

    /// Make `window` modal: until it closes or is popped, only it and its
    /// descendant windows receive input. Transient pointer state (tooltip,
    /// captures, pending drag detection) is torn down.
    pub fn push_modal(&mut self, window: WindowId) -> Result<(), Error> {
        if !self.windows.contains(window) {
            return Err(Error::UnknownWindow);
        }
        log::debug!(target: "wicket::window", "window {window:?} pushed modal");
        self.close_tooltip();
        self.detector.clear();
        let captured: Vec<PointerIndex> = self.captures.captured_pointers().collect();
        for pointer in captured {
            self.release_pointer_capture(pointer);
        }
        self.modal.push(window);
        self.windows.bring_to_front(window);
        self.window_activated(window);
        Ok(())
    }

    pub fn pop_modal(&mut self) -> Option<WindowId> {
        let popped = self.modal.pop();
        if let Some(window) = popped {
            log::debug!(target: "wicket::window", "window {window:?} popped modal");
        }
        popped
    }

    /// Nested modal pump: push `window` modal, then repeatedly run `pump`
    /// (which feeds events and advances time) while it remains the active
    /// modal and open, syncing with the renderer after each iteration.
    /// `pump` is responsible for eventually closing or popping the window.
    pub fn run_modal(
        &mut self,
        window: WindowId,
        mut pump: impl FnMut(&mut Self),
    ) -> Result<(), Error> {
        self.push_modal(window)?;
        while self.modal.top() == Some(window) && self.windows.contains(window) {
            pump(self);
            self.renderer.sync();
        }
        Ok(())
    }

    /// Dismiss menus in reaction to a press at `position`: everything
    /// deeper than the menu containing the point, or the whole chain when
    /// the press is outside every open menu.
    pub(crate) fn dismiss_menus_outside(&mut self, position: Point) {
        if self.menus.is_empty() {
            return;
        }
        match self.menus.level_containing(&self.windows, position) {
            Some(level) => self.dismiss_menus_from(level + 1),
            None => self.dismiss_menus_from(0),
        }
    }

    pub fn dismiss_menus_from(&mut self, level: usize) {
        let closed = self.menus.dismiss_from(level);
        if closed.is_empty() {
            return;
        }
        log::debug!(
            target: "wicket::menu",
            "dismissing {} menu level(s) from {level}",
            closed.len(),
        );
        for window in closed {
            self.close_window(window);
        }
    }

    // ---- activation -------------------------------------------------------

    pub fn active_window(&self) -> Option<WindowId> {
        self.active_window
    }

    pub fn app_active(&self) -> bool {
        self.app_active
    }

    /// The platform says `window` was activated. Honored unless a modal is
    /// enforcing: activating outside the modal chain flashes the modal
    /// window instead.
    pub fn window_activated(&mut self, window: WindowId) {
        let Some(record) = self.windows.get(window) else {
            return;
        };
        if record.kind() == WindowKind::Tooltip {
            return;
        }
        if !self.modal.allows(&self.windows, window) {
            if let Some(top) = self.modal.top() {
                log::debug!(
                    target: "wicket::window",
                    "activation of {window:?} redirected to modal {top:?}",
                );
                self.windows.bring_to_front(top);
                if let Some(modal_record) = self.windows.get_mut(top) {
                    modal_record.flash_requested = true;
                }
            }
            return;
        }
        self.app_active = true;
        if self.active_window.replace(window) == Some(window) {
            return;
        }
        log::debug!(target: "wicket::window", "window {window:?} activated");
        if !self.menus.in_chain(&self.windows, window) {
            self.dismiss_menus_from(0);
        }
        self.windows.bring_to_front(window);
        let restore = self
            .windows
            .get_mut(window)
            .and_then(|record| record.restore_focus.take());
        if let Some(widget) = restore {
            if self.arena.contains(widget) {
                self.set_focus(widget, FocusCause::WindowActivate);
            }
        }
    }

    pub fn window_deactivated(&mut self, window: WindowId) {
        if self.active_window == Some(window) {
            self.active_window = None;
        }
        if self.focus.window() == Some(window) {
            if let Some(leaf) = self.focus.focused() {
                if let Some(record) = self.windows.get_mut(window) {
                    record.restore_focus = Some(leaf);
                }
            }
        }
        let owned_menu = self
            .menus
            .levels()
            .iter()
            .position(|&menu| self.windows.is_descendant_of(menu, window));
        if let Some(level) = owned_menu {
            self.dismiss_menus_from(level);
        }
        log::debug!(target: "wicket::window", "window {window:?} deactivated");
    }

    /// Application-level activation switch. Deactivation resets every piece
    /// of transient interaction state; reactivation starts clean.
    pub fn set_app_active(&mut self, active: bool) {
        if self.app_active == active {
            return;
        }
        self.app_active = active;
        if active {
            log::debug!(target: "wicket::window", "application activated");
            return;
        }
        log::debug!(target: "wicket::window", "application deactivated, resetting input state");
        self.dismiss_menus_from(0);
        self.close_tooltip();
        self.clear_focus(FocusCause::OtherWidgetLostFocus);
        let notify = self.captures.release_all(&self.arena);
        for leaf in notify {
            self.notify_capture_lost(leaf);
        }
        self.detector.clear();
        self.cancel_drag_drop();
        self.cursor_lock = None;
        self.high_precision = None;
        self.prevent_throttling = false;
        self.active_window = None;
    }

    /// Restore default input routing: every pointer and gamepad capture is
    /// released (captured widgets are notified) and the cursor lock and
    /// high-precision state are dropped. Focus, menus, and any drag in
    /// progress are left alone.
    pub fn reset_input(&mut self) {
        let notify = self.captures.release_all(&self.arena);
        for leaf in notify {
            self.notify_capture_lost(leaf);
        }
        self.cursor_lock = None;
        self.high_precision = None;
        log::debug!(target: "wicket::capture", "input state reset to defaults");
    }

    // ---- queries ----------------------------------------------------------

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }

    pub fn windows(&self) -> &Windows {
        &self.windows
    }

    pub fn arena(&self) -> &WidgetArena {
        &self.arena
    }

    pub fn captures(&self) -> &CaptureRegistry {
        &self.captures
    }

    pub fn menus(&self) -> &MenuStack {
        &self.menus
    }

    pub fn modal_stack(&self) -> &ModalStack {
        &self.modal
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn cursor_position(&self) -> Point {
        self.cursor_pos
    }

    pub fn pointer_captor(&self, pointer: PointerIndex) -> Option<WidgetId> {
        self.captures.captor(pointer)
    }

    pub fn gamepad_captor(&self, user: GamepadUser) -> Option<WidgetId> {
        self.captures.gamepad_captor(user)
    }

    pub fn is_drag_dropping(&self) -> bool {
        self.drag_drop.is_some()
    }

    pub fn drag_payload(&self) -> Option<DragDropHandle> {
        self.drag_drop.as_ref().map(|s| s.payload.clone())
    }

    /// Where a Reply asked the embedder to warp the cursor; cleared by the
    /// read.
    pub fn take_requested_cursor_pos(&mut self) -> Option<Point> {
        self.requested_cursor_pos.take()
    }

    /// Widget whose arranged bounds the cursor is locked to, if any.
    pub fn cursor_lock(&self) -> Option<WidgetId> {
        self.cursor_lock
    }

    pub fn cursor_lock_rect(&self) -> Option<Rect> {
        self.cursor_lock.and_then(|id| self.arena.rect(id))
    }

    pub fn high_precision_mouse(&self) -> Option<WidgetId> {
        self.high_precision
    }

    pub fn prevent_throttling(&self) -> bool {
        self.prevent_throttling
    }

    /// Cursor shape for the hot leaf (or the drag payload's override),
    /// refreshed every tick.
    pub fn current_cursor(&self) -> Cursor {
        self.current_cursor
    }

    pub fn take_flash_request(&mut self, window: WindowId) -> bool {
        self.windows.take_flash_request(window)
    }

    /// Block until the renderer has consumed the current frame. Embedders
    /// can call this at their own synchronization points; window teardown
    /// and resize do it implicitly.
    pub fn sync_renderer(&mut self) {
        self.renderer.sync();
    }

    pub(crate) fn invalidate(&mut self, window: WindowId, region: Rect) {
        self.renderer.invalidate(window, region);
    }

    pub(crate) fn now_buttons(&self, pointer: PointerIndex) -> PointerButtons {
        self.pressed.get(&pointer).copied().unwrap_or_default()
    }
}

/// Capability surface handed to widget callbacks.
///
/// Tree and window mutation is allowed mid-dispatch; interaction state is
/// readable but only changed by returning a [`Reply`], which the dispatch
/// loop applies.
pub struct EventCx<'a> {
    pub(crate) ctx: &'a mut InteractionContext,
}

impl EventCx<'_> {
    pub fn insert_child(
        &mut self,
        parent: WidgetId,
        widget: impl Widget + 'static,
    ) -> Result<WidgetId, Error> {
        self.ctx.insert_child(parent, widget)
    }

    pub fn remove_widget(&mut self, id: WidgetId) -> Result<(), Error> {
        self.ctx.remove_widget(id)
    }

    pub fn arrange(&mut self, id: WidgetId, rect: Rect) -> Result<(), Error> {
        self.ctx.arrange(id, rect)
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<(), Error> {
        self.ctx.set_enabled(id, enabled)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), Error> {
        self.ctx.set_visible(id, visible)
    }

    /// Open a popup window on the menu chain (submenus, context menus).
    pub fn open_menu(&mut self, rect: Rect, parent: WindowId) -> Result<WindowId, Error> {
        self.ctx.open_menu(rect, parent)
    }

    pub fn close_window(&mut self, window: WindowId) {
        self.ctx.close_window(window)
    }

    pub fn dismiss_menus_from(&mut self, level: usize) {
        self.ctx.dismiss_menus_from(level)
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.ctx.focused()
    }

    pub fn pointer_captor(&self, pointer: PointerIndex) -> Option<WidgetId> {
        self.ctx.pointer_captor(pointer)
    }

    pub fn is_drag_dropping(&self) -> bool {
        self.ctx.is_drag_dropping()
    }

    pub fn drag_payload(&self) -> Option<DragDropHandle> {
        self.ctx.drag_payload()
    }

    pub fn cursor_position(&self) -> Point {
        self.ctx.cursor_position()
    }

    pub fn widget_rect(&self, id: WidgetId) -> Option<Rect> {
        self.ctx.arena.rect(id)
    }

    pub fn window_of(&self, id: WidgetId) -> Option<WindowId> {
        self.ctx.arena.window_of(id)
    }

    pub fn config(&self) -> &InputConfig {
        self.ctx.config()
    }

    pub fn invalidate(&mut self, window: WindowId, region: Rect) {
        self.ctx.invalidate(window, region)
    }
}
