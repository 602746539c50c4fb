//! Per-event routing state machines.
//!
//! Each public method here takes one translated event, resolves its target
//! path (capture first, hit-test otherwise), walks the path in the order
//! that event calls for, and hands every returned [`Reply`] to
//! [`InteractionContext::process_reply`] before the next widget runs.
//!
//! Pass shapes:
//! * pointer down/up/move and key events: preview root-to-leaf, then the
//!   main callback leaf-to-root; a handled preview suppresses the bubble.
//! * wheel and gestures: bubble only, gesture tried before wheel on each
//!   widget.
//! * enter/leave (and their drag equivalents): notifications, replies
//!   ignored.
//! * captured streams: the captor alone sees the event.

use std::time::Instant;

use peniko::kurbo::{Point, Rect};

use crate::capture::CaptureResolution;
use crate::context::InteractionContext;
use crate::event::{Cursor, DragEvent, WidgetEvent};
use crate::focus::FocusCause;
use crate::gamepad::{GamepadEvent, GamepadUser};
use crate::keyboard::{CharEvent, Key, KeyEvent, Modifiers, NamedKey};
use crate::path::{PathResolution, WidgetPath};
use crate::pointer::{PointerEvent, PointerIndex};
use crate::tooltip::{TooltipOffer, TooltipTick};
use crate::widget::WidgetId;
use crate::window::WindowKind;

impl InteractionContext {
    // ---- pointer ----------------------------------------------------------

    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        self.modifiers = event.modifiers;
        self.note_pointer_position(&event);
        if let Some(button) = event.button {
            self.pressed.entry(event.pointer).or_default().press(button);
        }
        self.close_tooltip();
        // A press outside the open menu chain dismisses it before routing,
        // so the click lands on whatever the menus covered.
        self.dismiss_menus_outside(event.position);

        self.focus_moved_in_dispatch = false;
        let captor = self.captor_path(event.pointer);
        let captured = captor.is_some();
        let path = match captor {
            Some(path) => path,
            None => self.path_under_point(event.position, false),
        };

        let widget_event = WidgetEvent::PointerDown(event.clone());
        let handled = if captured {
            self.route_to_captor(&path, &widget_event, Some(&event))
        } else {
            self.route_event(&path, &widget_event, Some(&event))
        };

        // Focus falls to the leafmost focusable widget under the press
        // unless a handler already moved it.
        if !captured && !self.focus_moved_in_dispatch {
            self.set_focus_to_path(&path, FocusCause::Pointer);
        }
        handled
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        self.modifiers = event.modifiers;
        self.note_pointer_position(&event);
        if let Some(button) = event.button {
            if let Some(held) = self.pressed.get_mut(&event.pointer) {
                held.release(button);
            }
            // A press that never crossed the threshold stops detecting.
            self.detector.cancel_for(event.pointer, button);
        }

        let captor = self.captor_path(event.pointer);
        let path = match &captor {
            Some(path) => path.clone(),
            None => self.path_under_point(event.position, false),
        };

        let dropping = self
            .drag_drop
            .as_ref()
            .map(|s| s.pointer == event.pointer)
            .unwrap_or(false);
        let handled = if dropping {
            self.finish_drag_drop(&path, &event)
        } else if captor.is_some() {
            self.route_to_captor(&path, &WidgetEvent::PointerUp(event.clone()), Some(&event))
        } else {
            self.route_event(&path, &WidgetEvent::PointerUp(event.clone()), Some(&event))
        };

        // Once the last button comes up the pointer cannot stay captured,
        // and input throttling resumes.
        if self.now_buttons(event.pointer).is_empty() {
            self.release_pointer_capture(event.pointer);
            self.prevent_throttling = false;
        }

        // A lifted touch stream disappears: flush its hover state.
        if !event.pointer.is_cursor() && self.now_buttons(event.pointer).is_empty() {
            let last = self.resolve_last_under(event.pointer);
            for index in (0..last.len()).rev() {
                let Some(arranged) = last.get(index).copied() else {
                    continue;
                };
                self.notify(&arranged, &WidgetEvent::PointerLeave);
            }
            self.last_under.remove(&event.pointer);
            self.pointer_positions.remove(&event.pointer);
            self.pressed.remove(&event.pointer);
        }
        handled
    }

    /// The drop leg of pointer-up. The session ends before the drop is
    /// dispatched so a handler can immediately start a new drag.
    fn finish_drag_drop(&mut self, path: &WidgetPath, event: &PointerEvent) -> bool {
        let Some(session) = self.drag_drop.take() else {
            return false;
        };
        let drag_event = DragEvent {
            pointer: event.clone(),
            payload: session.payload.clone(),
        };
        let handled = self.route_bubble(path, &[WidgetEvent::Drop(drag_event)], Some(event));
        if let Ok(mut payload) = session.payload.try_borrow_mut() {
            payload.on_drop(handled, event);
        }
        log::debug!(
            target: "wicket::drag",
            "drag-and-drop session dropped (handled: {handled})",
        );
        handled
    }

    pub fn pointer_move(&mut self, event: PointerEvent, now: Instant) -> bool {
        self.modifiers = event.modifiers;
        let mut event = event;
        // Cursor lock clamps motion to the locked widget's bounds.
        if event.pointer.is_cursor() {
            if let Some(rect) = self.cursor_lock_rect() {
                event.position = Point::new(
                    event.position.x.clamp(rect.x0, rect.x1),
                    event.position.y.clamp(rect.y0, rect.y1),
                );
                event.delta = event.position - event.last_position;
            }
        }
        self.note_pointer_position(&event);

        let dragging = self
            .drag_drop
            .as_ref()
            .map(|s| s.pointer == event.pointer)
            .unwrap_or(false);

        if !event.synthetic && !dragging && self.high_precision.is_none() {
            self.refresh_tooltip_source(event.position, now);
        }

        // Crossing the drag threshold turns this move into a drag start:
        // no enter/leave, no move delivery, and the press path stands in
        // for the hover path so the following leave pass is right.
        if !event.synthetic {
            if let Some(request) = self.detector.triggered(
                event.pointer,
                event.position,
                self.config.drag_threshold,
            ) {
                if let PathResolution::Full(candidate) = request.path.resolve(&self.arena) {
                    if let Some(leaf) = candidate.leaf().copied() {
                        log::debug!(
                            target: "wicket::drag",
                            "drag detected on {}",
                            self.arena.name(leaf.widget),
                        );
                        self.last_under.insert(event.pointer, candidate.to_weak());
                        if let Some(reply) =
                            self.call_widget(leaf.widget, |w, cx| w.drag_detected(cx, &leaf, &event))
                        {
                            self.process_reply(reply, &candidate, Some(&event));
                        }
                        if event.pointer.is_cursor() {
                            self.refresh_cursor();
                        }
                        return true;
                    }
                }
                // Stale request: the candidate died since arming. Fall
                // through to an ordinary move.
            }
        }

        let captor = self.captor_path(event.pointer);
        let under = match &captor {
            Some(path) => path.clone(),
            None => self.path_under_point(event.position, false),
        };

        self.diff_hover(&under, &event, dragging);

        let handled = if dragging {
            let payload = self.drag_drop.as_ref().map(|s| s.payload.clone());
            if let Some(payload) = &payload {
                if let Ok(mut payload) = payload.try_borrow_mut() {
                    payload.on_dragged(&event);
                }
            }
            match payload {
                Some(payload) => {
                    let drag_event = DragEvent {
                        pointer: event.clone(),
                        payload,
                    };
                    self.route_bubble(&under, &[WidgetEvent::DragOver(drag_event)], Some(&event))
                }
                None => false,
            }
        } else if captor.is_some() {
            // Synthetic moves refresh hover but are not real motion; the
            // captor only hears about the latter.
            if event.synthetic {
                false
            } else {
                self.route_to_captor(&under, &WidgetEvent::PointerMove(event.clone()), Some(&event))
            }
        } else {
            self.route_event(&under, &WidgetEvent::PointerMove(event.clone()), Some(&event))
        };

        if event.pointer.is_cursor() && !event.synthetic {
            self.refresh_cursor();
        }
        handled
    }

    /// Enter/leave diffing for one pointer: leave the old path leaf-to-root,
    /// enter the new path root-to-leaf, then store the new path. During a
    /// drag-and-drop session the drag equivalents are sent instead.
    fn diff_hover(&mut self, under: &WidgetPath, event: &PointerEvent, dragging: bool) {
        let last = self.resolve_last_under(event.pointer);
        let payload = self.drag_drop.as_ref().map(|s| s.payload.clone());
        let drag_event = payload.map(|payload| DragEvent {
            pointer: event.clone(),
            payload,
        });
        for index in (0..last.len()).rev() {
            let Some(arranged) = last.get(index).copied() else {
                continue;
            };
            if under.contains(arranged.widget) {
                continue;
            }
            match (dragging, &drag_event) {
                (true, Some(drag)) => {
                    self.notify(&arranged, &WidgetEvent::DragLeave(drag.clone()))
                }
                _ => self.notify(&arranged, &WidgetEvent::PointerLeave),
            }
        }
        for index in 0..under.len() {
            let Some(arranged) = under.get(index).copied() else {
                continue;
            };
            if last.contains(arranged.widget) {
                continue;
            }
            match (dragging, &drag_event) {
                (true, Some(drag)) => {
                    self.notify(&arranged, &WidgetEvent::DragEnter(drag.clone()))
                }
                _ => self.notify(&arranged, &WidgetEvent::PointerEnter(event.clone())),
            }
        }
        self.last_under.insert(event.pointer, under.to_weak());
    }

    /// Wheel and high-level gesture input share one entry point; when an
    /// event carries both, each widget sees the gesture first.
    pub fn wheel_or_gesture(&mut self, event: PointerEvent) -> bool {
        self.modifiers = event.modifiers;
        let mut kinds: Vec<WidgetEvent> = Vec::with_capacity(2);
        if event.gesture.is_some() {
            kinds.push(WidgetEvent::Gesture(event.clone()));
        }
        if event.wheel.is_some() {
            kinds.push(WidgetEvent::Wheel(event.clone()));
        }
        if kinds.is_empty() {
            return false;
        }

        let captor = self.captor_path(event.pointer);
        let captured = captor.is_some();
        let path = match captor {
            Some(path) => path,
            None => self.path_under_point(event.position, false),
        };
        if captured {
            let Some(arranged) = path.leaf().copied() else {
                return false;
            };
            if !self.arena.is_enabled(arranged.widget) {
                return false;
            }
            for kind in &kinds {
                let Some(reply) =
                    self.call_widget(arranged.widget, |w, cx| w.event(cx, &arranged, kind))
                else {
                    continue;
                };
                let handled = reply.is_handled();
                self.process_reply(reply, &path, Some(&event));
                if handled {
                    return true;
                }
            }
            false
        } else {
            self.route_bubble(&path, &kinds, Some(&event))
        }
    }

    // ---- keyboard ---------------------------------------------------------

    pub fn key_down(&mut self, event: KeyEvent) -> bool {
        self.modifiers = event.modifiers;
        // Escape cancels an active drag before anything else sees it.
        if matches!(event.key, Key::Named(NamedKey::Escape)) && self.drag_drop.is_some() {
            self.cancel_drag_drop();
            return true;
        }

        self.focus_moved_in_dispatch = false;
        let path = self.focus_path();
        let handled = self.route_event(&path, &WidgetEvent::KeyDown(event.clone()), None);

        // Unhandled Tab walks focus in traversal order.
        if !handled
            && !self.focus_moved_in_dispatch
            && matches!(event.key, Key::Named(NamedKey::Tab))
        {
            return self.focus_next(event.modifiers.contains(Modifiers::SHIFT));
        }
        handled
    }

    pub fn key_up(&mut self, event: KeyEvent) -> bool {
        self.modifiers = event.modifiers;
        let path = self.focus_path();
        self.route_event(&path, &WidgetEvent::KeyUp(event), None)
    }

    pub fn char_input(&mut self, event: CharEvent) -> bool {
        let path = self.focus_path();
        self.route_event(&path, &WidgetEvent::Char(event), None)
    }

    /// Live prefix of the focus path, re-anchoring focus first if tree
    /// surgery invalidated part of it.
    fn focus_path(&mut self) -> WidgetPath {
        self.repair_focus();
        self.focus
            .path()
            .map(|weak| weak.resolve(&self.arena).into_path())
            .unwrap_or_else(WidgetPath::empty)
    }

    // ---- gamepad ----------------------------------------------------------

    pub fn gamepad_button_down(&mut self, event: GamepadEvent) -> bool {
        let user = event.user;
        self.route_gamepad(WidgetEvent::GamepadButtonDown(event), user)
    }

    pub fn gamepad_button_up(&mut self, event: GamepadEvent) -> bool {
        let user = event.user;
        self.route_gamepad(WidgetEvent::GamepadButtonUp(event), user)
    }

    pub fn gamepad_analog(&mut self, event: GamepadEvent) -> bool {
        let user = event.user;
        self.route_gamepad(WidgetEvent::GamepadAnalog(event), user)
    }

    /// Gamepad input is captor-only: the user's captor leaf sees it, no
    /// bubbling, and uncaptured input is dropped.
    fn route_gamepad(&mut self, event: WidgetEvent, user: GamepadUser) -> bool {
        let path = match self.captures.resolve_gamepad(&self.arena, user) {
            CaptureResolution::Live(path) => path,
            CaptureResolution::Invalidated(leaf) => {
                if let Some(leaf) = leaf {
                    self.notify_capture_lost(leaf);
                }
                return false;
            }
            CaptureResolution::None => {
                log::trace!(
                    target: "wicket::dispatch",
                    "dropping {} for uncaptured {user:?}",
                    event.kind(),
                );
                return false;
            }
        };
        let Some(arranged) = path.leaf().copied() else {
            return false;
        };
        if !self.arena.is_enabled(arranged.widget) {
            return false;
        }
        let Some(reply) = self.call_widget(arranged.widget, |w, cx| w.event(cx, &arranged, &event))
        else {
            return false;
        };
        let handled = reply.is_handled();
        self.process_reply(reply, &path, None);
        handled
    }

    // ---- frame tick -------------------------------------------------------

    /// Once-per-frame housekeeping: synthesize a cursor move so hover
    /// tracks geometry changes under a stationary cursor, advance the
    /// tooltip state machine, and refresh the cursor shape.
    pub fn tick(&mut self, now: Instant) {
        if self.app_active() {
            let synthetic = self.synth_pointer_event(PointerIndex::CURSOR, self.cursor_pos);
            self.pointer_move(synthetic, now);
        }

        let work_area = self.windows.work_area();
        match self.tooltip.tick(self.cursor_pos, now, &self.config, work_area) {
            TooltipTick::Idle => {}
            TooltipTick::Open { rect } => {
                if let Ok(window) = self.windows.open(rect, WindowKind::Tooltip, None) {
                    self.tooltip.opened(window, now);
                    log::debug!(target: "wicket::tooltip", "tooltip window {window:?} opened");
                }
            }
            TooltipTick::Move { window, rect } => {
                if let Some(record) = self.windows.get_mut(window) {
                    record.rect = rect;
                }
                self.invalidate(window, rect);
            }
        }

        self.refresh_cursor();
    }

    // ---- tooltip sourcing -------------------------------------------------

    /// Re-hit-test under the cursor (disabled widgets included, so a tip
    /// can explain why something is greyed out) and feed the leafmost
    /// tooltip offer to the controller.
    fn refresh_tooltip_source(&mut self, position: Point, now: Instant) {
        let path = self.path_under_point(position, true);
        let mut found = None;
        for index in (0..path.len()).rev() {
            let Some(arranged) = path.get(index).copied() else {
                continue;
            };
            let Some(rc) = self.arena.widget(arranged.widget) else {
                continue;
            };
            let Ok(widget) = rc.try_borrow() else {
                continue;
            };
            if let Some(content) = widget.tooltip() {
                found = Some((arranged.widget, content));
                break;
            }
        }
        let offer = found.map(|(source, content)| TooltipOffer {
            source,
            content,
            force_field: self.tooltip_force_field(&path, source),
        });
        if let Some(closed) = self.tooltip.update_source(offer, now) {
            self.finish_tooltip_close(closed);
        }
    }

    /// Region the tooltip must stay out of: ancestors of `source` that ask
    /// for a force field, plus any open menus stacked above the hovered
    /// window's level.
    fn tooltip_force_field(&self, path: &WidgetPath, source: WidgetId) -> Option<Rect> {
        let mut field: Option<Rect> = None;
        let mut grow = |rect: Rect| {
            field = Some(match field {
                Some(existing) => existing.union(rect),
                None => rect,
            });
        };
        for arranged in path.iter() {
            if let Some(rc) = self.arena.widget(arranged.widget) {
                if let Ok(widget) = rc.try_borrow() {
                    if widget.tooltip_force_field() {
                        grow(arranged.rect);
                    }
                }
            }
            if arranged.widget == source {
                break;
            }
        }
        let above = self
            .menus
            .level_of(path.window)
            .map(|level| level + 1)
            .unwrap_or(0);
        for &menu in self.menus.levels().iter().skip(above) {
            if let Some(record) = self.windows.get(menu) {
                grow(record.rect());
            }
        }
        field
    }

    // ---- cursor shape -----------------------------------------------------

    pub(crate) fn refresh_cursor(&mut self) {
        self.current_cursor = self.query_cursor();
    }

    fn query_cursor(&self) -> Cursor {
        // A drag payload's override wins while a session is active.
        if let Some(session) = &self.drag_drop {
            if let Ok(payload) = session.payload.try_borrow() {
                if let Some(cursor) = payload.cursor() {
                    return cursor;
                }
            }
        }
        if let Some(captor) = self.captures.captor(PointerIndex::CURSOR) {
            return self.widget_cursor(captor).unwrap_or_default();
        }
        let path = self.path_under_point(self.cursor_pos, false);
        for arranged in path.iter().rev() {
            if let Some(cursor) = self.widget_cursor(arranged.widget) {
                return cursor;
            }
        }
        Cursor::Default
    }

    fn widget_cursor(&self, id: WidgetId) -> Option<Cursor> {
        self.arena
            .widget(id)
            .and_then(|rc| rc.try_borrow().ok().and_then(|w| w.cursor()))
    }

    // ---- routing primitives -----------------------------------------------

    fn note_pointer_position(&mut self, event: &PointerEvent) {
        self.pointer_positions.insert(event.pointer, event.position);
        if event.pointer.is_cursor() {
            self.cursor_pos = event.position;
        }
    }

    /// Resolve `pointer`'s captor to a live path; a dead stored path drops
    /// the capture (with notification) and reports no captor.
    fn captor_path(&mut self, pointer: PointerIndex) -> Option<WidgetPath> {
        match self.captures.resolve(&self.arena, pointer) {
            CaptureResolution::Live(path) => Some(path),
            CaptureResolution::Invalidated(leaf) => {
                if let Some(leaf) = leaf {
                    self.notify_capture_lost(leaf);
                }
                if pointer.is_cursor() {
                    self.cursor_lock = None;
                    self.high_precision = None;
                }
                None
            }
            CaptureResolution::None => None,
        }
    }

    /// Tunnel a preview pass root-to-leaf, then bubble the main pass
    /// leaf-to-root. A handled preview stops the descent and suppresses
    /// the bubble pass; a handled bubble stops the climb.
    pub(crate) fn route_event(
        &mut self,
        path: &WidgetPath,
        event: &WidgetEvent,
        pointer: Option<&PointerEvent>,
    ) -> bool {
        for index in 0..path.len() {
            let Some(arranged) = path.get(index).copied() else {
                continue;
            };
            if !self.arena.is_enabled(arranged.widget) {
                continue;
            }
            let Some(reply) =
                self.call_widget(arranged.widget, |w, cx| w.preview_event(cx, &arranged, event))
            else {
                continue;
            };
            let handled = reply.is_handled();
            self.process_reply(reply, path, pointer);
            if handled {
                log::trace!(
                    target: "wicket::dispatch",
                    "{} handled {} in preview",
                    self.arena.name(arranged.widget),
                    event.kind(),
                );
                return true;
            }
        }
        self.route_bubble(path, std::slice::from_ref(event), pointer)
    }

    /// Bubble-only pass. With several event kinds, each widget sees all of
    /// them in order before the walk moves up.
    pub(crate) fn route_bubble(
        &mut self,
        path: &WidgetPath,
        events: &[WidgetEvent],
        pointer: Option<&PointerEvent>,
    ) -> bool {
        for index in (0..path.len()).rev() {
            let Some(arranged) = path.get(index).copied() else {
                continue;
            };
            if !self.arena.is_enabled(arranged.widget) {
                continue;
            }
            for event in events {
                let Some(reply) =
                    self.call_widget(arranged.widget, |w, cx| w.event(cx, &arranged, event))
                else {
                    continue;
                };
                let handled = reply.is_handled();
                self.process_reply(reply, path, pointer);
                if handled {
                    log::trace!(
                        target: "wicket::dispatch",
                        "{} handled {}",
                        self.arena.name(arranged.widget),
                        event.kind(),
                    );
                    return true;
                }
            }
        }
        false
    }

    /// Captured delivery: the leaf alone gets preview then the main
    /// callback.
    fn route_to_captor(
        &mut self,
        path: &WidgetPath,
        event: &WidgetEvent,
        pointer: Option<&PointerEvent>,
    ) -> bool {
        let Some(arranged) = path.leaf().copied() else {
            return false;
        };
        if !self.arena.is_enabled(arranged.widget) {
            return false;
        }
        let mut handled = false;
        if let Some(reply) =
            self.call_widget(arranged.widget, |w, cx| w.preview_event(cx, &arranged, event))
        {
            handled = reply.is_handled();
            self.process_reply(reply, path, pointer);
        }
        if !handled {
            if let Some(reply) =
                self.call_widget(arranged.widget, |w, cx| w.event(cx, &arranged, event))
            {
                handled = reply.is_handled();
                self.process_reply(reply, path, pointer);
            }
        }
        handled
    }
}
