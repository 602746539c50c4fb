//! The value every widget event callback returns.
//!
//! A [`Reply`] says whether the event was handled (which stops tunnel and
//! bubble passes) and carries any side effects the widget wants: capture,
//! focus, drag detection, drag-and-drop, cursor control. The dispatch loop
//! applies those effects immediately after the callback returns, before the
//! next widget in the pass sees anything.

use educe::Educe;
use peniko::kurbo::Point;

use crate::drag::DragDropHandle;
use crate::focus::FocusCause;
use crate::gamepad::GamepadUser;
use crate::pointer::PointerButton;
use crate::widget::WidgetId;

#[derive(Educe, Default)]
#[educe(Debug)]
pub struct Reply {
    pub(crate) handled: bool,
    pub(crate) capture_pointer: Option<WidgetId>,
    pub(crate) release_pointer: bool,
    pub(crate) capture_gamepad: Option<(GamepadUser, WidgetId)>,
    pub(crate) release_gamepad: Option<GamepadUser>,
    pub(crate) focus: Option<(WidgetId, FocusCause)>,
    pub(crate) clear_focus: bool,
    pub(crate) detect_drag: Option<(WidgetId, PointerButton)>,
    #[educe(Debug(ignore))]
    pub(crate) begin_drag_drop: Option<DragDropHandle>,
    pub(crate) end_drag_drop: bool,
    pub(crate) set_cursor_pos: Option<Point>,
    pub(crate) lock_cursor: Option<WidgetId>,
    pub(crate) unlock_cursor: bool,
    pub(crate) high_precision_mouse: Option<WidgetId>,
    pub(crate) prevent_throttling: bool,
}

impl Reply {
    /// The event was consumed; tunnel and bubble passes stop here.
    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    /// The event was not consumed; dispatch continues to the next widget.
    /// Side effects attached to an unhandled reply are still applied.
    pub fn unhandled() -> Self {
        Self::default()
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Route all further events from the event's pointer to `widget` until
    /// capture is released. Replaces any existing captor for that pointer.
    pub fn capture_pointer(mut self, widget: WidgetId) -> Self {
        self.capture_pointer = Some(widget);
        self
    }

    /// Release the captor of the event's pointer, if any.
    pub fn release_pointer_capture(mut self) -> Self {
        self.release_pointer = true;
        self
    }

    /// Route `user`'s gamepad events to `widget` until released. Gamepad
    /// events are only ever delivered to a captor.
    pub fn capture_gamepad(mut self, user: GamepadUser, widget: WidgetId) -> Self {
        self.capture_gamepad = Some((user, widget));
        self
    }

    pub fn release_gamepad_capture(mut self, user: GamepadUser) -> Self {
        self.release_gamepad = Some(user);
        self
    }

    /// Move keyboard focus to `widget`.
    pub fn set_focus(self, widget: WidgetId) -> Self {
        self.set_focus_as(widget, FocusCause::Programmatic)
    }

    /// Move keyboard focus to `widget`, recording why it moved.
    pub fn set_focus_as(mut self, widget: WidgetId, cause: FocusCause) -> Self {
        self.focus = Some((widget, cause));
        self
    }

    pub fn clear_focus(mut self) -> Self {
        self.clear_focus = true;
        self
    }

    /// Arm the drag detector: if the pointer moves past the drag threshold
    /// while `button` stays pressed, `widget` gets a drag-detected callback
    /// in place of that move.
    pub fn detect_drag(mut self, widget: WidgetId, button: PointerButton) -> Self {
        self.detect_drag = Some((widget, button));
        self
    }

    /// Start a drag-and-drop session carrying `payload`. Widgets under the
    /// pointer receive drag events instead of pointer enter/leave/move for
    /// the rest of the session.
    pub fn begin_drag_drop(mut self, payload: DragDropHandle) -> Self {
        self.begin_drag_drop = Some(payload);
        self
    }

    /// Cancel the drag-and-drop session in progress, if any.
    pub fn end_drag_drop(mut self) -> Self {
        self.end_drag_drop = true;
        self
    }

    /// Ask the embedder to warp the cursor to `position` (virtual-desktop
    /// coordinates).
    pub fn set_cursor_pos(mut self, position: Point) -> Self {
        self.set_cursor_pos = Some(position);
        self
    }

    /// Confine the cursor to `widget`'s arranged bounds until unlocked or
    /// capture ends.
    pub fn lock_cursor(mut self, widget: WidgetId) -> Self {
        self.lock_cursor = Some(widget);
        self
    }

    pub fn unlock_cursor(mut self) -> Self {
        self.unlock_cursor = true;
        self
    }

    /// Capture the pointer for `widget` and switch to raw, unaccelerated
    /// mouse deltas. Tooltips stay closed while this is active; releasing
    /// capture releases it.
    pub fn use_high_precision_mouse(mut self, widget: WidgetId) -> Self {
        self.high_precision_mouse = Some(widget);
        self
    }

    /// Hint the embedder not to throttle event delivery for the duration of
    /// the interaction (e.g. while scrubbing a slider).
    pub fn prevent_throttling(mut self) -> Self {
        self.prevent_throttling = true;
        self
    }
}
