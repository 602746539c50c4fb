//! The typed events delivered to widgets.
//!
//! Raw platform input is translated (see [`crate::input`]) into
//! [`WidgetEvent`] values before dispatch; widgets never see platform types.

use educe::Educe;
use peniko::kurbo::Point;

use crate::drag::DragDropHandle;
use crate::gamepad::GamepadEvent;
use crate::keyboard::{CharEvent, KeyEvent};
use crate::pointer::PointerEvent;

/// Cursor shapes a widget or drag payload can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Text,
    Move,
    Grab,
    Grabbing,
    Crosshair,
    NotAllowed,
    EwResize,
    NsResize,
}

/// A drag-and-drop event: the pointer state plus the session payload.
#[derive(Educe, Clone)]
#[educe(Debug)]
pub struct DragEvent {
    pub pointer: PointerEvent,
    #[educe(Debug(ignore))]
    pub payload: DragDropHandle,
}

/// The tagged event delivered to [`Widget`](crate::widget::Widget)
/// callbacks.
///
/// Pointer positions are in virtual-desktop coordinates; a widget locates
/// them relative to itself using the arranged geometry passed alongside the
/// event.
#[derive(Educe, Clone)]
#[educe(Debug)]
pub enum WidgetEvent {
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerMove(PointerEvent),
    /// The pointer's path now includes this widget. Sent root-to-leaf.
    PointerEnter(PointerEvent),
    /// The pointer's path no longer includes this widget. Sent
    /// leaf-to-root.
    PointerLeave,
    Wheel(PointerEvent),
    Gesture(PointerEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    Char(CharEvent),
    /// Replaces `PointerEnter` while a drag-and-drop session is active.
    DragEnter(DragEvent),
    /// Replaces `PointerMove` while a drag-and-drop session is active.
    DragOver(DragEvent),
    /// Replaces `PointerLeave` while a drag-and-drop session is active.
    DragLeave(DragEvent),
    /// Replaces `PointerUp` while a drag-and-drop session is active.
    Drop(DragEvent),
    GamepadButtonDown(GamepadEvent),
    GamepadButtonUp(GamepadEvent),
    GamepadAnalog(GamepadEvent),
}

impl WidgetEvent {
    /// The on-screen position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            WidgetEvent::PointerDown(e)
            | WidgetEvent::PointerUp(e)
            | WidgetEvent::PointerMove(e)
            | WidgetEvent::PointerEnter(e)
            | WidgetEvent::Wheel(e)
            | WidgetEvent::Gesture(e) => Some(e.position),
            WidgetEvent::DragEnter(e)
            | WidgetEvent::DragOver(e)
            | WidgetEvent::DragLeave(e)
            | WidgetEvent::Drop(e) => Some(e.pointer.position),
            WidgetEvent::PointerLeave
            | WidgetEvent::KeyDown(_)
            | WidgetEvent::KeyUp(_)
            | WidgetEvent::Char(_)
            | WidgetEvent::GamepadButtonDown(_)
            | WidgetEvent::GamepadButtonUp(_)
            | WidgetEvent::GamepadAnalog(_) => None,
        }
    }

    /// The pointer state carried by the event, if any.
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            WidgetEvent::PointerDown(e)
            | WidgetEvent::PointerUp(e)
            | WidgetEvent::PointerMove(e)
            | WidgetEvent::PointerEnter(e)
            | WidgetEvent::Wheel(e)
            | WidgetEvent::Gesture(e) => Some(e),
            WidgetEvent::DragEnter(e)
            | WidgetEvent::DragOver(e)
            | WidgetEvent::DragLeave(e)
            | WidgetEvent::Drop(e) => Some(&e.pointer),
            _ => None,
        }
    }

    /// A short name for logging and test assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetEvent::PointerDown(_) => "pointer_down",
            WidgetEvent::PointerUp(_) => "pointer_up",
            WidgetEvent::PointerMove(_) => "pointer_move",
            WidgetEvent::PointerEnter(_) => "pointer_enter",
            WidgetEvent::PointerLeave => "pointer_leave",
            WidgetEvent::Wheel(_) => "wheel",
            WidgetEvent::Gesture(_) => "gesture",
            WidgetEvent::KeyDown(_) => "key_down",
            WidgetEvent::KeyUp(_) => "key_up",
            WidgetEvent::Char(_) => "char",
            WidgetEvent::DragEnter(_) => "drag_enter",
            WidgetEvent::DragOver(_) => "drag_over",
            WidgetEvent::DragLeave(_) => "drag_leave",
            WidgetEvent::Drop(_) => "drop",
            WidgetEvent::GamepadButtonDown(_) => "gamepad_button_down",
            WidgetEvent::GamepadButtonUp(_) => "gamepad_button_up",
            WidgetEvent::GamepadAnalog(_) => "gamepad_analog",
        }
    }
}
