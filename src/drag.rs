//! Drag detection and drag-and-drop sessions.
//!
//! Detection and dragging are separate machines. The detector holds at most
//! one armed request (candidate path, button, press position) and converts
//! it into a drag-detected callback once the pointer travels past the
//! configured threshold; the session exists only after a widget answers
//! that callback (or any event) by beginning a drag-and-drop, and rewrites
//! pointer routing until drop or cancel.

use std::cell::RefCell;
use std::rc::Rc;

use peniko::kurbo::Point;

use crate::event::Cursor;
use crate::path::{WeakWidgetPath, WidgetPath};
use crate::pointer::{PointerButton, PointerEvent, PointerIndex};

/// Payload carried by a drag-and-drop session.
///
/// The handle is shared between the session, the initiating widget, and
/// every drop target that inspects it through a drag event.
pub trait DragDropPayload {
    /// Called on every pointer move while the session is active, so the
    /// payload can reposition its visual proxy.
    fn on_dragged(&mut self, _event: &PointerEvent) {}

    /// Called once, after the drop or cancel has been dispatched.
    /// `handled` says whether a widget accepted the drop.
    fn on_drop(&mut self, _handled: bool, _event: &PointerEvent) {}

    /// Cursor to show while dragging. Queried every tick, not just on
    /// moves, so it can track modifier state recorded on the payload.
    fn cursor(&self) -> Option<Cursor> {
        None
    }
}

pub type DragDropHandle = Rc<RefCell<dyn DragDropPayload>>;

/// An active drag-and-drop session.
pub(crate) struct DragDropSession {
    pub(crate) payload: DragDropHandle,
    /// The pointer stream driving the session.
    pub(crate) pointer: PointerIndex,
}

/// One armed drag-detect request.
#[derive(Debug, Clone)]
pub(crate) struct DragDetectRequest {
    pub(crate) path: WeakWidgetPath,
    pub(crate) pointer: PointerIndex,
    pub(crate) button: PointerButton,
    pub(crate) start: Point,
}

/// Holds the pending drag-detect request, if any. Arming replaces whatever
/// was pending; there is never more than one candidate.
#[derive(Default)]
pub(crate) struct DragDetector {
    pending: Option<DragDetectRequest>,
}

impl DragDetector {
    pub(crate) fn arm(
        &mut self,
        path: &WidgetPath,
        pointer: PointerIndex,
        button: PointerButton,
        start: Point,
    ) {
        self.pending = Some(DragDetectRequest {
            path: path.to_weak(),
            pointer,
            button,
            start,
        });
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn pending(&self) -> Option<&DragDetectRequest> {
        self.pending.as_ref()
    }

    /// Consume the request if `pointer` has moved past `threshold` from the
    /// press position.
    pub(crate) fn triggered(
        &mut self,
        pointer: PointerIndex,
        position: Point,
        threshold: f64,
    ) -> Option<DragDetectRequest> {
        let pending = self.pending.as_ref()?;
        if pending.pointer != pointer {
            return None;
        }
        ((position - pending.start).hypot() > threshold)
            .then(|| self.pending.take())
            .flatten()
    }

    /// Cancel the request when its triggering button was released before
    /// the threshold. Returns the cancelled request.
    pub(crate) fn cancel_for(
        &mut self,
        pointer: PointerIndex,
        button: PointerButton,
    ) -> Option<DragDetectRequest> {
        let pending = self.pending.as_ref()?;
        (pending.pointer == pointer && pending.button == button)
            .then(|| self.pending.take())
            .flatten()
    }

    pub(crate) fn clear(&mut self) {
        self.pending = None;
    }
}
