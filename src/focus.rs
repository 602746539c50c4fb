//! Keyboard focus storage.
//!
//! The tracker remembers the focused widget as a weak path so that tree
//! mutations between events cannot leave a dangling target. Choosing a new
//! focus (scanning for a focusable leaf, delivering gained/lost
//! notifications) is orchestrated by
//! [`InteractionContext`](crate::context::InteractionContext); this module
//! only holds the state.

use crate::path::{WeakWidgetPath, WidgetPath};
use crate::widget::WidgetId;
use crate::window::WindowId;

/// Why focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCause {
    /// A pointer press landed on (or under) the widget.
    Pointer,
    /// Tab navigation or another key-driven move.
    Keyboard,
    /// The widget's window was activated and focus was restored into it.
    WindowActivate,
    /// The embedder or a widget asked for focus directly.
    Programmatic,
    /// The previous holder went away (widget removed, window closed) and
    /// focus was reassigned.
    OtherWidgetLostFocus,
}

#[derive(Default)]
pub struct FocusTracker {
    path: Option<WeakWidgetPath>,
    cause: Option<FocusCause>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused leaf, if any widget holds focus.
    pub fn focused(&self) -> Option<WidgetId> {
        self.path.as_ref().and_then(|p| p.leaf())
    }

    pub fn path(&self) -> Option<&WeakWidgetPath> {
        self.path.as_ref()
    }

    pub fn cause(&self) -> Option<FocusCause> {
        self.cause
    }

    pub fn window(&self) -> Option<WindowId> {
        self.path.as_ref().map(|p| p.window)
    }

    pub fn contains(&self, widget: WidgetId) -> bool {
        self.path.as_ref().is_some_and(|p| p.contains(widget))
    }

    pub(crate) fn set(&mut self, path: &WidgetPath, cause: FocusCause) {
        self.path = Some(path.to_weak());
        self.cause = Some(cause);
    }

    pub(crate) fn take(&mut self) -> Option<WeakWidgetPath> {
        self.cause = None;
        self.path.take()
    }
}
