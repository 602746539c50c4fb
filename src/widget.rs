//! The widget capability surface and the arena that owns the live tree.
//!
//! Widgets are trait objects stored behind `Rc<RefCell<..>>` in a slotmap
//! arena: the slotmap key doubles as a generation-checked weak reference, so
//! a [`WidgetId`] held across frames (in a capture entry, the focus path, a
//! hover set) can always be checked for staleness with
//! [`WidgetArena::contains`] instead of risking a dangling pointer.
//!
//! The arena stores only what routing needs: the parent/child tree, the
//! owning window, and the arranged screen rect for the current frame.
//! Layout itself is the embedder's business; it reports results through
//! [`WidgetArena::arrange`].

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use peniko::kurbo::{Rect, Size};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::context::EventCx;
use crate::error::Error;
use crate::event::{Cursor, WidgetEvent};
use crate::focus::FocusCause;
use crate::path::ArrangedWidget;
use crate::pointer::PointerEvent;
use crate::reply::Reply;
use crate::window::WindowId;

new_key_type! {
    /// Stable, generation-checked handle to a widget in the arena.
    pub struct WidgetId;
}

/// Tooltip content offered by a widget.
///
/// The size is part of the offer because this crate performs no layout; a
/// widget that cannot measure its text can leave it zero and the controller
/// falls back to the configured default.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub size: Size,
}

impl Tooltip {
    pub fn new(text: impl Into<String>, size: Size) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }
}

/// The callback contract between the dispatch loop and a widget.
///
/// Every method has a do-nothing default, so implementations override only
/// the capabilities they have. The two event callbacks receive the widget's
/// own arranged geometry (`this`) alongside the event; positions in the
/// event are virtual-desktop coordinates, so `event position - this.rect
/// origin` gives the local position.
///
/// Handlers run inside the dispatch loop. They may mutate the tree through
/// [`EventCx`], but interaction state (capture, focus, drags) is changed only
/// by returning the corresponding [`Reply`]; the loop applies it.
pub trait Widget {
    fn debug_name(&self) -> Cow<'static, str> {
        core::any::type_name::<Self>().into()
    }

    /// Tunnel-phase callback, called root-to-leaf before [`Widget::event`].
    fn preview_event(
        &mut self,
        _cx: &mut EventCx,
        _this: &ArrangedWidget,
        _event: &WidgetEvent,
    ) -> Reply {
        Reply::unhandled()
    }

    /// Bubble-phase callback, called leaf-to-root until a handled reply.
    fn event(&mut self, _cx: &mut EventCx, _this: &ArrangedWidget, _event: &WidgetEvent) -> Reply {
        Reply::unhandled()
    }

    /// Whether the widget can hold keyboard focus.
    fn supports_focus(&self) -> bool {
        false
    }

    /// Tooltip content to show after the hover dwell, if any.
    fn tooltip(&self) -> Option<Tooltip> {
        None
    }

    /// When true, this widget's arranged rect repels tooltips spawned by
    /// descendants (used to keep tooltips off popup menus it anchors).
    fn tooltip_force_field(&self) -> bool {
        false
    }

    /// Cursor to show while this widget is the hot leaf, if any.
    fn cursor(&self) -> Option<Cursor> {
        None
    }

    /// Called on the new focus leaf; its reply is processed like any other.
    fn focus_received(&mut self, _cx: &mut EventCx, _cause: FocusCause) -> Reply {
        Reply::unhandled()
    }

    /// Called on the old focus leaf when focus moves away or is cleared.
    fn focus_lost(&mut self, _cx: &mut EventCx, _cause: FocusCause) {}

    /// Broadcast to every widget on the old and new focus paths before a
    /// transfer.
    fn focus_changing(&mut self, _old: Option<WidgetId>, _new: Option<WidgetId>) {}

    /// Called when this widget loses pointer capture, for any reason.
    fn capture_lost(&mut self, _cx: &mut EventCx) {}

    /// Called when the tooltip this widget provided is dismissed.
    fn tooltip_closed(&mut self) {}

    /// Called once when a pending drag-detect request on this widget
    /// crosses the distance threshold. The same move is not also delivered
    /// as `PointerMove`.
    fn drag_detected(
        &mut self,
        _cx: &mut EventCx,
        _this: &ArrangedWidget,
        _event: &PointerEvent,
    ) -> Reply {
        Reply::unhandled()
    }
}

pub(crate) type WidgetRc = Rc<RefCell<dyn Widget>>;

/// Per-widget bookkeeping kept outside the trait object.
#[derive(Debug)]
pub(crate) struct WidgetState {
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) window: WindowId,
    /// Arranged screen rect for the current frame, virtual-desktop coords.
    pub(crate) rect: Rect,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
}

/// Arena storage for the live widget tree.
pub struct WidgetArena {
    widgets: SlotMap<WidgetId, WidgetRc>,
    state: SecondaryMap<WidgetId, WidgetState>,
}

impl Default for WidgetArena {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetArena {
    pub fn new() -> Self {
        Self {
            widgets: SlotMap::with_key(),
            state: SecondaryMap::new(),
        }
    }

    /// Insert a widget under `parent`, or as a detached root candidate for
    /// `window` when `parent` is `None`. Root registration on the window
    /// itself is handled by the context.
    pub(crate) fn insert(
        &mut self,
        window: WindowId,
        parent: Option<WidgetId>,
        widget: impl Widget + 'static,
    ) -> Result<WidgetId, Error> {
        if let Some(parent) = parent {
            let parent_state = self.state.get(parent).ok_or(Error::UnknownWidget)?;
            if parent_state.window != window {
                return Err(Error::CrossWindowParent);
            }
        }
        let id = self.widgets.insert(Rc::new(RefCell::new(widget)));
        self.state.insert(
            id,
            WidgetState {
                parent,
                children: Vec::new(),
                window,
                rect: Rect::ZERO,
                enabled: true,
                visible: true,
            },
        );
        if let Some(parent) = parent {
            self.state[parent].children.push(id);
        }
        Ok(id)
    }

    /// Remove `id` and its subtree. Returns the removed ids (parents before
    /// children) so callers can scrub auxiliary maps.
    pub(crate) fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        let mut removed = Vec::new();
        if !self.widgets.contains_key(id) {
            return removed;
        }
        if let Some(parent) = self.state[id].parent {
            if let Some(parent_state) = self.state.get_mut(parent) {
                parent_state.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(state) = self.state.remove(next) {
                stack.extend(state.children);
            }
            self.widgets.remove(next);
            removed.push(next);
        }
        removed
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub(crate) fn widget(&self, id: WidgetId) -> Option<WidgetRc> {
        self.widgets.get(id).cloned()
    }

    pub(crate) fn state(&self, id: WidgetId) -> Option<&WidgetState> {
        self.state.get(id)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.state.get(id).and_then(|s| s.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.state.get(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn window_of(&self, id: WidgetId) -> Option<WindowId> {
        self.state.get(id).map(|s| s.window)
    }

    /// The widget's arranged screen rect for this frame.
    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.state.get(id).map(|s| s.rect)
    }

    /// Record the widget's screen rect for this frame.
    pub(crate) fn arrange(&mut self, id: WidgetId, rect: Rect) -> Result<(), Error> {
        let state = self.state.get_mut(id).ok_or(Error::UnknownWidget)?;
        state.rect = rect;
        Ok(())
    }

    pub(crate) fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<(), Error> {
        let state = self.state.get_mut(id).ok_or(Error::UnknownWidget)?;
        state.enabled = enabled;
        Ok(())
    }

    pub(crate) fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), Error> {
        let state = self.state.get_mut(id).ok_or(Error::UnknownWidget)?;
        state.visible = visible;
        Ok(())
    }

    pub fn is_enabled(&self, id: WidgetId) -> bool {
        self.state.get(id).map(|s| s.enabled).unwrap_or(false)
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.state.get(id).map(|s| s.visible).unwrap_or(false)
    }

    /// Root-to-`id` handle chain following parent links, or `None` if `id`
    /// is dead.
    pub(crate) fn chain_from_root(&self, id: WidgetId) -> Option<Vec<WidgetId>> {
        if !self.contains(id) {
            return None;
        }
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if !self.contains(parent) {
                return None;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        Some(chain)
    }

    /// Best-effort widget name for logging, safe to call mid-dispatch.
    pub(crate) fn name(&self, id: WidgetId) -> Cow<'static, str> {
        match self.widgets.get(id).and_then(|w| w.try_borrow().ok().map(|w| w.debug_name())) {
            Some(name) => name,
            None => "<borrowed>".into(),
        }
    }
}
