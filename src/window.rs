//! Top-level window records and z-ordering on the virtual desktop.
//!
//! This crate does not create OS windows; a [`Window`] here is the routing
//! core's view of one: a rect on the virtual desktop, a root widget, a
//! popup-parent link, and the flags that gate input. The platform layer
//! mirrors real windows into these records.

use peniko::kurbo::{Point, Rect};
use slotmap::{SlotMap, new_key_type};

use crate::error::Error;
use crate::widget::WidgetId;

new_key_type! {
    /// Stable handle to a window record.
    pub struct WindowId;
}

/// What layer a window lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Normal,
    /// Transient popup tracked by the menu stack; dismissed on outside
    /// interaction.
    Menu,
    /// Spawned by the tooltip controller; never hit-tested, never
    /// activated.
    Tooltip,
}

#[derive(Debug)]
pub struct Window {
    pub(crate) rect: Rect,
    pub(crate) kind: WindowKind,
    pub(crate) parent: Option<WindowId>,
    /// Child popup windows, back-to-front.
    pub(crate) children: Vec<WindowId>,
    pub(crate) root: Option<WidgetId>,
    /// Embedder-controlled "should process input" gate.
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    /// Set when activation was redirected to this (modal) window; cleared
    /// when the embedder reads it.
    pub(crate) flash_requested: bool,
    /// Focus leaf to restore when the window is activated again.
    pub(crate) restore_focus: Option<WidgetId>,
}

impl Window {
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }
}

/// All window records plus their stacking order.
pub struct Windows {
    windows: SlotMap<WindowId, Window>,
    /// Top-level windows, back-to-front.
    top_level: Vec<WindowId>,
    /// Usable desktop region tooltips and popups are clamped into.
    work_area: Rect,
}

impl Default for Windows {
    fn default() -> Self {
        Self::new()
    }
}

impl Windows {
    pub fn new() -> Self {
        Self {
            windows: SlotMap::with_key(),
            top_level: Vec::new(),
            work_area: Rect::new(0.0, 0.0, f64::MAX, f64::MAX),
        }
    }

    pub fn open(
        &mut self,
        rect: Rect,
        kind: WindowKind,
        parent: Option<WindowId>,
    ) -> Result<WindowId, Error> {
        if let Some(parent) = parent {
            if !self.windows.contains_key(parent) {
                return Err(Error::UnknownParentWindow);
            }
        }
        let id = self.windows.insert(Window {
            rect,
            kind,
            parent,
            children: Vec::new(),
            root: None,
            enabled: true,
            visible: true,
            flash_requested: false,
            restore_focus: None,
        });
        match parent {
            Some(parent) => self.windows[parent].children.push(id),
            None => self.top_level.push(id),
        }
        Ok(id)
    }

    /// Remove `id` and its child windows. Returns the removed records,
    /// parents before children.
    pub(crate) fn remove(&mut self, id: WindowId) -> Vec<(WindowId, Window)> {
        let mut removed = Vec::new();
        if !self.windows.contains_key(id) {
            return removed;
        }
        match self.windows[id].parent {
            Some(parent) => {
                if let Some(parent_window) = self.windows.get_mut(parent) {
                    parent_window.children.retain(|c| *c != id);
                }
            }
            None => self.top_level.retain(|w| *w != id),
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(window) = self.windows.remove(next) {
                stack.extend(window.children.iter().copied());
                removed.push((next, window));
            }
        }
        removed
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    pub(crate) fn set_root(&mut self, id: WindowId, root: WidgetId) -> Result<(), Error> {
        let window = self.windows.get_mut(id).ok_or(Error::UnknownWindow)?;
        if window.root.is_some() {
            return Err(Error::RootAlreadySet);
        }
        window.root = Some(root);
        Ok(())
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn set_work_area(&mut self, rect: Rect) {
        self.work_area = rect;
    }

    /// Raise `id` above its siblings.
    pub fn bring_to_front(&mut self, id: WindowId) {
        let Some(parent) = self.windows.get(id).and_then(|w| w.parent) else {
            if self.top_level.iter().any(|w| *w == id) {
                self.top_level.retain(|w| *w != id);
                self.top_level.push(id);
            }
            return;
        };
        if let Some(parent_window) = self.windows.get_mut(parent) {
            parent_window.children.retain(|c| *c != id);
            parent_window.children.push(id);
        }
    }

    /// Whether `id` is `ancestor` or transitively parented under it.
    pub fn is_descendant_of(&self, id: WindowId, ancestor: WindowId) -> bool {
        let mut current = Some(id);
        while let Some(window) = current {
            if window == ancestor {
                return true;
            }
            current = self.windows.get(window).and_then(|w| w.parent);
        }
        false
    }

    /// Union of all window rects; the hit-test grid covers this.
    pub(crate) fn virtual_desktop(&self) -> Rect {
        let mut bounds: Option<Rect> = None;
        for (_, window) in self.windows.iter() {
            bounds = Some(match bounds {
                Some(b) => b.union(window.rect),
                None => window.rect,
            });
        }
        bounds.unwrap_or(Rect::ZERO)
    }

    /// Windows in draw order (back-to-front, parents before their popups).
    pub(crate) fn draw_order(&self) -> Vec<WindowId> {
        let mut order = Vec::with_capacity(self.windows.len());
        for &top in &self.top_level {
            self.push_draw_order(top, &mut order);
        }
        order
    }

    fn push_draw_order(&self, id: WindowId, order: &mut Vec<WindowId>) {
        order.push(id);
        if let Some(window) = self.windows.get(id) {
            for &child in &window.children {
                self.push_draw_order(child, order);
            }
        }
    }

    /// The top-most window whose rect contains `point` and that passes
    /// `eligible`. Child popups are checked before their parent; tooltip
    /// windows are skipped outright.
    pub(crate) fn window_under(
        &self,
        point: Point,
        eligible: impl Fn(WindowId) -> bool + Copy,
    ) -> Option<WindowId> {
        for &top in self.top_level.iter().rev() {
            if let Some(hit) = self.locate(top, point, eligible) {
                return Some(hit);
            }
        }
        None
    }

    fn locate(
        &self,
        id: WindowId,
        point: Point,
        eligible: impl Fn(WindowId) -> bool + Copy,
    ) -> Option<WindowId> {
        let window = self.windows.get(id)?;
        for &child in window.children.iter().rev() {
            if let Some(hit) = self.locate(child, point, eligible) {
                return Some(hit);
            }
        }
        let hittable = window.visible
            && window.enabled
            && window.kind != WindowKind::Tooltip
            && window.rect.contains(point)
            && eligible(id);
        hittable.then_some(id)
    }

    /// Take-and-clear accessor for the activation-redirect flash flag.
    pub fn take_flash_request(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(id) {
            Some(window) => std::mem::take(&mut window.flash_requested),
            None => false,
        }
    }
}
