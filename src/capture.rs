//! Pointer and gamepad capture registries.
//!
//! A capture routes an input stream (one pointer index, or one gamepad
//! user) straight to a widget, bypassing hit-testing, until released.
//! Entries are weak paths: resolution happens against the live arena on
//! every use, and a path that no longer fully resolves invalidates the
//! capture rather than shrinking it.
//!
//! The registry is storage plus validation; capture-lost notifications are
//! delivered by the context, which knows how to borrow widgets safely
//! mid-dispatch.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::gamepad::GamepadUser;
use crate::path::{PathResolution, WeakWidgetPath, WidgetPath};
use crate::pointer::PointerIndex;
use crate::widget::{WidgetArena, WidgetId};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Outcome of a capture request.
pub(crate) enum CaptureSet {
    /// Capture installed; the previous captor's leaf, if any, still needs a
    /// capture-lost notification.
    Installed(Option<WidgetId>),
    /// The widget was not reachable from the event path; nothing changed.
    Rejected,
}

/// Outcome of resolving a captor for delivery.
pub(crate) enum CaptureResolution {
    Live(WidgetPath),
    /// The stored path no longer fully resolves. The entry has been removed
    /// and the stored leaf, when still alive, needs a capture-lost
    /// notification.
    Invalidated(Option<WidgetId>),
    None,
}

/// The widget a Reply names must be reachable by extending the event path:
/// first the exact prefix down to it, then a search anchored at the event
/// path's root (the widget may have been arranged outside its ancestor's
/// clip, or added this dispatch).
fn reach(arena: &WidgetArena, event_path: &WidgetPath, widget: WidgetId) -> Option<WidgetPath> {
    if let Some(path) = event_path.down_to(widget) {
        return Some(path);
    }
    let from_root = WidgetPath::from_widget(arena, widget)?;
    let same_tree = match (event_path.root(), from_root.root()) {
        (Some(a), Some(b)) => a.widget == b.widget,
        _ => false,
    };
    (same_tree && from_root.window == event_path.window).then_some(from_root)
}

#[derive(Default)]
pub struct CaptureRegistry {
    pointers: FxIndexMap<PointerIndex, WeakWidgetPath>,
    gamepads: FxIndexMap<GamepadUser, WeakWidgetPath>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `widget` as the captor for `pointer`, replacing any existing
    /// entry. Unreachable requests are dropped and logged.
    pub(crate) fn set(
        &mut self,
        arena: &WidgetArena,
        pointer: PointerIndex,
        event_path: &WidgetPath,
        widget: WidgetId,
    ) -> CaptureSet {
        let Some(path) = reach(arena, event_path, widget) else {
            log::warn!(
                target: "wicket::capture",
                "dropping pointer capture request for {}: not reachable from the event path",
                arena.name(widget),
            );
            return CaptureSet::Rejected;
        };
        let previous = self.pointers.insert(pointer, path.to_weak());
        CaptureSet::Installed(previous.and_then(|p| p.leaf()))
    }

    pub(crate) fn set_gamepad(
        &mut self,
        arena: &WidgetArena,
        user: GamepadUser,
        event_path: &WidgetPath,
        widget: WidgetId,
    ) -> CaptureSet {
        let Some(path) = reach(arena, event_path, widget) else {
            log::warn!(
                target: "wicket::capture",
                "dropping gamepad capture request for {}: not reachable from the event path",
                arena.name(widget),
            );
            return CaptureSet::Rejected;
        };
        let previous = self.gamepads.insert(user, path.to_weak());
        CaptureSet::Installed(previous.and_then(|p| p.leaf()))
    }

    /// Remove the entry for `pointer`, returning the stored leaf so the
    /// caller can notify it, even when the path no longer resolves.
    pub(crate) fn release(&mut self, pointer: PointerIndex) -> Option<WidgetId> {
        self.pointers.shift_remove(&pointer).and_then(|p| p.leaf())
    }

    pub(crate) fn release_gamepad(&mut self, user: GamepadUser) -> Option<WidgetId> {
        self.gamepads.shift_remove(&user).and_then(|p| p.leaf())
    }

    /// Release every entry (application deactivated, input reset). Returns
    /// the still-live leaves to notify.
    pub(crate) fn release_all(&mut self, arena: &WidgetArena) -> Vec<WidgetId> {
        let mut notify = Vec::new();
        let pointers = self.pointers.drain(..).map(|(_, path)| path);
        let gamepads = self.gamepads.drain(..).map(|(_, path)| path);
        for path in pointers.chain(gamepads) {
            if let Some(leaf) = path.leaf() {
                if arena.contains(leaf) {
                    notify.push(leaf);
                }
            }
        }
        notify
    }

    /// Rebuild the live path for `pointer`'s captor. Partial resolution
    /// invalidates the capture as a side effect; it never yields a smaller
    /// valid capture.
    pub(crate) fn resolve(
        &mut self,
        arena: &WidgetArena,
        pointer: PointerIndex,
    ) -> CaptureResolution {
        let Some(weak) = self.pointers.get(&pointer) else {
            return CaptureResolution::None;
        };
        match weak.resolve(arena) {
            PathResolution::Full(path) => CaptureResolution::Live(path),
            PathResolution::Truncated(_) | PathResolution::Dead => {
                let leaf = self.pointers.shift_remove(&pointer).and_then(|p| p.leaf());
                CaptureResolution::Invalidated(leaf.filter(|l| arena.contains(*l)))
            }
        }
    }

    pub(crate) fn resolve_gamepad(
        &mut self,
        arena: &WidgetArena,
        user: GamepadUser,
    ) -> CaptureResolution {
        let Some(weak) = self.gamepads.get(&user) else {
            return CaptureResolution::None;
        };
        match weak.resolve(arena) {
            PathResolution::Full(path) => CaptureResolution::Live(path),
            PathResolution::Truncated(_) | PathResolution::Dead => {
                let leaf = self.gamepads.shift_remove(&user).and_then(|p| p.leaf());
                CaptureResolution::Invalidated(leaf.filter(|l| arena.contains(*l)))
            }
        }
    }

    pub fn captor(&self, pointer: PointerIndex) -> Option<WidgetId> {
        self.pointers.get(&pointer).and_then(|p| p.leaf())
    }

    pub fn gamepad_captor(&self, user: GamepadUser) -> Option<WidgetId> {
        self.gamepads.get(&user).and_then(|p| p.leaf())
    }

    pub fn has_captor(&self, pointer: PointerIndex) -> bool {
        self.pointers.contains_key(&pointer)
    }

    /// Whether `widget` is the captor of any pointer.
    pub fn is_captor(&self, widget: WidgetId) -> bool {
        self.pointers.values().any(|p| p.leaf() == Some(widget))
    }

    pub(crate) fn captured_pointers(&self) -> impl Iterator<Item = PointerIndex> + '_ {
        self.pointers.keys().copied()
    }
}
