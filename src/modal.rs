//! Modal window stack and menu (popup) stack.
//!
//! Both are small ordered lists of window ids with different dismissal
//! rules. The modal stack gates which windows may receive input at all
//! (only the innermost modal and its descendants); the menu stack tracks
//! open popup chains and collapses them from a given level when input
//! lands outside the chain.

use peniko::kurbo::Point;

use crate::window::{WindowId, Windows};

/// Ordered modal windows; the last entry is the one currently enforced.
#[derive(Default)]
pub struct ModalStack {
    stack: Vec<WindowId>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<WindowId> {
        self.stack.last().copied()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.stack.contains(&window)
    }

    pub(crate) fn push(&mut self, window: WindowId) {
        self.stack.push(window);
    }

    pub(crate) fn pop(&mut self) -> Option<WindowId> {
        self.stack.pop()
    }

    /// Drop `window` from anywhere in the stack (it was closed while
    /// modal).
    pub(crate) fn remove(&mut self, window: WindowId) {
        self.stack.retain(|w| *w != window);
    }

    /// Whether `window` may receive input: always when no modal is active,
    /// otherwise only the innermost modal window and windows parented under
    /// it.
    pub(crate) fn allows(&self, windows: &Windows, window: WindowId) -> bool {
        match self.stack.last() {
            None => true,
            Some(&top) => windows.is_descendant_of(window, top),
        }
    }
}

/// Open menu chain, outermost first.
#[derive(Default)]
pub struct MenuStack {
    stack: Vec<WindowId>,
}

impl MenuStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn levels(&self) -> &[WindowId] {
        &self.stack
    }

    pub(crate) fn push(&mut self, window: WindowId) {
        self.stack.push(window);
    }

    pub fn level_of(&self, window: WindowId) -> Option<usize> {
        self.stack.iter().position(|w| *w == window)
    }

    /// Dismiss the menu at `level` and everything deeper. Returns the
    /// windows to close, deepest first.
    pub(crate) fn dismiss_from(&mut self, level: usize) -> Vec<WindowId> {
        if level >= self.stack.len() {
            return Vec::new();
        }
        let mut removed: Vec<WindowId> = self.stack.drain(level..).collect();
        removed.reverse();
        removed
    }

    /// Drop `window` from the chain without dismissal side effects, for
    /// when its window is already being torn down.
    pub(crate) fn forget(&mut self, window: WindowId) {
        self.stack.retain(|w| *w != window);
    }

    /// Deepest open level whose window contains `point`, if any.
    pub(crate) fn level_containing(&self, windows: &Windows, point: Point) -> Option<usize> {
        self.stack.iter().enumerate().rev().find_map(|(level, &w)| {
            let rect = windows.get(w)?.rect();
            rect.contains(point).then_some(level)
        })
    }

    /// Whether `window` is part of the open chain: a stack entry, a popup
    /// parented under one, or the window hosting the chain (the outermost
    /// menu's parent). Activation moving anywhere else dismisses the chain.
    pub(crate) fn in_chain(&self, windows: &Windows, window: WindowId) -> bool {
        if self.stack.iter().any(|&m| windows.is_descendant_of(window, m)) {
            return true;
        }
        self.stack
            .first()
            .and_then(|&outermost| windows.get(outermost))
            .and_then(|record| record.parent())
            == Some(window)
    }
}
