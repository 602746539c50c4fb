//! Live and weak widget paths.
//!
//! A [`WidgetPath`] is a root-to-leaf snapshot of arranged widgets produced
//! by one hit-test or capture resolution; it is only meaningful for the
//! dispatch that produced it. A [`WeakWidgetPath`] is the id-only form that
//! survives across frames (capture entries, the focus path, the
//! last-hovered path) and must be resolved against the arena before use.
//!
//! Resolution is deliberately blunt about damage: a missing or reparented
//! element truncates the path at that point, and callers decide whether a
//! truncated prefix is still useful (key dispatch) or poisons the holder
//! (capture).

use peniko::kurbo::Rect;
use smallvec::SmallVec;

use crate::widget::{WidgetArena, WidgetId};
use crate::window::WindowId;

/// One widget plus its resolved screen geometry, valid for this frame only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangedWidget {
    pub widget: WidgetId,
    pub rect: Rect,
}

/// Root-to-leaf chain of arranged widgets in one window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetPath {
    pub window: WindowId,
    widgets: SmallVec<[ArrangedWidget; 8]>,
}

impl WidgetPath {
    pub fn new(window: WindowId, widgets: impl IntoIterator<Item = ArrangedWidget>) -> Self {
        Self {
            window,
            widgets: widgets.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn get(&self, index: usize) -> Option<&ArrangedWidget> {
        self.widgets.get(index)
    }

    pub fn root(&self) -> Option<&ArrangedWidget> {
        self.widgets.first()
    }

    pub fn leaf(&self) -> Option<&ArrangedWidget> {
        self.widgets.last()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ArrangedWidget> {
        self.widgets.iter()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.iter().any(|w| w.widget == id)
    }

    pub fn position_of(&self, id: WidgetId) -> Option<usize> {
        self.widgets.iter().position(|w| w.widget == id)
    }

    /// The prefix of this path ending at `id`, or `None` if `id` is not on
    /// the path.
    pub fn down_to(&self, id: WidgetId) -> Option<WidgetPath> {
        let end = self.position_of(id)?;
        Some(WidgetPath {
            window: self.window,
            widgets: self.widgets[..=end].iter().copied().collect(),
        })
    }

    /// Rebuild `id`'s full path from the arena's parent links and current
    /// rects. Used when a reply names a widget that is not on the
    /// dispatching path.
    pub fn from_widget(arena: &WidgetArena, id: WidgetId) -> Option<WidgetPath> {
        let chain = arena.chain_from_root(id)?;
        let window = arena.window_of(*chain.first()?)?;
        let mut widgets = SmallVec::new();
        for link in chain {
            widgets.push(ArrangedWidget {
                widget: link,
                rect: arena.rect(link)?,
            });
        }
        Some(WidgetPath { window, widgets })
    }

    pub fn to_weak(&self) -> WeakWidgetPath {
        WeakWidgetPath {
            window: self.window,
            ids: self.widgets.iter().map(|w| w.widget).collect(),
        }
    }
}

/// How much of a weak path could be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResolution {
    /// Every element is live and still chained as recorded.
    Full(WidgetPath),
    /// A suffix is gone; the live prefix is returned.
    Truncated(WidgetPath),
    /// Nothing usable remains (empty path, or the root itself is gone).
    Dead,
}

impl PathResolution {
    /// The live portion regardless of completeness, empty when dead.
    pub fn into_path(self) -> WidgetPath {
        match self {
            PathResolution::Full(p) | PathResolution::Truncated(p) => p,
            PathResolution::Dead => WidgetPath::empty(),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, PathResolution::Full(_))
    }
}

/// Id-only path that survives across frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeakWidgetPath {
    pub window: WindowId,
    ids: SmallVec<[WidgetId; 8]>,
}

impl WeakWidgetPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[WidgetId] {
        &self.ids
    }

    pub fn leaf(&self) -> Option<WidgetId> {
        self.ids.last().copied()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.ids.contains(&id)
    }

    /// True when `other` has exactly the same window and widget sequence.
    pub fn matches(&self, other: &WidgetPath) -> bool {
        self.window == other.window
            && self.ids.len() == other.len()
            && self
                .ids
                .iter()
                .zip(other.iter())
                .all(|(id, arranged)| *id == arranged.widget)
    }

    /// Rebuild a live path from current arena state.
    ///
    /// An element is kept while it is alive, still owned by the recorded
    /// window, and still the child of the preceding element; the first
    /// failure truncates there.
    pub fn resolve(&self, arena: &WidgetArena) -> PathResolution {
        if self.ids.is_empty() {
            return PathResolution::Dead;
        }
        let mut widgets: SmallVec<[ArrangedWidget; 8]> = SmallVec::new();
        let mut previous: Option<WidgetId> = None;
        for &id in &self.ids {
            let live = arena.contains(id)
                && arena.window_of(id) == Some(self.window)
                && arena.parent(id) == previous;
            if !live {
                break;
            }
            let Some(rect) = arena.rect(id) else { break };
            widgets.push(ArrangedWidget { widget: id, rect });
            previous = Some(id);
        }
        if widgets.is_empty() {
            PathResolution::Dead
        } else if widgets.len() == self.ids.len() {
            PathResolution::Full(WidgetPath {
                window: self.window,
                widgets,
            })
        } else {
            PathResolution::Truncated(WidgetPath {
                window: self.window,
                widgets,
            })
        }
    }
}
