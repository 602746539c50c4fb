//! Pointer event vocabulary.
//!
//! One [`PointerIndex`] identifies one independent input stream: the mouse
//! cursor owns a reserved index and every touch contact gets its own. All
//! positions are in virtual-desktop coordinates.

use bitflags::bitflags;
use peniko::kurbo::{Point, Vec2};

use crate::keyboard::Modifiers;

/// Identifies one independent pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerIndex(pub u32);

impl PointerIndex {
    /// The mouse cursor's reserved stream.
    pub const CURSOR: PointerIndex = PointerIndex(0);

    /// Stream for the `n`-th simultaneous touch contact.
    pub fn touch(n: u32) -> Self {
        PointerIndex(n + 1)
    }

    pub fn is_cursor(self) -> bool {
        self == Self::CURSOR
    }
}

impl Default for PointerIndex {
    fn default() -> Self {
        Self::CURSOR
    }
}

/// A single pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
    X1,
    X2,
}

impl PointerButton {
    pub fn is_primary(self) -> bool {
        self == PointerButton::Primary
    }

    pub fn is_secondary(self) -> bool {
        self == PointerButton::Secondary
    }

    fn flag(self) -> PointerButtons {
        match self {
            PointerButton::Primary => PointerButtons::PRIMARY,
            PointerButton::Secondary => PointerButtons::SECONDARY,
            PointerButton::Auxiliary => PointerButtons::AUXILIARY,
            PointerButton::X1 => PointerButtons::X1,
            PointerButton::X2 => PointerButtons::X2,
        }
    }
}

bitflags! {
    /// The set of buttons currently held on one pointer stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerButtons: u8 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
        const AUXILIARY = 1 << 2;
        const X1 = 1 << 3;
        const X2 = 1 << 4;
    }
}

impl PointerButtons {
    pub fn press(&mut self, button: PointerButton) {
        self.insert(button.flag());
    }

    pub fn release(&mut self, button: PointerButton) {
        self.remove(button.flag());
    }

    pub fn holds(self, button: PointerButton) -> bool {
        self.contains(button.flag())
    }
}

/// A two-finger style gesture delta riding on a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Zoom(f64),
    Rotate(f64),
    Pan(Vec2),
}

/// A pointer event as seen by widgets and the dispatch loop.
///
/// Built by the input translation layer ([`crate::input`]); widget code only
/// ever reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerIndex,
    /// Current position on the virtual desktop.
    pub position: Point,
    /// Position at the previous event on this stream.
    pub last_position: Point,
    /// `position - last_position`.
    pub delta: Vec2,
    /// Buttons held after this event was applied.
    pub buttons: PointerButtons,
    /// The button that changed, for down/up events.
    pub button: Option<PointerButton>,
    pub modifiers: Modifiers,
    /// Scroll delta in pixels, for wheel events.
    pub wheel: Option<Vec2>,
    pub gesture: Option<Gesture>,
    /// Whether this stream is a touch contact rather than the mouse.
    pub touch: bool,
    /// Set on the per-tick replays of the last cursor position; synthetic
    /// moves refresh hover state but never advance tooltip timers or reach
    /// a captor's move callback.
    pub synthetic: bool,
    /// Consecutive-click count assigned by the translation layer.
    pub count: u8,
}

impl PointerEvent {
    /// A minimal event for `pointer` at `position`, used as a baseline by
    /// the translation layer and by tests.
    pub fn new(pointer: PointerIndex, position: Point) -> Self {
        Self {
            pointer,
            position,
            last_position: position,
            delta: Vec2::ZERO,
            buttons: PointerButtons::empty(),
            button: None,
            modifiers: Modifiers::empty(),
            wheel: None,
            gesture: None,
            touch: false,
            synthetic: false,
            count: 1,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }
}
