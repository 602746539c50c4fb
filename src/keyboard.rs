//! Keyboard event vocabulary.
//!
//! The platform layer translates its own key codes into these identifiers
//! before events enter the dispatch loop, so the core never sees raw scan
//! codes.

use bitflags::bitflags;

/// An abstract key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Character(char),
    Named(NamedKey),
}

/// Non-character keys the routing core cares about.
///
/// Only Tab and Escape carry routing semantics (focus navigation and drag
/// cancel); the rest exist so widgets can match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Tab,
    Enter,
    Space,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// True for auto-repeated downs.
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            repeat: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_named(&self, named: NamedKey) -> bool {
        self.key == Key::Named(named)
    }
}

/// A translated character input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharEvent {
    pub ch: char,
    pub modifiers: Modifiers,
}
