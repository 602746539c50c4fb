//! Raw platform input to translated events.
//!
//! The embedder feeds whatever its windowing layer produces (mouse deltas,
//! touch contacts with platform ids, scroll lines, key presses) into an
//! [`InputTranslator`], which normalizes it into the [`PointerEvent`] /
//! [`KeyEvent`] shapes the dispatch loop consumes: touch contacts become
//! pointer streams, scroll lines become pixels, and consecutive presses
//! earn a click count.

use std::time::Instant;

use peniko::kurbo::{Point, Vec2};
use rustc_hash::FxHashMap;

use crate::config::InputConfig;
use crate::context::InteractionContext;
use crate::keyboard::{CharEvent, Key, KeyEvent, Modifiers};
use crate::pointer::{Gesture, PointerButton, PointerEvent, PointerIndex};

/// Scroll distance of one wheel line, in pixels.
const PIXELS_PER_LINE: f64 = 60.0;

/// A wheel delta as platforms report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    Lines(f64, f64),
    Pixels(f64, f64),
}

impl ScrollDelta {
    fn to_pixels(self) -> Vec2 {
        match self {
            ScrollDelta::Lines(x, y) => Vec2::new(x * PIXELS_PER_LINE, y * PIXELS_PER_LINE),
            ScrollDelta::Pixels(x, y) => Vec2::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClickRecord {
    at: Instant,
    position: Point,
    count: u8,
}

/// Stateful translation from raw platform input to dispatchable events.
///
/// Owns the state that exists *before* routing: modifier keys, the mapping
/// from platform touch ids to pointer streams, and per-button click
/// chaining. Everything after translation lives in
/// [`InteractionContext`].
#[derive(Default)]
pub struct InputTranslator {
    modifiers: Modifiers,
    touch_points: FxHashMap<u64, PointerIndex>,
    last_click: FxHashMap<PointerButton, ClickRecord>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform reported a modifier change; applied to every event
    /// translated from here on.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    // ---- mouse ------------------------------------------------------------

    pub fn mouse_move(
        &mut self,
        ctx: &mut InteractionContext,
        position: Point,
        now: Instant,
    ) -> bool {
        let event = self.cursor_event(ctx, position);
        ctx.pointer_move(event, now)
    }

    pub fn mouse_down(
        &mut self,
        ctx: &mut InteractionContext,
        button: PointerButton,
        position: Point,
        now: Instant,
    ) -> bool {
        let count = self.click_count(button, position, now, ctx.config());
        let mut event = self.cursor_event(ctx, position).with_button(button);
        event.buttons.press(button);
        event.count = count;
        ctx.pointer_down(event)
    }

    pub fn mouse_up(
        &mut self,
        ctx: &mut InteractionContext,
        button: PointerButton,
        position: Point,
    ) -> bool {
        let mut event = self.cursor_event(ctx, position).with_button(button);
        event.buttons.release(button);
        ctx.pointer_up(event)
    }

    pub fn wheel(
        &mut self,
        ctx: &mut InteractionContext,
        delta: ScrollDelta,
        position: Point,
    ) -> bool {
        let mut event = self.cursor_event(ctx, position);
        event.wheel = Some(delta.to_pixels());
        ctx.wheel_or_gesture(event)
    }

    pub fn gesture(
        &mut self,
        ctx: &mut InteractionContext,
        gesture: Gesture,
        position: Point,
    ) -> bool {
        let mut event = self.cursor_event(ctx, position);
        event.gesture = Some(gesture);
        ctx.wheel_or_gesture(event)
    }

    fn cursor_event(&self, ctx: &InteractionContext, position: Point) -> PointerEvent {
        let mut event = PointerEvent::new(PointerIndex::CURSOR, position);
        event.last_position = ctx.cursor_position();
        event.delta = position - event.last_position;
        event.buttons = ctx.now_buttons(PointerIndex::CURSOR);
        event.modifiers = self.modifiers;
        event
    }

    /// Same button, close enough in time and space, extends the chain;
    /// anything else starts over at one.
    fn click_count(
        &mut self,
        button: PointerButton,
        position: Point,
        now: Instant,
        config: &InputConfig,
    ) -> u8 {
        if let Some(record) = self.last_click.get_mut(&button) {
            let close_in_time = now.duration_since(record.at) <= config.double_click_time;
            let close_in_space =
                (position - record.position).hypot() <= config.double_click_distance;
            if close_in_time && close_in_space {
                record.count = record.count.saturating_add(1);
                record.at = now;
                record.position = position;
                return record.count;
            }
        }
        self.last_click.insert(
            button,
            ClickRecord {
                at: now,
                position,
                count: 1,
            },
        );
        1
    }

    // ---- touch ------------------------------------------------------------

    pub fn touch_down(
        &mut self,
        ctx: &mut InteractionContext,
        id: u64,
        position: Point,
    ) -> bool {
        let pointer = self.touch_pointer(id);
        let mut event = self
            .touch_event(ctx, pointer, position)
            .with_button(PointerButton::Primary);
        event.buttons.press(PointerButton::Primary);
        event.count = 1;
        ctx.pointer_down(event)
    }

    pub fn touch_move(
        &mut self,
        ctx: &mut InteractionContext,
        id: u64,
        position: Point,
        now: Instant,
    ) -> bool {
        // Moves for contacts we never saw go down are dropped.
        let Some(pointer) = self.touch_points.get(&id).copied() else {
            return false;
        };
        let event = self.touch_event(ctx, pointer, position);
        ctx.pointer_move(event, now)
    }

    pub fn touch_up(&mut self, ctx: &mut InteractionContext, id: u64, position: Point) -> bool {
        let Some(pointer) = self.touch_points.remove(&id) else {
            return false;
        };
        let mut event = self
            .touch_event(ctx, pointer, position)
            .with_button(PointerButton::Primary);
        event.buttons.release(PointerButton::Primary);
        ctx.pointer_up(event)
    }

    /// The platform abandoned the contact (palm rejection, grab by a system
    /// gesture). Routed like a lift.
    pub fn touch_cancelled(
        &mut self,
        ctx: &mut InteractionContext,
        id: u64,
        position: Point,
    ) -> bool {
        self.touch_up(ctx, id, position)
    }

    fn touch_event(
        &self,
        ctx: &InteractionContext,
        pointer: PointerIndex,
        position: Point,
    ) -> PointerEvent {
        let mut event = PointerEvent::new(pointer, position);
        event.last_position = ctx
            .pointer_positions
            .get(&pointer)
            .copied()
            .unwrap_or(position);
        event.delta = position - event.last_position;
        event.buttons = ctx.now_buttons(pointer);
        event.modifiers = self.modifiers;
        event.touch = true;
        event
    }

    /// Map a platform contact id to the lowest free touch stream.
    fn touch_pointer(&mut self, id: u64) -> PointerIndex {
        if let Some(pointer) = self.touch_points.get(&id) {
            return *pointer;
        }
        let mut slot = 0;
        while self
            .touch_points
            .values()
            .any(|p| *p == PointerIndex::touch(slot))
        {
            slot += 1;
        }
        let pointer = PointerIndex::touch(slot);
        self.touch_points.insert(id, pointer);
        pointer
    }

    // ---- keyboard ---------------------------------------------------------

    pub fn key_down(&mut self, ctx: &mut InteractionContext, key: Key, repeat: bool) -> bool {
        let mut event = KeyEvent::new(key).with_modifiers(self.modifiers);
        event.repeat = repeat;
        ctx.key_down(event)
    }

    pub fn key_up(&mut self, ctx: &mut InteractionContext, key: Key) -> bool {
        ctx.key_up(KeyEvent::new(key).with_modifiers(self.modifiers))
    }

    pub fn char_input(&mut self, ctx: &mut InteractionContext, ch: char) -> bool {
        ctx.char_input(CharEvent {
            ch,
            modifiers: self.modifiers,
        })
    }
}
