//! # Wicket
//!
//! Wicket is the input routing and interaction-state core of a retained
//! UI: the layer that turns raw pointer, keyboard, touch, and gamepad
//! input into widget callbacks with capture, focus, drag-and-drop,
//! tooltip, and modal semantics. It owns no layout and no painting; the
//! embedder arranges widget rects, flushes them into the hit-test grid
//! once per frame, and feeds input through an
//! [`InputTranslator`](input::InputTranslator).
//!
//! ## Example: routing a click
//! ```rust
//! use peniko::kurbo::Rect;
//! use wicket::prelude::*;
//! use wicket::test_harness::TestHarness;
//!
//! struct Button;
//!
//! impl Widget for Button {
//!     fn event(&mut self, _cx: &mut EventCx, _this: &ArrangedWidget, event: &WidgetEvent) -> Reply {
//!         match event {
//!             WidgetEvent::PointerDown(_) => Reply::handled(),
//!             _ => Reply::unhandled(),
//!         }
//!     }
//! }
//!
//! let mut harness = TestHarness::new();
//! let (_window, root) = harness.window_with_root(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let button = harness
//!     .insert(root, Button, Rect::new(10.0, 10.0, 110.0, 40.0))
//!     .unwrap();
//! harness.frame();
//!
//! assert!(harness.press(20.0, 20.0));
//! assert!(harness.ctx.arena().contains(button));
//! ```
//!
//! ## Concepts
//!
//! - **Widgets and paths**: a [`Widget`](widget::Widget) lives in a
//!   [`WidgetArena`](widget::WidgetArena) under one window; events travel
//!   along a [`WidgetPath`](path::WidgetPath), the root-to-leaf chain of
//!   widgets with the rects they were arranged at. Anything stored across
//!   events is a weak path of ids, re-validated against the arena before
//!   use.
//! - **Dispatch**: most events tunnel a preview pass root-to-leaf and then
//!   bubble the main pass leaf-to-root; a handled
//!   [`Reply`] stops the walk. Enter/leave pairs are notifications
//!   computed by diffing consecutive hover paths.
//! - **Replies**: widgets never mutate interaction state directly. A
//!   callback returns a [`Reply`] carrying requests (capture this pointer,
//!   focus me, start detecting a drag, begin drag-and-drop) which
//!   the loop applies in a fixed order before the next widget runs.
//! - **Capture and focus**: each pointer stream and each gamepad user can
//!   be captured independently; keyboard events follow the focus path,
//!   and every focus move carries a [`FocusCause`](focus::FocusCause).
//! - **Tooltips, menus, modality**: a tooltip controller handles dwell,
//!   fade, and placement; menu windows form a chain dismissed from any
//!   level outward; modal windows gate hit-testing to their own subtree.
//!
//! The whole crate is single-threaded. The only blocking point is an
//! optional [`RenderSync`](renderer::RenderSync) implementation that the
//! context consults before destroying or resizing anything the renderer
//! might still be reading.

pub mod capture;
pub mod config;
pub mod context;
mod dispatch;
pub mod drag;
pub mod error;
pub mod event;
pub mod focus;
pub mod gamepad;
pub mod input;
pub mod keyboard;
pub mod modal;
pub mod path;
pub mod pointer;
pub mod renderer;
pub mod reply;
pub mod test_harness;
pub mod tooltip;
pub mod widget;
pub mod window;

pub use context::{EventCx, InteractionContext};
pub use error::Error;
pub use peniko;
pub use peniko::kurbo;
pub use reply::Reply;
pub use widget::{Widget, WidgetId};
pub use window::WindowId;

pub mod prelude {
    pub use crate::config::InputConfig;
    pub use crate::context::{EventCx, InteractionContext};
    pub use crate::drag::{DragDropHandle, DragDropPayload};
    pub use crate::event::{Cursor, DragEvent, WidgetEvent};
    pub use crate::focus::FocusCause;
    pub use crate::gamepad::{GamepadAxis, GamepadButton, GamepadEvent, GamepadUser};
    pub use crate::input::{InputTranslator, ScrollDelta};
    pub use crate::keyboard::{CharEvent, Key, KeyEvent, Modifiers, NamedKey};
    pub use crate::path::{ArrangedWidget, WidgetPath};
    pub use crate::pointer::{Gesture, PointerButton, PointerEvent, PointerIndex};
    pub use crate::renderer::{NullRenderSync, RenderSync};
    pub use crate::reply::Reply;
    pub use crate::widget::{Tooltip, Widget, WidgetId};
    pub use crate::window::{WindowId, WindowKind};
    pub use peniko::kurbo::{Point, Rect, Size, Vec2};
}
