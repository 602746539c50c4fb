//! Test harness for headless interaction testing.
//!
//! Drives an [`InteractionContext`] without a platform: time is a counter
//! the test advances explicitly, raw input goes through a real
//! [`InputTranslator`], and the hit-test grid is rebuilt on
//! [`TestHarness::frame`] the way an embedder would at draw time.
//!
//! # Example
//!
//! ```rust
//! use peniko::kurbo::Rect;
//! use wicket::test_harness::TestHarness;
//!
//! let mut harness = TestHarness::new();
//! let (_window, root) = harness.window_with_root(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let child = harness.child(root, Rect::new(10.0, 10.0, 110.0, 40.0));
//! harness.frame();
//!
//! harness.click(20.0, 20.0);
//! assert!(harness.ctx.arena().contains(child));
//! ```

use std::borrow::Cow;
use std::time::{Duration, Instant};

use peniko::kurbo::{Point, Rect};

use crate::config::InputConfig;
use crate::context::InteractionContext;
use crate::error::Error;
use crate::input::InputTranslator;
use crate::keyboard::Key;
use crate::pointer::PointerButton;
use crate::widget::{Widget, WidgetId};
use crate::window::{WindowId, WindowKind};

/// A featureless rectangular widget; every callback keeps its default.
pub struct Panel;

impl Widget for Panel {
    fn debug_name(&self) -> Cow<'static, str> {
        "panel".into()
    }
}

/// A headless driver around one [`InteractionContext`].
///
/// Both the context and the translator are public so tests can reach
/// anything the sugar here does not cover.
pub struct TestHarness {
    pub ctx: InteractionContext,
    pub translator: InputTranslator,
    start: Instant,
    elapsed: Duration,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(InputConfig::default())
    }

    pub fn with_config(config: InputConfig) -> Self {
        Self {
            ctx: InteractionContext::new(config),
            translator: InputTranslator::new(),
            start: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    // ---- time -------------------------------------------------------------

    /// The harness clock. Starts at construction and only moves through
    /// [`TestHarness::advance`].
    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Advance in `step` increments, ticking after each, until `duration`
    /// has passed. Tooltip and fade tests want several ticks, not one big
    /// jump.
    pub fn run(&mut self, duration: Duration, step: Duration) {
        let until = self.elapsed + duration;
        while self.elapsed < until {
            self.advance(step);
            self.tick();
        }
    }

    /// One frame tick: synthetic hover refresh, tooltip timers, cursor
    /// query.
    pub fn tick(&mut self) {
        let now = self.now();
        self.ctx.tick(now);
    }

    /// What an embedder does at draw time: flush arranged geometry into
    /// the hit-test grid.
    pub fn frame(&mut self) {
        self.ctx.rebuild_hit_grid();
    }

    // ---- tree building ----------------------------------------------------

    /// Open a normal top-level window covering `rect`, with no root yet.
    pub fn window(&mut self, rect: Rect) -> WindowId {
        self.ctx
            .open_window(rect, WindowKind::Normal, None)
            .unwrap()
    }

    /// Open a normal window and give it a [`Panel`] root arranged to the
    /// full rect.
    pub fn window_with_root(&mut self, rect: Rect) -> (WindowId, WidgetId) {
        let window = self.window(rect);
        let root = self.ctx.insert_root(window, Panel).unwrap();
        self.ctx.arrange(root, rect).unwrap();
        (window, root)
    }

    /// Insert a [`Panel`] child under `parent`, arranged to `rect`.
    pub fn child(&mut self, parent: WidgetId, rect: Rect) -> WidgetId {
        self.insert(parent, Panel, rect).unwrap()
    }

    /// Insert any widget under `parent`, arranged to `rect`.
    pub fn insert(
        &mut self,
        parent: WidgetId,
        widget: impl Widget + 'static,
        rect: Rect,
    ) -> Result<WidgetId, Error> {
        let id = self.ctx.insert_child(parent, widget)?;
        self.ctx.arrange(id, rect)?;
        Ok(id)
    }

    // ---- pointer sugar ----------------------------------------------------

    pub fn move_to(&mut self, x: f64, y: f64) -> bool {
        let now = self.now();
        self.translator.mouse_move(&mut self.ctx, Point::new(x, y), now)
    }

    pub fn press(&mut self, x: f64, y: f64) -> bool {
        self.press_button(PointerButton::Primary, x, y)
    }

    pub fn press_button(&mut self, button: PointerButton, x: f64, y: f64) -> bool {
        let now = self.now();
        self.translator
            .mouse_down(&mut self.ctx, button, Point::new(x, y), now)
    }

    pub fn release(&mut self, x: f64, y: f64) -> bool {
        self.release_button(PointerButton::Primary, x, y)
    }

    pub fn release_button(&mut self, button: PointerButton, x: f64, y: f64) -> bool {
        self.translator
            .mouse_up(&mut self.ctx, button, Point::new(x, y))
    }

    /// Press and release the primary button in place.
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        let down = self.press(x, y);
        let up = self.release(x, y);
        down || up
    }

    // ---- keyboard sugar ---------------------------------------------------

    pub fn key_down(&mut self, key: Key) -> bool {
        self.translator.key_down(&mut self.ctx, key, false)
    }

    pub fn key_up(&mut self, key: Key) -> bool {
        self.translator.key_up(&mut self.ctx, key)
    }

    /// Down then up.
    pub fn key(&mut self, key: Key) -> bool {
        let down = self.key_down(key);
        self.key_up(key);
        down
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        self.translator.char_input(&mut self.ctx, ch)
    }
}
