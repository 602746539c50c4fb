//! The synchronization seam between routing and the rendering pipeline.
//!
//! The interaction core never draws, but it must not mutate state the
//! renderer may still be reading: window rects are flushed to the hit-test
//! grid, and windows are resized or destroyed, only after in-flight frames
//! complete. [`RenderSync::sync`] is that barrier, and the single place the
//! core blocks. Everything else here is a notification the embedder can use
//! to schedule repaints.

use peniko::kurbo::{Rect, Size};

use crate::window::WindowId;

/// Embedder hook for renderer coordination.
///
/// All methods have do-nothing defaults; a headless embedder (or the test
/// harness) can use [`NullRenderSync`] as-is.
pub trait RenderSync {
    /// Block until the renderer has finished consuming any state the core
    /// is about to mutate. Called before destroying or resizing a window
    /// and once per modal-pump iteration.
    fn sync(&mut self) {}

    /// A region of `window` changed for rendering purposes (tooltip fade,
    /// cursor change); repaint when convenient.
    fn invalidate(&mut self, _window: WindowId, _region: Rect) {}

    /// `window`'s backing surface must change size before the next frame.
    fn resize_surface(&mut self, _window: WindowId, _size: Size) {}
}

/// No-op implementation for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderSync;

impl RenderSync for NullRenderSync {}
