//! Tunable input-handling parameters.
//!
//! Every timing and distance constant used by the routing core lives here so
//! embedders can load them from settings instead of recompiling. The
//! defaults are the conventional desktop values.

use std::time::Duration;

use peniko::kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

/// Configuration for the interaction core.
///
/// Constructed by the embedder and handed to
/// [`InteractionContext::new`](crate::context::InteractionContext::new).
/// All fields are plain data; changing them after construction only affects
/// future events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Screen-space distance a pressed pointer must travel before a pending
    /// drag-detect request turns into a drag.
    pub drag_threshold: f64,
    /// Hover time over a tooltip-bearing widget before its tooltip opens.
    pub tooltip_delay: Duration,
    /// Time over which a freshly opened tooltip fades to full opacity.
    pub tooltip_fade_in: Duration,
    /// Offset of the tooltip's top-left corner from the cursor.
    pub tooltip_offset: Vec2,
    /// Extra offset applied when a tooltip is pushed out of a force-field
    /// rect instead of placed at the cursor.
    pub tooltip_force_field_offset: Vec2,
    /// Distance the tooltip slides toward its resting position while fading.
    pub tooltip_slide: Vec2,
    /// Two presses within this interval and `double_click_distance` of each
    /// other raise the click count instead of resetting it.
    pub double_click_time: Duration,
    /// See `double_click_time`.
    pub double_click_distance: f64,
    /// Edge length of one hit-test grid cell, in virtual-desktop pixels.
    pub hit_test_cell_size: f64,
    /// Fallback tooltip window size when the providing widget does not give
    /// one.
    pub tooltip_size: Size,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            tooltip_delay: Duration::from_millis(150),
            tooltip_fade_in: Duration::from_millis(100),
            tooltip_offset: Vec2::new(12.0, 8.0),
            tooltip_force_field_offset: Vec2::new(4.0, 3.0),
            tooltip_slide: Vec2::new(30.0, 5.0),
            double_click_time: Duration::from_millis(500),
            double_click_distance: 4.0,
            hit_test_cell_size: 128.0,
            tooltip_size: Size::new(160.0, 24.0),
        }
    }
}
