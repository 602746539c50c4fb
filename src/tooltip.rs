//! Tooltip lifecycle: dwell, fade-in, placement.
//!
//! The controller is a state machine (`Idle -> Pending -> Visible`) plus
//! the placement geometry. It never opens or closes windows itself: ticks
//! return what should happen ([`TooltipTick`]) and closes return what must
//! be torn down ([`TooltipClosed`]), so the context keeps window lifetime
//! and renderer synchronization in one place.
//!
//! Placement is flip-then-clamp: the tooltip goes below-right of the cursor
//! by the configured offset, flips to the other side of the cursor when
//! that would cross the work-area edge, then clamps. A force-field rect
//! (ancestors or open menus that asked to repel tooltips) pushes the result
//! out vertically, then horizontally if still overlapping. While fading in,
//! the tooltip slides toward its resting position by
//! `slide * (1 - opacity)^3`.

use std::time::Instant;

use peniko::kurbo::{Point, Rect, Size};

use crate::config::InputConfig;
use crate::widget::{Tooltip, WidgetId};
use crate::window::WindowId;

/// A tooltip candidate found under the cursor.
pub(crate) struct TooltipOffer {
    pub(crate) source: WidgetId,
    pub(crate) content: Tooltip,
    /// Union of rects that repel this tooltip, if any.
    pub(crate) force_field: Option<Rect>,
}

/// A dismissal the caller must finish: notify `source` and destroy
/// `window`.
pub(crate) struct TooltipClosed {
    pub(crate) source: WidgetId,
    pub(crate) window: WindowId,
}

enum State {
    Idle,
    Pending {
        offer: TooltipOffer,
        since: Instant,
    },
    Visible {
        offer: TooltipOffer,
        tooltip_window: WindowId,
        shown_at: Instant,
    },
}

/// What the current tick wants done with the tooltip window.
pub(crate) enum TooltipTick {
    Idle,
    /// Dwell elapsed: open a tooltip window with this rect and report its
    /// id through [`TooltipController::opened`].
    Open { rect: Rect },
    /// Follow the cursor: move the visible tooltip window.
    Move { window: WindowId, rect: Rect },
}

pub struct TooltipController {
    state: State,
}

impl Default for TooltipController {
    fn default() -> Self {
        Self::new()
    }
}

impl TooltipController {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// The widget whose tooltip is pending or showing.
    pub fn source(&self) -> Option<WidgetId> {
        match &self.state {
            State::Idle => None,
            State::Pending { offer, .. } | State::Visible { offer, .. } => Some(offer.source),
        }
    }

    pub fn visible_window(&self) -> Option<WindowId> {
        match &self.state {
            State::Visible { tooltip_window, .. } => Some(*tooltip_window),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, State::Visible { .. })
    }

    /// Fade-in progress of the visible tooltip in `0.0..=1.0`; `0.0` when
    /// nothing is showing.
    pub fn opacity(&self, now: Instant, config: &InputConfig) -> f64 {
        match &self.state {
            State::Visible { shown_at, .. } => fade_opacity(*shown_at, now, config),
            _ => 0.0,
        }
    }

    /// Track the candidate under the cursor after a real pointer move.
    ///
    /// The same source refreshing its offer keeps the dwell timer running;
    /// a different source (or none) closes whatever is up and restarts the
    /// dwell for the newcomer.
    pub(crate) fn update_source(
        &mut self,
        offer: Option<TooltipOffer>,
        now: Instant,
    ) -> Option<TooltipClosed> {
        let same = match (&self.state, &offer) {
            (State::Pending { offer: current, .. }, Some(new))
            | (State::Visible { offer: current, .. }, Some(new)) => current.source == new.source,
            (State::Idle, None) => return None,
            _ => false,
        };
        if same {
            if let Some(new) = offer {
                match &mut self.state {
                    State::Pending { offer, .. } | State::Visible { offer, .. } => *offer = new,
                    State::Idle => {}
                }
            }
            return None;
        }
        let closed = self.close();
        if let Some(offer) = offer {
            self.state = State::Pending { offer, since: now };
        }
        closed
    }

    /// Drop any pending or visible tooltip. Only a visible one produces a
    /// [`TooltipClosed`] to finish.
    pub(crate) fn close(&mut self) -> Option<TooltipClosed> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Visible {
                offer,
                tooltip_window,
                ..
            } => Some(TooltipClosed {
                source: offer.source,
                window: tooltip_window,
            }),
            _ => None,
        }
    }

    /// Advance timers and compute where the tooltip window belongs.
    pub(crate) fn tick(
        &mut self,
        cursor: Point,
        now: Instant,
        config: &InputConfig,
        work_area: Rect,
    ) -> TooltipTick {
        match &self.state {
            State::Idle => TooltipTick::Idle,
            State::Pending { offer, since } => {
                if now.duration_since(*since) < config.tooltip_delay {
                    return TooltipTick::Idle;
                }
                let size = content_size(&offer.content, config);
                let rect = place(cursor, size, offer.force_field, config, work_area, 0.0);
                TooltipTick::Open { rect }
            }
            State::Visible {
                offer,
                tooltip_window,
                shown_at,
            } => {
                let opacity = fade_opacity(*shown_at, now, config);
                let size = content_size(&offer.content, config);
                let rect = place(cursor, size, offer.force_field, config, work_area, opacity);
                TooltipTick::Move {
                    window: *tooltip_window,
                    rect,
                }
            }
        }
    }

    /// The context opened the tooltip window requested by
    /// [`TooltipTick::Open`].
    pub(crate) fn opened(&mut self, window: WindowId, now: Instant) {
        if let State::Pending { offer, .. } = std::mem::replace(&mut self.state, State::Idle) {
            self.state = State::Visible {
                offer,
                tooltip_window: window,
                shown_at: now,
            };
        }
    }
}

fn fade_opacity(shown_at: Instant, now: Instant, config: &InputConfig) -> f64 {
    let fade = config.tooltip_fade_in.as_secs_f64();
    if fade <= 0.0 {
        return 1.0;
    }
    (now.duration_since(shown_at).as_secs_f64() / fade).clamp(0.0, 1.0)
}

fn content_size(content: &Tooltip, config: &InputConfig) -> Size {
    if content.size.width > 0.0 && content.size.height > 0.0 {
        content.size
    } else {
        config.tooltip_size
    }
}

fn place(
    cursor: Point,
    size: Size,
    force_field: Option<Rect>,
    config: &InputConfig,
    work_area: Rect,
    opacity: f64,
) -> Rect {
    let offset = config.tooltip_offset;
    let mut x = cursor.x + offset.x;
    let mut y = cursor.y + offset.y;
    if x + size.width > work_area.x1 {
        x = cursor.x - offset.x - size.width;
    }
    if y + size.height > work_area.y1 {
        y = cursor.y - offset.y - size.height;
    }
    let mut desired = Point::new(
        clamp_span(x, size.width, work_area.x0, work_area.x1),
        clamp_span(y, size.height, work_area.y0, work_area.y1),
    );

    if let Some(field) = force_field {
        let push = config.tooltip_force_field_offset;
        if Rect::from_origin_size(desired, size).overlaps(field) {
            desired.y = if cursor.y < field.center().y {
                field.y0 - size.height - push.y
            } else {
                field.y1 + push.y
            };
        }
        if Rect::from_origin_size(desired, size).overlaps(field) {
            desired.x = if cursor.x < field.center().x {
                field.x0 - size.width - push.x
            } else {
                field.x1 + push.x
            };
        }
        desired.x = clamp_span(desired.x, size.width, work_area.x0, work_area.x1);
        desired.y = clamp_span(desired.y, size.height, work_area.y0, work_area.y1);
    }

    let ease = (1.0 - opacity).powi(3);
    let origin = Point::new(
        desired.x + config.tooltip_slide.x * ease,
        desired.y + config.tooltip_slide.y * ease,
    );
    Rect::from_origin_size(origin, size)
}

/// Clamp `start` so `start..start + extent` stays within `lo..hi` when it
/// fits, preferring the near edge when it does not.
fn clamp_span(start: f64, extent: f64, lo: f64, hi: f64) -> f64 {
    start.clamp(lo, (hi - extent).max(lo))
}
