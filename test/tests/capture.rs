//! Tests for pointer capture routing.
//!
//! These tests verify:
//! - Captured events go to the captor only, with no tunnel or bubble pass
//! - Capture holds the hover set on the captor's path
//! - The last button release auto-releases capture
//! - Replacing a captor (including self-recapture) signals capture-lost
//!   exactly once
//! - Cursor lock and high-precision mode ride on capture
//! - A removed captor invalidates the capture without stray deliveries

use wicket_test::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

/// A window with two side-by-side probes; the left one captures on press.
fn two_panes(harness: &mut TestHarness, log: &EventLog) -> (WidgetId, WidgetId, WidgetId) {
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 400.0, 200.0));
    let left = harness
        .insert(
            root,
            log.probe("left").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) => Reply::handled().capture_pointer(this.widget),
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    let right = harness
        .insert(root, log.probe("right"), rect(200.0, 0.0, 400.0, 200.0))
        .unwrap();
    harness.frame();
    (root, left, right)
}

#[test]
fn test_captured_events_skip_the_rest_of_the_tree() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_root, left, _right) = two_panes(&mut harness, &log);

    harness.press(100.0, 100.0);
    assert_eq!(harness.ctx.pointer_captor(PointerIndex::CURSOR), Some(left));
    log.clear();

    // The pointer is over "right" now, but capture owns the stream.
    harness.release(300.0, 100.0);
    assert!(
        log.contains("left:pointer_up"),
        "captor should receive the release"
    );
    assert!(
        !log.contains("right:pointer_up"),
        "the widget under the pointer must not see captured events"
    );
}

#[test]
fn test_capture_holds_the_hover_set() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    two_panes(&mut harness, &log);

    harness.move_to(100.0, 100.0);
    harness.press(100.0, 100.0);
    log.clear();

    // Crossing into the sibling while captured produces no hover churn.
    harness.move_to(300.0, 100.0);
    assert!(
        !log.contains("left:pointer_leave"),
        "captor path stays the hover set while captured"
    );
    assert!(!log.contains("right:pointer_enter"));

    // Releasing ends capture; the next move re-enters normally.
    harness.release(300.0, 100.0);
    harness.move_to(310.0, 100.0);
    assert!(log.contains("left:pointer_leave"));
    assert!(log.contains("right:pointer_enter"));
}

#[test]
fn test_last_button_up_auto_releases() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_root, left, _right) = two_panes(&mut harness, &log);

    harness.press(100.0, 100.0);
    harness.press_button(PointerButton::Secondary, 100.0, 100.0);
    harness.release(100.0, 100.0);
    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        Some(left),
        "capture must persist while any button is down"
    );

    harness.release_button(PointerButton::Secondary, 100.0, 100.0);
    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        None,
        "the last release ends the capture"
    );
    assert!(log.contains("left:capture_lost"));
}

#[test]
fn test_transferring_capture_notifies_the_old_captor_once() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 400.0, 200.0));
    let receiver = harness
        .insert(root, log.probe("receiver"), rect(200.0, 0.0, 400.0, 200.0))
        .unwrap();
    harness
        .insert(
            root,
            log.probe("holder").on_event(move |_, this, event| match event {
                WidgetEvent::PointerDown(_) => Reply::handled().capture_pointer(this.widget),
                WidgetEvent::PointerMove(_) => Reply::handled().capture_pointer(receiver),
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    log.clear();
    harness.move_to(110.0, 100.0);

    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        Some(receiver),
        "the reply hands the stream to the receiver"
    );
    assert_eq!(
        log.count("holder:capture_lost"),
        1,
        "the displaced captor hears about it exactly once"
    );

    harness.release(110.0, 100.0);
    assert!(
        log.contains("receiver:pointer_up"),
        "the new captor owns the stream"
    );
}

#[test]
fn test_recapturing_yourself_still_signals_capture_lost() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 200.0, 200.0));
    let holder = harness
        .insert(
            root,
            log.probe("holder").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) | WidgetEvent::PointerMove(_) => {
                    Reply::handled().capture_pointer(this.widget)
                }
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    log.clear();
    harness.move_to(110.0, 100.0);

    assert_eq!(harness.ctx.pointer_captor(PointerIndex::CURSOR), Some(holder));
    assert_eq!(
        log.count("holder:capture_lost"),
        1,
        "re-capturing yourself still goes through the lost notification"
    );
}

#[test]
fn test_release_reply_drops_capture_mid_stream() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 200.0, 200.0));
    let slider = harness
        .insert(
            root,
            log.probe("slider").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) => {
                    Reply::handled().capture_pointer(this.widget).prevent_throttling()
                }
                WidgetEvent::PointerMove(_) => Reply::handled().release_pointer_capture(),
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    assert_eq!(harness.ctx.pointer_captor(PointerIndex::CURSOR), Some(slider));
    assert!(harness.ctx.prevent_throttling());

    harness.move_to(120.0, 100.0);
    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        None,
        "a release reply from the captor ends the capture immediately"
    );
    assert!(log.contains("slider:capture_lost"));

    // Throttling resets with the last button release.
    harness.release(120.0, 100.0);
    assert!(!harness.ctx.prevent_throttling());
}

#[test]
fn test_cursor_lock_clamps_moves_to_the_widget() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 400.0, 200.0));
    let strip = harness
        .insert(
            root,
            log.probe("strip").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) => {
                    Reply::handled().capture_pointer(this.widget).lock_cursor(this.widget)
                }
                _ => Reply::handled(),
            }),
            rect(100.0, 50.0, 200.0, 150.0),
        )
        .unwrap();
    harness.frame();

    harness.press(150.0, 100.0);
    assert_eq!(harness.ctx.cursor_lock(), Some(strip));
    assert_eq!(
        harness.ctx.cursor_lock_rect(),
        Some(rect(100.0, 50.0, 200.0, 150.0))
    );

    // A move far outside lands clamped to the lock bounds.
    harness.move_to(390.0, 10.0);
    assert_eq!(harness.ctx.cursor_position(), Point::new(200.0, 50.0));

    // Releasing capture clears the lock.
    harness.release(150.0, 100.0);
    assert_eq!(harness.ctx.cursor_lock(), None);
}

#[test]
fn test_high_precision_mode_rides_on_capture() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root) = harness.window_with_root(rect(0.0, 0.0, 200.0, 200.0));
    let viewport = harness
        .insert(
            root,
            log.probe("viewport").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) => {
                    Reply::handled().use_high_precision_mouse(this.widget)
                }
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        Some(viewport),
        "high-precision mode implies capture"
    );
    assert_eq!(harness.ctx.high_precision_mouse(), Some(viewport));

    harness.release(100.0, 100.0);
    assert_eq!(
        harness.ctx.high_precision_mouse(),
        None,
        "mode ends with capture"
    );
}

#[test]
fn test_capture_request_for_another_window_is_rejected() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, root_a) = harness.window_with_root(rect(0.0, 0.0, 200.0, 200.0));
    let (_, root_b) = harness.window_with_root(rect(300.0, 0.0, 500.0, 200.0));
    let foreign = harness
        .insert(root_b, log.probe("foreign"), rect(300.0, 0.0, 500.0, 200.0))
        .unwrap();
    harness
        .insert(
            root_a,
            log.probe("grabby").on_event(move |_, _, event| match event {
                WidgetEvent::PointerDown(_) => Reply::handled().capture_pointer(foreign),
                _ => Reply::handled(),
            }),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    assert_eq!(
        harness.ctx.pointer_captor(PointerIndex::CURSOR),
        None,
        "capture requests must stay within the event's window"
    );
}

#[test]
fn test_removing_the_captor_invalidates_the_capture() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_root, left, _right) = two_panes(&mut harness, &log);

    harness.press(100.0, 100.0);
    harness.ctx.remove_widget(left).unwrap();
    log.clear();

    // The next captured event finds the captor dead and drops the entry.
    harness.move_to(120.0, 100.0);
    assert_eq!(harness.ctx.pointer_captor(PointerIndex::CURSOR), None);
    assert!(
        log.is_empty(),
        "no pointer events may be delivered for the dead captor's stream"
    );
}
