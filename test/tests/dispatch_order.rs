//! Tests for event traversal order and reply timing.
//!
//! These tests verify:
//! - Presses tunnel a preview pass root-to-leaf, then bubble leaf-to-root
//! - A handled preview stops the descent and suppresses the bubble; a
//!   handled bubble stops the climb
//! - Reply side effects apply before the next widget in the pass runs
//! - Wheel and gesture input bubbles without a preview pass, trying the
//!   gesture before the wheel on each widget
//! - Key and character events follow the focus path, not the cursor
//! - A disabled widget cuts its whole subtree out of the pointer path

use wicket_test::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

/// root > mid > leaf, all logging previews, stacked on one spot.
fn nested(harness: &mut TestHarness, log: &EventLog) -> (WidgetId, WidgetId, WidgetId) {
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(panel, log.probe("root").log_preview(), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    let mid = harness
        .insert(root, log.probe("mid").log_preview(), rect(50.0, 50.0, 350.0, 250.0))
        .unwrap();
    let leaf = harness
        .insert(mid, log.probe("leaf").log_preview(), rect(100.0, 100.0, 300.0, 200.0))
        .unwrap();
    harness.frame();
    (root, mid, leaf)
}

#[test]
fn test_press_tunnels_then_bubbles() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    nested(&mut harness, &log);

    harness.press(150.0, 150.0);
    assert_eq!(
        log.take(),
        vec![
            "root:preview:pointer_down",
            "mid:preview:pointer_down",
            "leaf:preview:pointer_down",
            "leaf:pointer_down",
            "mid:pointer_down",
            "root:pointer_down",
        ]
    );
}

#[test]
fn test_handled_preview_stops_descent_and_bubble() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(panel, log.probe("root").log_preview(), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    let mid = harness
        .insert(
            root,
            log.probe("mid").log_preview().handling_preview("pointer_down"),
            rect(50.0, 50.0, 350.0, 250.0),
        )
        .unwrap();
    harness
        .insert(mid, log.probe("leaf").log_preview(), rect(100.0, 100.0, 300.0, 200.0))
        .unwrap();
    harness.frame();

    harness.press(150.0, 150.0);
    assert_eq!(
        log.take(),
        vec!["root:preview:pointer_down", "mid:preview:pointer_down"],
        "a handled preview must silence everything below and the whole bubble"
    );
}

#[test]
fn test_handled_bubble_stops_the_climb() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(panel, log.probe("root"), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    let mid = harness
        .insert(root, log.probe("mid").handling("pointer_down"), rect(50.0, 50.0, 350.0, 250.0))
        .unwrap();
    harness
        .insert(mid, log.probe("leaf"), rect(100.0, 100.0, 300.0, 200.0))
        .unwrap();
    harness.frame();

    harness.press(150.0, 150.0);
    assert_eq!(
        log.take(),
        vec!["leaf:pointer_down", "mid:pointer_down"],
        "the widget above the handler must not see the event"
    );
}

#[test]
fn test_reply_side_effects_land_before_the_next_widget() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let observed = log.clone();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(
            panel,
            log.probe("root").log_moves().on_event(move |cx, _, event| {
                if matches!(event, WidgetEvent::PointerDown(_))
                    && cx.pointer_captor(PointerIndex::CURSOR).is_some()
                {
                    observed.push("root", "saw_capture");
                }
                Reply::unhandled()
            }),
            rect(0.0, 0.0, 400.0, 300.0),
        )
        .unwrap();
    let mid = harness
        .insert(root, log.probe("mid").log_moves(), rect(50.0, 50.0, 350.0, 250.0))
        .unwrap();
    let leaf = harness
        .insert(
            mid,
            log.probe("leaf").log_moves().on_event(|_, this, event| match event {
                // An unhandled reply still carries its side effects.
                WidgetEvent::PointerDown(_) => Reply::unhandled().capture_pointer(this.widget),
                _ => Reply::unhandled(),
            }),
            rect(100.0, 100.0, 300.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.move_to(150.0, 150.0);
    log.clear();
    harness.press(150.0, 150.0);
    assert_eq!(
        log.take(),
        vec![
            "leaf:pointer_down",
            "mid:pointer_down",
            "root:pointer_down",
            "root:saw_capture",
        ],
        "the bubble continues past an unhandled reply, but its capture is already in"
    );
    assert_eq!(harness.ctx.pointer_captor(PointerIndex::CURSOR), Some(leaf));

    harness.move_to(30.0, 30.0);
    assert_eq!(
        log.take(),
        vec!["leaf:pointer_move"],
        "once captured, moves go to the captor alone"
    );
}

#[test]
fn test_gesture_is_tried_before_wheel() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(panel, log.probe("root").log_preview(), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    harness
        .insert(
            root,
            log.probe("pane").log_preview().handling("gesture"),
            rect(50.0, 50.0, 350.0, 250.0),
        )
        .unwrap();
    harness.frame();

    let mut event = PointerEvent::new(PointerIndex::CURSOR, Point::new(150.0, 150.0));
    event.wheel = Some(Vec2::new(0.0, -40.0));
    event.gesture = Some(Gesture::Zoom(1.2));
    assert!(harness.ctx.wheel_or_gesture(event));

    assert_eq!(
        log.take(),
        vec!["pane:gesture"],
        "no preview pass, and the handled gesture swallows the wheel"
    );
}

#[test]
fn test_unhandled_gesture_falls_back_to_the_wheel() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let root = harness
        .insert(panel, log.probe("root"), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    harness
        .insert(root, log.probe("pane").handling("wheel"), rect(50.0, 50.0, 350.0, 250.0))
        .unwrap();
    harness.frame();

    let mut event = PointerEvent::new(PointerIndex::CURSOR, Point::new(150.0, 150.0));
    event.wheel = Some(Vec2::new(0.0, -40.0));
    event.gesture = Some(Gesture::Rotate(0.3));
    assert!(harness.ctx.wheel_or_gesture(event));

    assert_eq!(
        log.take(),
        vec!["pane:gesture", "pane:wheel"],
        "both kinds visit the widget, gesture first, before the walk moves up"
    );
}

#[test]
fn test_key_and_char_events_follow_focus() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    harness
        .insert(
            panel,
            log.probe("field").focusable().handling("key_down"),
            rect(0.0, 0.0, 200.0, 300.0),
        )
        .unwrap();
    harness
        .insert(panel, log.probe("other"), rect(200.0, 0.0, 400.0, 300.0))
        .unwrap();
    harness.frame();

    harness.click(100.0, 150.0);
    // Park the cursor over the other widget; keys must ignore it.
    harness.move_to(300.0, 150.0);
    log.clear();

    assert!(harness.key_down(Key::Character('a')));
    harness.type_char('a');
    assert!(log.contains("field:key_down"));
    assert!(log.contains("field:char"));
    assert!(!log.contains("other:key_down"));
    assert!(!log.contains("other:char"));
}

#[test]
fn test_disabled_widget_cuts_off_its_subtree() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, mid, _) = nested(&mut harness, &log);

    harness.ctx.set_enabled(mid, false).unwrap();
    harness.press(150.0, 150.0);
    assert_eq!(
        log.take(),
        vec!["root:preview:pointer_down", "root:pointer_down"],
        "the pointer path ends above the disabled widget"
    );
}
