//! Tests for keyboard focus.
//!
//! These tests verify:
//! - An uncaptured press focuses the leafmost focusable widget under it
//! - A focus reply from a handler preempts the pointer fallback
//! - Transfers notify in order: focus-changing over the old then new
//!   path, focus-lost on the old leaf, focus-received on the new
//! - Tab cycles forward, Shift+Tab backward, both wrapping
//! - Disabled and invisible subtrees are pruned from traversal
//! - Removing the focus leaf re-anchors on the nearest live focusable
//!   ancestor
//! - Refocusing the current leaf fires no notifications

use wicket_test::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
fn test_press_focuses_the_leafmost_focusable() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 300.0, 300.0));
    let form = harness
        .insert(panel, log.probe("form").focusable(), rect(0.0, 0.0, 300.0, 300.0))
        .unwrap();
    let field = harness
        .insert(form, log.probe("field").focusable(), rect(100.0, 100.0, 200.0, 200.0))
        .unwrap();
    harness.frame();

    harness.press(150.0, 150.0);
    assert_eq!(harness.ctx.focused(), Some(field));
    assert!(log.contains("field:focus_received:Pointer"));

    // Pressing beside the field but inside the form focuses the form.
    harness.release(150.0, 150.0);
    harness.press(50.0, 50.0);
    assert_eq!(harness.ctx.focused(), Some(form));
}

#[test]
fn test_focus_reply_preempts_the_pointer_fallback() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 300.0, 300.0));
    let field = harness
        .insert(panel, log.probe("field").focusable(), rect(0.0, 0.0, 100.0, 100.0))
        .unwrap();
    harness
        .insert(
            panel,
            log.probe("button").focusable().on_event(move |_, _, event| match event {
                WidgetEvent::PointerDown(_) => Reply::handled().set_focus(field),
                _ => Reply::unhandled(),
            }),
            rect(100.0, 0.0, 300.0, 300.0),
        )
        .unwrap();
    harness.frame();

    harness.press(200.0, 150.0);
    assert_eq!(
        harness.ctx.focused(),
        Some(field),
        "the handler's focus choice must stand"
    );
    assert!(log.contains("field:focus_received:Programmatic"));
    assert!(
        !log.contains("button:focus_received:Pointer"),
        "the fallback must not run after a dispatched focus move"
    );
}

#[test]
fn test_transfer_notification_order() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 200.0));
    harness
        .insert(
            panel,
            log.probe("a").focusable().log_focus_changing(),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness
        .insert(
            panel,
            log.probe("b").focusable().log_focus_changing(),
            rect(200.0, 0.0, 400.0, 200.0),
        )
        .unwrap();
    harness.frame();

    harness.press(100.0, 100.0);
    harness.release(100.0, 100.0);
    log.clear();

    harness.press(300.0, 100.0);
    assert_eq!(
        log.take(),
        vec![
            "b:pointer_down",
            "a:focus_changing",
            "b:focus_changing",
            "a:focus_lost:Pointer",
            "b:focus_received:Pointer",
        ],
        "the old path hears the change before the new one, then lost before received"
    );
}

#[test]
fn test_tab_cycles_and_wraps() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (window, panel) = harness.window_with_root(rect(0.0, 0.0, 600.0, 200.0));
    let a = harness
        .insert(panel, log.probe("a").focusable(), rect(0.0, 0.0, 200.0, 200.0))
        .unwrap();
    let b = harness
        .insert(panel, log.probe("b").focusable(), rect(200.0, 0.0, 400.0, 200.0))
        .unwrap();
    let c = harness
        .insert(panel, log.probe("c").focusable(), rect(400.0, 0.0, 600.0, 200.0))
        .unwrap();
    harness.frame();
    harness.ctx.window_activated(window);

    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(a), "first tab lands on the first focusable");
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(b));
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(c));
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(a), "tab wraps past the end");

    harness.translator.set_modifiers(Modifiers::SHIFT);
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(c), "shift-tab wraps backwards");
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(b));
}

#[test]
fn test_handled_tab_does_not_move_focus() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (window, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 200.0));
    let editor = harness
        .insert(
            panel,
            log.probe("editor").focusable().handling("key_down"),
            rect(0.0, 0.0, 200.0, 200.0),
        )
        .unwrap();
    harness
        .insert(panel, log.probe("other").focusable(), rect(200.0, 0.0, 400.0, 200.0))
        .unwrap();
    harness.frame();
    harness.ctx.window_activated(window);
    harness.ctx.set_focus(editor, FocusCause::Programmatic);

    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(
        harness.ctx.focused(),
        Some(editor),
        "a widget that consumes tab keeps focus"
    );
}

#[test]
fn test_disabled_and_hidden_are_pruned_from_traversal() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (window, panel) = harness.window_with_root(rect(0.0, 0.0, 600.0, 200.0));
    let a = harness
        .insert(panel, log.probe("a").focusable(), rect(0.0, 0.0, 200.0, 200.0))
        .unwrap();
    let b = harness
        .insert(panel, log.probe("b").focusable(), rect(200.0, 0.0, 400.0, 200.0))
        .unwrap();
    let c = harness
        .insert(panel, log.probe("c").focusable(), rect(400.0, 0.0, 600.0, 200.0))
        .unwrap();
    harness.frame();
    harness.ctx.window_activated(window);
    harness.ctx.set_enabled(b, false).unwrap();

    harness.ctx.set_focus(a, FocusCause::Programmatic);
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(c), "disabled widgets are skipped");

    harness.ctx.set_enabled(b, true).unwrap();
    harness.ctx.set_visible(b, false).unwrap();
    harness.ctx.set_focus(a, FocusCause::Programmatic);
    harness.key(Key::Named(NamedKey::Tab));
    assert_eq!(harness.ctx.focused(), Some(c), "hidden widgets are skipped");
}

#[test]
fn test_removing_the_focus_leaf_reanchors_on_an_ancestor() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 300.0, 300.0));
    let form = harness
        .insert(panel, log.probe("form").focusable(), rect(0.0, 0.0, 300.0, 300.0))
        .unwrap();
    let field = harness
        .insert(form, log.probe("field").focusable(), rect(100.0, 100.0, 200.0, 200.0))
        .unwrap();
    harness.frame();

    harness.press(150.0, 150.0);
    harness.release(150.0, 150.0);
    assert_eq!(harness.ctx.focused(), Some(field));
    log.clear();

    harness.ctx.remove_widget(field).unwrap();
    assert_eq!(
        harness.ctx.focused(),
        Some(form),
        "focus falls back along the old path"
    );
    assert!(log.contains("form:focus_received:OtherWidgetLostFocus"));
}

#[test]
fn test_refocusing_the_same_leaf_is_silent() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 300.0, 300.0));
    harness
        .insert(panel, log.probe("field").focusable(), rect(0.0, 0.0, 300.0, 300.0))
        .unwrap();
    harness.frame();

    harness.click(150.0, 150.0);
    harness.click(150.0, 150.0);
    assert_eq!(
        log.count("field:focus_received:Pointer"),
        1,
        "pressing the focused widget again must not re-notify"
    );
    assert!(!log.contains("field:focus_lost:Pointer"));
}
