//! Tests for window and application activation.
//!
//! These tests verify:
//! - Deactivating a window stashes its focus leaf; reactivating restores
//!   it with a window-activate cause
//! - Deactivating a window dismisses the menus it owns
//! - Application deactivation tears down captures, focus, menus, and
//!   interaction flags in one sweep
//! - Ticks while the application is inactive do not synthesize hover
//!   refreshes; reactivation catches hover up again

use wicket_test::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
fn test_reactivation_restores_the_stashed_focus() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (main, main_root) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let field = harness
        .insert(main_root, log.probe("field").focusable(), rect(0.0, 0.0, 400.0, 300.0))
        .unwrap();
    let (other, other_root) = harness.window_with_root(rect(500.0, 0.0, 900.0, 300.0));
    harness
        .insert(other_root, log.probe("scratch").focusable(), rect(500.0, 0.0, 900.0, 300.0))
        .unwrap();
    harness.frame();

    harness.ctx.window_activated(main);
    harness.click(100.0, 150.0);
    assert_eq!(harness.ctx.focused(), Some(field));

    harness.ctx.window_deactivated(main);
    harness.ctx.window_activated(other);
    harness.click(600.0, 150.0);
    log.clear();

    harness.ctx.window_activated(main);
    assert_eq!(harness.ctx.focused(), Some(field));
    assert_eq!(
        log.take(),
        vec![
            "scratch:focus_lost:WindowActivate",
            "field:focus_received:WindowActivate",
        ]
    );
}

#[test]
fn test_deactivating_a_window_dismisses_its_menus() {
    let mut harness = TestHarness::new();
    let (main, _) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    harness.ctx.window_activated(main);
    let m0 = harness.ctx.open_menu(rect(400.0, 0.0, 500.0, 200.0), main).unwrap();
    let m1 = harness.ctx.open_menu(rect(500.0, 0.0, 600.0, 200.0), m0).unwrap();

    harness.ctx.window_deactivated(main);
    assert!(harness.ctx.menus().is_empty());
    assert!(!harness.ctx.windows().contains(m0));
    assert!(!harness.ctx.windows().contains(m1));
}

#[test]
fn test_app_deactivation_resets_interaction_state() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (main, main_root) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let field = harness
        .insert(main_root, log.probe("field").focusable(), rect(0.0, 0.0, 200.0, 300.0))
        .unwrap();
    harness
        .insert(
            main_root,
            log.probe("grip").on_event(|_, this, event| match event {
                WidgetEvent::PointerDown(_) => Reply::handled()
                    .capture_pointer(this.widget)
                    .prevent_throttling(),
                _ => Reply::unhandled(),
            }),
            rect(200.0, 0.0, 400.0, 300.0),
        )
        .unwrap();
    harness.frame();

    harness.ctx.window_activated(main);
    harness.click(100.0, 150.0);
    assert_eq!(harness.ctx.focused(), Some(field));
    harness.press(300.0, 150.0);
    assert!(harness.ctx.captures().has_captor(PointerIndex::CURSOR));
    assert!(harness.ctx.prevent_throttling());
    // Opened after the presses so the outside-click pre-pass leaves it be.
    let menu = harness.ctx.open_menu(rect(400.0, 0.0, 500.0, 200.0), main).unwrap();
    log.clear();

    harness.ctx.set_app_active(false);
    assert_eq!(harness.ctx.focused(), None);
    assert!(!harness.ctx.captures().has_captor(PointerIndex::CURSOR));
    assert!(!harness.ctx.prevent_throttling());
    assert!(harness.ctx.menus().is_empty());
    assert!(!harness.ctx.windows().contains(menu));
    assert_eq!(harness.ctx.active_window(), None);
    assert!(log.contains("field:focus_lost:OtherWidgetLostFocus"));
    assert!(log.contains("grip:capture_lost"));
}

#[test]
fn test_ticks_while_inactive_skip_hover_synthesis() {
    let mut harness = TestHarness::new();
    let log = EventLog::new();
    let (_, panel) = harness.window_with_root(rect(0.0, 0.0, 400.0, 300.0));
    let card = harness
        .insert(panel, log.probe("card"), rect(100.0, 100.0, 300.0, 200.0))
        .unwrap();
    harness.frame();

    harness.move_to(150.0, 150.0);
    assert!(log.contains("card:pointer_enter"));
    log.clear();

    harness.ctx.set_app_active(false);
    // The widget slides out from under the stationary cursor.
    harness.ctx.arrange(card, rect(100.0, 400.0, 300.0, 500.0)).unwrap();
    harness.frame();
    harness.tick();
    assert!(
        log.is_empty(),
        "no hover refresh may run while the application is inactive"
    );

    harness.ctx.set_app_active(true);
    harness.tick();
    assert_eq!(log.take(), vec!["card:pointer_leave"]);
}
