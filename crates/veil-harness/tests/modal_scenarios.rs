#![forbid(unsafe_code)]

//! End-to-end modal scenarios against the in-memory document.
//!
//! # Dismissal Paths
//!
//! | Input | While open | While closed |
//! |-------|------------|--------------|
//! | pointer down outside frame | closes | nothing |
//! | pointer down inside frame | stays open | nothing |
//! | Escape press | closes (accessible) | nothing |
//! | close button click / Enter / Space | closes | not mounted |
//!
//! # Invariants
//!
//! 1. **Listener parity**: the document holds one listener while open, zero
//!    otherwise.
//! 2. **Root flag restore**: `aria-hidden` on `#root` is `true` while open and
//!    returns to its prior value on close.
//! 3. **No listener after teardown**: input after teardown reaches nothing.
//!
//! Run: `cargo test -p veil-harness --test modal_scenarios`

use pretty_assertions::assert_eq;
use veil_core::{KeyCode, KeyEvent, KeyEventKind, Node};
use veil_harness::{FakeDocument, TestHost, init_test_logging};
use veil_modal::{ModalConfig, OpenState, ToggleMode};

// =============================================================================
// Test Utilities
// =============================================================================

/// Emit a JSONL log entry (for CI artifact review).
fn log_jsonl(test: &str, check: &str, passed: bool, notes: &str) {
    eprintln!(
        "{{\"test\":\"{test}\",\"check\":\"{check}\",\"passed\":{passed},\"notes\":\"{notes}\"}}"
    );
}

fn open_host(doc: &std::rc::Rc<FakeDocument>, text: &str) -> TestHost {
    init_test_logging();
    let host = TestHost::new(doc, text);
    host.toggle_or_open();
    assert!(host.is_open(), "toggle_or_open should open a closed modal");
    host
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn hello_then_outside_pointer_closes() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "hello");

    let projection = host.handle().project_content("hello");
    assert_eq!(projection.content(), Some(&"hello"));
    assert_eq!(host.rendered_text().as_deref(), Some("hello"));

    let outside = doc.create_in_page("main");
    doc.pointer_down(&outside);
    log_jsonl("hello", "outside_pointer", !host.is_open(), "");

    assert_eq!(host.state(), OpenState::Closed);
    assert!(host.handle().project_content("hello").is_empty());
    assert!(!host.is_mounted());
}

#[test]
fn double_toggle_returns_to_closed() {
    let doc = FakeDocument::new();
    let host = TestHost::new(&doc, "body");
    host.toggle_or_open();
    host.toggle_or_open();

    assert_eq!(host.state(), OpenState::Closed);
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.subscribed_total(), 1);
}

#[test]
fn open_only_mode_stays_open_on_second_call() {
    let doc = FakeDocument::new();
    let config = ModalConfig::default().toggle_mode(ToggleMode::OpenOnly);
    let host = TestHost::with_config(&doc, "body", config);
    host.toggle_or_open();
    host.toggle_or_open();

    log_jsonl("open_only", "second_call", host.is_open(), "");
    assert_eq!(host.state(), OpenState::Open);
    assert_eq!(doc.listener_count(), 1);

    assert!(host.click_close(), "close button must still dismiss");
    assert_eq!(host.state(), OpenState::Closed);
}

#[test]
fn rerender_while_open_keeps_single_listener() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "one");
    host.set_text("two");
    host.render();

    assert!(host.is_open());
    assert_eq!(doc.listener_count(), 1);
    assert_eq!(doc.subscribed_total(), 1);
    assert_eq!(host.rendered_text().as_deref(), Some("two"));
}

#[test]
fn reopen_acquires_fresh_registration() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");
    host.close();
    host.open();

    assert_eq!(doc.listener_count(), 1);
    assert_eq!(doc.subscribed_total(), 2);
}

// =============================================================================
// Pointer Dismissal
// =============================================================================

#[test]
fn pointer_inside_frame_keeps_open() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "inside");

    doc.pointer_down(&host.text_node().unwrap());
    doc.pointer_down(&host.frame().unwrap());
    assert!(host.is_open());
}

#[test]
fn pointer_on_backdrop_closes() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");

    doc.pointer_down(&host.backdrop().unwrap());
    assert!(!host.is_open());
}

#[test]
fn pointer_without_target_closes() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");

    doc.pointer_down_nowhere();
    assert!(!host.is_open());
}

#[test]
fn click_events_do_not_dismiss() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");
    let outside = doc.create_in_page("main");

    assert_eq!(doc.click(&outside), 0, "only pointer-down is observed");
    assert!(host.is_open());
}

#[test]
fn outside_pointer_can_be_disabled() {
    let doc = FakeDocument::new();
    let config = ModalConfig::default().close_on_outside_pointer(false);
    let host = TestHost::with_config(&doc, "x", config);
    host.open();

    doc.pointer_down(&doc.create_in_page("main"));
    assert!(host.is_open());
}

// =============================================================================
// Keyboard
// =============================================================================

#[test]
fn escape_closes_open_modal() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");

    doc.key_down(KeyCode::Escape);
    log_jsonl("escape", "closes", !host.is_open(), "");
    assert!(!host.is_open());
}

#[test]
fn escape_while_closed_is_noop() {
    let doc = FakeDocument::new();
    let host = TestHost::new(&doc, "x");

    assert_eq!(doc.key_down(KeyCode::Escape), 0);
    assert!(!host.is_open());
    assert_eq!(host.render_count(), 1);
}

#[test]
fn escape_release_and_repeat_are_ignored() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");

    doc.dispatch(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
    doc.dispatch(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Repeat));
    assert!(host.is_open());
}

#[test]
fn basic_variant_ignores_escape() {
    let doc = FakeDocument::new();
    let host = TestHost::with_config(&doc, "x", ModalConfig::basic());
    host.open();

    doc.key_down(KeyCode::Escape);
    assert!(host.is_open());
    assert_eq!(doc.root_aria_hidden(), None, "basic variant leaves root alone");
}

#[test]
fn close_button_is_in_tab_order_with_label() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");
    let button = host.close_button().unwrap();

    assert_eq!(button.attribute("tabindex").as_deref(), Some("0"));
    assert_eq!(button.attribute("role").as_deref(), Some("button"));
    assert_eq!(button.attribute("aria-label").as_deref(), Some("Close"));
}

#[test]
fn enter_and_space_on_close_button_dismiss() {
    for code in [KeyCode::Enter, KeyCode::Space] {
        let doc = FakeDocument::new();
        let host = open_host(&doc, "x");

        assert!(host.press_on_close(code), "{code:?} should activate");
        assert!(!host.is_open());
    }
}

#[test]
fn other_keys_on_close_button_are_ignored() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");

    assert!(!host.press_on_close(KeyCode::Char('a')));
    assert!(!host.press_on_close(KeyCode::Tab));
    assert!(host.is_open());
}

// =============================================================================
// Accessibility Side Effects
// =============================================================================

#[test]
fn frame_carries_dialog_semantics() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");
    let frame = host.frame().unwrap();

    assert_eq!(frame.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(frame.attribute("aria-modal").as_deref(), Some("true"));
    assert_eq!(
        host.content().unwrap().attribute("tabindex").as_deref(),
        Some("-1")
    );
}

#[test]
fn root_is_hidden_only_while_open() {
    let doc = FakeDocument::new();
    let host = TestHost::new(&doc, "x");
    assert_eq!(doc.root_aria_hidden(), None);

    host.open();
    assert_eq!(doc.root_aria_hidden().as_deref(), Some("true"));

    host.close();
    log_jsonl("root_flag", "restored", doc.root_aria_hidden().is_none(), "");
    assert_eq!(doc.root_aria_hidden(), None);
}

#[test]
fn root_flag_restores_prior_true() {
    let doc = FakeDocument::new();
    doc.root().unwrap().set_attribute("aria-hidden", "true");
    let host = TestHost::new(&doc, "x");

    host.open();
    host.close();
    assert_eq!(doc.root_aria_hidden().as_deref(), Some("true"));
}

#[test]
fn missing_root_is_tolerated() {
    let doc = FakeDocument::without_root();
    let host = open_host(&doc, "x");

    assert_eq!(doc.root_aria_hidden(), None);
    doc.key_down(KeyCode::Escape);
    assert!(!host.is_open());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn focus_moves_into_content_and_back() {
    let doc = FakeDocument::new();
    let opener = doc.create_in_page("button");
    veil_core::FocusTarget::focus(doc.as_ref(), &opener);

    let host = open_host(&doc, "x");
    let content = host.content().unwrap();
    assert_eq!(doc.focused().map(|n| n.id()), Some(content.id()));

    host.close();
    assert_eq!(doc.focused().map(|n| n.id()), Some(opener.id()));
}

#[test]
fn focus_not_restored_to_removed_opener() {
    let doc = FakeDocument::new();
    let opener = doc.create_in_page("button");
    veil_core::FocusTarget::focus(doc.as_ref(), &opener);

    let host = open_host(&doc, "x");
    opener.detach();
    host.close();
    assert!(doc.focused().is_none());
}

#[test]
fn scroll_locked_while_open() {
    let doc = FakeDocument::new();
    let host = open_host(&doc, "x");
    assert_eq!(doc.body_style().as_deref(), Some("overflow: hidden"));

    host.close();
    assert_eq!(doc.body_style(), None);
}

#[test]
fn scroll_lock_can_be_disabled() {
    let doc = FakeDocument::new();
    let host = TestHost::with_config(&doc, "x", ModalConfig::default().lock_scroll(false));
    host.open();
    assert_eq!(doc.body_style(), None);
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn teardown_while_open_releases_everything() {
    let doc = FakeDocument::new();
    let mut host = open_host(&doc, "x");
    let backdrop = host.backdrop().unwrap();

    host.teardown();
    log_jsonl("teardown", "listeners", doc.listener_count() == 0, "");
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.root_aria_hidden(), None);
    assert_eq!(doc.body_style(), None);
    assert!(!doc.is_connected(&backdrop));

    assert_eq!(doc.key_down(KeyCode::Escape), 0);
    assert_eq!(doc.pointer_down(&Node::new("div")), 0);
    assert!(!host.handle().is_alive());
}

#[test]
fn handle_after_teardown_is_inert() {
    let doc = FakeDocument::new();
    let mut host = TestHost::new(&doc, "x");
    host.teardown();

    host.open();
    host.toggle_or_open();
    assert_eq!(host.state(), OpenState::Closed);
    assert_eq!(doc.subscribed_total(), 0);
}
