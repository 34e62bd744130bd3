#![forbid(unsafe_code)]

//! Property tests over random operation sequences.
//!
//! After every step:
//!
//! 1. document listener count equals `is_open as usize`
//! 2. `#root[aria-hidden]` is set iff open
//! 3. body scroll lock is set iff open
//! 4. the host has something mounted iff open

use proptest::prelude::*;
use veil_core::KeyCode;
use veil_harness::{FakeDocument, TestHost};
use veil_modal::{ModalConfig, OpenState, ToggleMode};

#[derive(Debug, Clone, Copy)]
enum Op {
    ToggleOrOpen,
    Open,
    Close,
    Render,
    PointerOutside,
    PointerInside,
    PointerNowhere,
    Escape,
    Enter,
    ClickClose,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::ToggleOrOpen),
        Just(Op::Open),
        Just(Op::Close),
        Just(Op::Render),
        Just(Op::PointerOutside),
        Just(Op::PointerInside),
        Just(Op::PointerNowhere),
        Just(Op::Escape),
        Just(Op::Enter),
        Just(Op::ClickClose),
    ]
}

fn apply(doc: &FakeDocument, host: &TestHost, op: Op) {
    match op {
        Op::ToggleOrOpen => host.toggle_or_open(),
        Op::Open => host.open(),
        Op::Close => host.close(),
        Op::Render => host.render(),
        Op::PointerOutside => {
            let outside = doc.create_in_page("section");
            doc.pointer_down(&outside);
        }
        Op::PointerInside => {
            if let Some(text) = host.text_node() {
                doc.pointer_down(&text);
            }
        }
        Op::PointerNowhere => {
            doc.pointer_down_nowhere();
        }
        Op::Escape => {
            doc.key_down(KeyCode::Escape);
        }
        Op::Enter => {
            host.press_on_close(KeyCode::Enter);
        }
        Op::ClickClose => {
            host.click_close();
        }
    }
}

fn assert_consistent(doc: &FakeDocument, host: &TestHost) -> Result<(), TestCaseError> {
    let open = host.is_open();
    prop_assert_eq!(doc.listener_count(), usize::from(open));
    prop_assert_eq!(doc.root_aria_hidden().is_some(), open);
    prop_assert_eq!(doc.body_style().is_some(), open);
    prop_assert_eq!(host.is_mounted(), open);
    Ok(())
}

proptest! {
    #[test]
    fn side_effects_track_open_state(
        ops in proptest::collection::vec(op_strategy(), 0..40),
        open_only in any::<bool>(),
    ) {
        let mode = if open_only { ToggleMode::OpenOnly } else { ToggleMode::Toggle };
        let doc = FakeDocument::new();
        let host = TestHost::with_config(&doc, "p", ModalConfig::default().toggle_mode(mode));
        for op in ops {
            apply(&doc, &host, op);
            assert_consistent(&doc, &host)?;
        }
    }

    #[test]
    fn toggle_parity(n in 0usize..32) {
        let doc = FakeDocument::new();
        let host = TestHost::new(&doc, "p");
        for _ in 0..n {
            host.toggle_or_open();
        }
        let expected = if n % 2 == 1 { OpenState::Open } else { OpenState::Closed };
        prop_assert_eq!(host.state(), expected);
    }

    #[test]
    fn closed_projection_is_empty_for_any_content(content in proptest::option::of(".*")) {
        let doc = FakeDocument::new();
        let host = TestHost::new(&doc, "p");
        prop_assert!(host.handle().project_content(content).is_empty());
    }

    #[test]
    fn teardown_after_any_sequence_leaves_document_clean(
        ops in proptest::collection::vec(op_strategy(), 0..20),
    ) {
        let doc = FakeDocument::new();
        let mut host = TestHost::new(&doc, "p");
        for op in ops {
            apply(&doc, &host, op);
        }
        host.teardown();
        prop_assert_eq!(doc.listener_count(), 0);
        prop_assert_eq!(doc.root_aria_hidden(), None);
        prop_assert_eq!(doc.body_style(), None);
        prop_assert!(!host.is_mounted());
    }
}
