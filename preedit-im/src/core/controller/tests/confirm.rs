use super::*;

// --- Confirming a composition ---

#[test]
fn test_commit_text_differs_from_composition() {
    let mut host = MemoryHost::new();
    let mut ctrl = InputMethodController::new();

    for text in ["n", "ni", "nih", "niha", "nihao"] {
        assert!(compose(&mut ctrl, &mut host, text));
    }
    host.take_log();
    assert!(ctrl.commit_text(&mut host, "OK", 0));
    assert_eq!(host.text(), "OK");
    assert!(!ctrl.has_composition(&host));
    assert_eq!(selection(&host), (2, 2));
    assert_eq!(
        host.log(),
        &[
            before_input(InputType::InsertFromComposition, "OK", false),
            composition(CompositionEventKind::Update, "OK"),
            deleted(0, "nihao"),
            inserted(0, "OK"),
            composition(CompositionEventKind::End, "OK"),
        ]
    );
}

#[test]
fn test_commit_text_with_relative_caret() {
    let mut host = MemoryHost::with_text("xy");
    let mut ctrl = InputMethodController::new();

    assert!(compose(&mut ctrl, &mut host, "ab"));
    assert!(ctrl.commit_text(&mut host, "cd", -1));
    assert_eq!(host.text(), "xycd");
    assert_eq!(selection(&host), (3, 3));
}

#[test]
fn test_commit_text_while_idle_inserts_at_caret() {
    let mut host = MemoryHost::with_text("ab");
    host.doc.set_caret(1);
    let mut ctrl = InputMethodController::new();

    assert!(ctrl.commit_text(&mut host, "X", 0));
    assert_eq!(host.text(), "aXb");
    assert_eq!(selection(&host), (2, 2));
    assert_eq!(
        host.log(),
        &[
            before_input(InputType::InsertText, "X", true),
            inserted(1, "X"),
        ]
    );
}

#[test]
fn test_commit_text_while_idle_can_be_cancelled() {
    let mut host = MemoryHost::with_text("ab");
    host.add_listener(|_, event| match event {
        HostEvent::BeforeInput { .. } => DispatchOutcome::Cancelled,
        _ => DispatchOutcome::NotCancelled,
    });
    let mut ctrl = InputMethodController::new();

    assert!(!ctrl.commit_text(&mut host, "X", 0));
    assert_eq!(host.text(), "ab");
    assert_eq!(host.mutation_count(), 0);
}

#[test]
fn test_commit_empty_text_while_idle() {
    let mut host = MemoryHost::with_text("ab");
    host.doc.set_caret(1);
    let mut ctrl = InputMethodController::new();

    assert!(ctrl.commit_text(&mut host, "", 0));
    assert!(host.log().is_empty());
    assert_eq!(selection(&host), (1, 1));

    assert!(ctrl.commit_text(&mut host, "", -1));
    assert!(host.log().is_empty());
    assert_eq!(selection(&host), (0, 0));
}

#[test]
fn test_finish_keeps_selection() {
    let mut host = MemoryHost::new();
    let mut ctrl = InputMethodController::new();

    assert!(ctrl.set_composition(&mut host, "nihao", &[], 2, 2));
    assert!(ctrl.finish_composing_text(&mut host, true));
    assert_eq!(host.text(), "nihao");
    assert!(ctrl.state().is_idle());
    assert_eq!(selection(&host), (2, 2));
    assert!(host.doc.markers().is_empty());
}

#[test]
fn test_finish_without_keep_moves_caret_to_end() {
    let mut host = MemoryHost::with_text("!");
    host.doc.set_caret(0);
    let mut ctrl = InputMethodController::new();

    assert!(ctrl.set_composition(&mut host, "abc", &[], 0, 0));
    assert!(ctrl.finish_composing_text(&mut host, false));
    assert_eq!(host.text(), "abc!");
    assert_eq!(selection(&host), (3, 3));
}

#[test]
fn test_finish_while_idle_returns_false() {
    let mut host = MemoryHost::with_text("abc");
    let mut ctrl = InputMethodController::new();

    assert!(!ctrl.finish_composing_text(&mut host, true));
    assert!(!ctrl.finish_composing_text(&mut host, false));
    assert!(host.log().is_empty());
}

#[test]
fn test_finish_releases_anchors() {
    let mut host = MemoryHost::new();
    let mut ctrl = InputMethodController::new();

    assert!(compose(&mut ctrl, &mut host, "abc"));
    assert_eq!(host.doc.anchor_count(), 2);
    assert!(ctrl.finish_composing_text(&mut host, true));
    assert_eq!(host.doc.anchor_count(), 0);
}

#[test]
fn test_will_change_focus_commits() {
    let mut host = MemoryHost::new();
    let mut ctrl = InputMethodController::new();

    assert!(ctrl.set_composition(&mut host, "abc", &[], 1, 1));
    assert!(ctrl.will_change_focus(&mut host));
    assert!(!ctrl.has_composition(&host));
    assert_eq!(host.text(), "abc");
    assert_eq!(selection(&host), (1, 1));

    assert!(!ctrl.will_change_focus(&mut host));
}

#[test]
fn test_will_change_focus_without_keeping_selection() {
    let mut host = MemoryHost::new();
    let mut ctrl = InputMethodController::with_config(ControllerConfig {
        keep_selection_on_focus_change: false,
        ..ControllerConfig::default()
    });

    assert!(ctrl.set_composition(&mut host, "abc", &[], 1, 1));
    assert!(ctrl.will_change_focus(&mut host));
    assert_eq!(selection(&host), (3, 3));
}
