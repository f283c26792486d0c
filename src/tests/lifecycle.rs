use super::{needs_polling, DocumentStatus, MutationGate, MutationKind};

#[test]
fn test_labels() {
    assert_eq!(DocumentStatus::InProgress.label(), "IN PROGRESS");
    assert_eq!(DocumentStatus::Pending.label(), "PENDING");
    assert_eq!(DocumentStatus::Completed.to_string(), "COMPLETED");
    assert_eq!(DocumentStatus::Failed.label(), "FAILED");
}

#[test]
fn test_wire_format() {
    let status: DocumentStatus = serde_json::from_str("\"in_progress\"").unwrap();
    assert_eq!(status, DocumentStatus::InProgress);
    assert_eq!(
        serde_json::to_string(&DocumentStatus::Completed).unwrap(),
        "\"completed\""
    );
}

#[test]
fn test_terminal_states() {
    assert!(!DocumentStatus::Pending.is_terminal());
    assert!(!DocumentStatus::InProgress.is_terminal());
    assert!(DocumentStatus::Completed.is_terminal());
    assert!(DocumentStatus::Failed.is_terminal());
}

#[test]
fn test_forward_only_transitions() {
    use DocumentStatus::{Completed, Failed, InProgress, Pending};

    assert!(Pending.can_advance_to(InProgress));
    assert!(InProgress.can_advance_to(Completed));
    assert!(InProgress.can_advance_to(Failed));
    assert!(!Pending.can_advance_to(Completed));
    assert!(!Completed.can_advance_to(InProgress));
    assert!(!Failed.can_advance_to(Pending));
}

#[test]
fn test_polling_predicate() {
    use DocumentStatus::{Completed, Failed, InProgress, Pending};

    assert!(!needs_polling(&[]));
    assert!(!needs_polling(&[Completed, Failed]));
    assert!(needs_polling(&[Completed, InProgress]));
    assert!(needs_polling(&[Pending]));
}

#[test]
fn test_second_delete_refused_while_pending() {
    let mut gate = MutationGate::default();

    assert!(gate.try_begin(MutationKind::Delete));
    assert!(!gate.is_enabled(MutationKind::Delete));
    assert!(!gate.try_begin(MutationKind::Delete));

    gate.finish(MutationKind::Delete);
    assert!(gate.is_enabled(MutationKind::Delete));
    assert!(gate.try_begin(MutationKind::Delete));
}

#[test]
fn test_kinds_gate_independently() {
    let mut gate = MutationGate::default();

    assert!(gate.try_begin(MutationKind::Reset));
    assert!(gate.is_pending(MutationKind::Reset));
    assert!(gate.is_enabled(MutationKind::Delete));
    assert!(gate.is_enabled(MutationKind::Upload));
}
