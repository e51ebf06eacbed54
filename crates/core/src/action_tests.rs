// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn action_serializes_with_snake_case_tag() {
    let action = Action::ProjectSetStar { project_id: "p1".into(), starred: true };
    let value = serde_json::to_value(&action).unwrap();
    assert_eq!(value["type"], "project_set_star");
    assert_eq!(value["project_id"], "p1");
    assert_eq!(value["starred"], true);
}

#[test]
fn unknown_tag_is_rejected() {
    let raw = r#"{"type": "project_delete", "project_id": "p1"}"#;
    assert!(serde_json::from_str::<Action>(raw).is_err());
}

#[test]
fn malformed_payload_is_rejected() {
    // starred must be a bool
    let raw = r#"{"type": "project_set_star", "project_id": "p1", "starred": "yes"}"#;
    assert!(serde_json::from_str::<Action>(raw).is_err());
}

#[test]
fn worktree_merge_round_trips() {
    let action = Action::WorktreeMerge { thread_id: "project-acme".into() };
    let json = serde_json::to_string(&action).unwrap();
    let parsed: Action = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, action);
}

#[test]
fn type_name_matches_wire_tag_for_every_variant() {
    let actions = vec![
        Action::ProjectSetStar { project_id: "p".into(), starred: false },
        Action::ProjectSetHidden { project_id: "p".into(), hidden: true },
        Action::ProjectSetSuccess { project_id: "p".into(), note: None },
        Action::WorkOrderCreate { project_id: "p".into(), title: "t".into(), description: String::new() },
        Action::WorkOrderUpdate { workorder_id: "w".into(), title: None, description: None },
        Action::WorkOrderSetStatus { workorder_id: "w".into(), status: WorkOrderStatus::Done },
        Action::ReposRescan {},
        Action::WorkOrderStartRun { workorder_id: "w".into(), prompt: None },
        Action::WorktreeMerge { thread_id: "global".into() },
    ];
    for action in actions {
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], action.type_name());
        assert!(Action::ALL_TYPES.contains(&action.type_name()));
    }
}
