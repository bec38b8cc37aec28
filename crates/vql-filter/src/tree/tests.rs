//! Tests for the filter tree and its editor.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::filter::FilterCompiler;
use crate::mapping::{from_mapping, to_mapping};

fn recorder(editor: &mut FilterEditor) -> Rc<RefCell<Vec<TreeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    editor.subscribe(move |event: &TreeEvent| sink.borrow_mut().push(event.clone()));
    events
}

/// `AND[a=1, OR[b=2, c=3], d=4]`
fn sample_editor() -> FilterEditor {
    FilterEditor::with_tree(FilterCompiler::compile("a=1 AND (b=2 OR c=3) AND d=4").unwrap())
}

fn child(editor: &FilterEditor, parent: NodeId, index: usize) -> NodeId {
    editor.tree().children(parent)[index]
}

// ==================== Arena Tests ====================

#[test]
fn test_new_tree_is_empty_with_logic_root() {
    let tree = FilterTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 1);
    assert!(tree.root_node().is_logic());
    assert_eq!(tree.root_node().parent(), None);
    assert!(tree.is_consistent());
}

#[test]
fn test_from_expr_assigns_unique_ids() {
    let tree = FilterCompiler::compile("a=1 AND (b=2 OR c=3) AND d=4").unwrap();
    let ids = tree.depth_first();
    assert_eq!(ids.len(), 6);
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 6);
    assert!(tree.is_consistent());
}

#[test]
fn test_depth_first_is_preorder() {
    let tree = FilterCompiler::compile("a=1 AND (b=2 OR c=3) AND d=4").unwrap();
    let fields: Vec<String> = tree
        .depth_first()
        .into_iter()
        .map(|id| match tree.get(id).unwrap().kind() {
            NodeKind::Logic { operator, .. } => operator.to_string(),
            NodeKind::Condition(condition) => condition.field.to_string(),
        })
        .collect();
    assert_eq!(fields, vec!["AND", "a", "OR", "b", "c", "d"]);
}

#[test]
fn test_is_ancestor_and_depth() {
    let editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let b = child(&editor, or, 0);
    assert!(editor.tree().is_ancestor(root, b));
    assert!(editor.tree().is_ancestor(or, b));
    assert!(!editor.tree().is_ancestor(b, or));
    assert!(!editor.tree().is_ancestor(b, b));
    assert_eq!(editor.tree().depth(b), 2);
}

#[test]
fn test_clone_is_independent() {
    let mut editor = sample_editor();
    let snapshot = editor.tree().clone();
    editor.clear();
    assert!(editor.tree().is_empty());
    assert_eq!(snapshot.len(), 6);
}

// ==================== Editor: add ====================

#[test]
fn test_add_logic_and_condition() {
    let mut editor = FilterEditor::new();
    let events = recorder(&mut editor);
    let root = editor.tree().root();

    let or = editor.add_logic(root, BooleanOperator::Or).unwrap();
    let a = editor
        .add_condition(or, "ref", ComparisonOperator::Equal, "A")
        .unwrap();

    assert_eq!(editor.tree().children(root), &[or]);
    assert_eq!(editor.tree().children(or), &[a]);
    assert_eq!(editor.lookup(a).unwrap().parent(), Some(or));
    assert!(editor.tree().is_consistent());
    assert_eq!(
        *events.borrow(),
        vec![
            TreeEvent::Added {
                id: or,
                parent: root,
                position: 0
            },
            TreeEvent::Added {
                id: a,
                parent: or,
                position: 0
            },
        ]
    );
}

#[test]
fn test_add_under_condition_is_rejected() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    let before = editor.tree().clone();

    assert_eq!(
        editor.add_logic(a, BooleanOperator::And).unwrap_err(),
        StructuralError::NotALogicNode { id: a }
    );
    assert_eq!(
        editor
            .add_condition(a, "x", ComparisonOperator::Equal, 1)
            .unwrap_err(),
        StructuralError::NotALogicNode { id: a }
    );
    assert!(editor.tree().structurally_eq(&before));
    assert_eq!(editor.tree().len(), before.len());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_add_under_unknown_node() {
    let mut editor = FilterEditor::new();
    let missing = NodeId::from(99);
    assert_eq!(
        editor.add_logic(missing, BooleanOperator::Or).unwrap_err(),
        StructuralError::UnknownNode { id: missing }
    );
}

#[test]
fn test_ids_are_not_reused() {
    let mut editor = FilterEditor::new();
    let root = editor.tree().root();
    let first = editor
        .add_condition(root, "a", ComparisonOperator::Equal, 1)
        .unwrap();
    editor.remove(first).unwrap();
    let second = editor
        .add_condition(root, "a", ComparisonOperator::Equal, 1)
        .unwrap();
    assert_ne!(first, second);
}

// ==================== Editor: remove ====================

#[test]
fn test_remove_drops_subtree() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let b = child(&editor, or, 0);

    editor.remove(or).unwrap();

    assert_eq!(editor.tree().len(), 3);
    assert!(editor.lookup(b).is_err());
    assert!(editor.tree().is_consistent());
    assert_eq!(*events.borrow(), vec![TreeEvent::Removed { ids: vec![or] }]);
}

#[test]
fn test_remove_root_is_rejected() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    assert_eq!(editor.remove(root).unwrap_err(), StructuralError::RootRemoval);
    assert_eq!(editor.tree().len(), 6);
}

#[test]
fn test_clear_keeps_root() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    editor.clear();
    assert_eq!(editor.tree().root(), root);
    assert!(editor.tree().is_empty());
    assert_eq!(editor.tree().len(), 1);
    assert_eq!(*events.borrow(), vec![TreeEvent::Cleared]);
}

#[test]
fn test_remove_field() {
    let mut editor = FilterEditor::with_tree(
        FilterCompiler::compile("ref=A AND (ref=G OR pos>1) AND chr=chr1").unwrap(),
    );
    let events = recorder(&mut editor);

    let removed = editor.remove_field(&FieldPath::new("ref"));

    assert_eq!(removed, 2);
    assert_eq!(
        to_mapping(editor.tree()),
        json!({"$and": [
            {"$or": [{"field": "pos", "operator": "$gt", "value": 1}]},
            {"field": "chr", "operator": "$eq", "value": "chr1"}
        ]})
    );
    assert_eq!(events.borrow().len(), 1);

    assert_eq!(editor.remove_field(&FieldPath::new("ref")), 0);
    assert_eq!(events.borrow().len(), 1);
}

// ==================== Editor: move ====================

#[test]
fn test_move_into_other_parent() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    let or = child(&editor, root, 1);

    editor.move_node(a, or, 1).unwrap();

    assert_eq!(editor.tree().children(or)[1], a);
    assert_eq!(editor.tree().children(or).len(), 3);
    assert_eq!(editor.tree().children(root).len(), 2);
    assert_eq!(editor.lookup(a).unwrap().parent(), Some(or));
    assert!(editor.tree().is_consistent());
    assert_eq!(
        *events.borrow(),
        vec![TreeEvent::Moved {
            id: a,
            from: root,
            to: or,
            position: 1
        }]
    );
}

#[test]
fn test_move_within_parent_uses_post_detach_index() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    let or = child(&editor, root, 1);
    let d = child(&editor, root, 2);

    editor.move_node(a, root, 1).unwrap();
    assert_eq!(editor.tree().children(root), &[or, a, d]);

    editor.move_node(a, root, 100).unwrap();
    assert_eq!(editor.tree().children(root), &[or, d, a]);
}

#[test]
fn test_move_under_self_is_rejected() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let before = editor.tree().clone();

    assert_eq!(
        editor.move_node(or, or, 0).unwrap_err(),
        StructuralError::WouldCreateCycle {
            node: or,
            target: or
        }
    );
    assert!(editor.tree().structurally_eq(&before));
    assert!(events.borrow().is_empty());
}

#[test]
fn test_move_under_descendant_is_rejected() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let inner = editor.add_logic(or, BooleanOperator::And).unwrap();
    let before = editor.tree().clone();

    assert_eq!(
        editor.move_node(or, inner, 0).unwrap_err(),
        StructuralError::WouldCreateCycle {
            node: or,
            target: inner
        }
    );
    let b = child(&editor, or, 0);
    assert!(editor.move_node(or, b, 0).is_err());
    assert!(editor.tree().structurally_eq(&before));
    assert!(editor.tree().is_consistent());
}

#[test]
fn test_move_under_condition_is_rejected() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    let d = child(&editor, root, 2);
    assert_eq!(
        editor.move_node(a, d, 0).unwrap_err(),
        StructuralError::NotALogicNode { id: d }
    );
}

#[test]
fn test_move_root_is_rejected() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    assert_eq!(
        editor.move_node(root, or, 0).unwrap_err(),
        StructuralError::RootMove
    );
}

// ==================== Editor: enable ====================

#[test]
fn test_set_enabled_does_not_recurse() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let b = child(&editor, or, 0);

    editor.set_enabled(or, false).unwrap();

    assert!(!editor.lookup(or).unwrap().is_enabled());
    assert!(editor.lookup(b).unwrap().is_enabled());
    assert_eq!(
        *events.borrow(),
        vec![TreeEvent::EnabledChanged {
            id: or,
            enabled: false,
            recursive: false
        }]
    );
}

#[test]
fn test_set_enabled_recursive() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);

    editor.set_enabled_recursive(or, false).unwrap();
    assert!(editor
        .tree()
        .subtree_ids(or)
        .iter()
        .all(|id| !editor.lookup(*id).unwrap().is_enabled()));
    assert!(editor.lookup(root).unwrap().is_enabled());

    editor.set_enabled_recursive(root, true).unwrap();
    assert!(editor
        .tree()
        .depth_first()
        .iter()
        .all(|id| editor.lookup(*id).unwrap().is_enabled()));
}

#[test]
fn test_disabled_middle_child_is_omitted_from_mapping() {
    let mut editor = FilterEditor::with_tree(FilterCompiler::compile("a=1 AND b=2 AND c=3").unwrap());
    let root = editor.tree().root();
    let b = child(&editor, root, 1);
    editor.set_enabled(b, false).unwrap();

    assert_eq!(
        to_mapping(editor.tree()),
        json!({"$and": [
            {"field": "a", "operator": "$eq", "value": 1},
            {"field": "c", "operator": "$eq", "value": 3}
        ]})
    );
}

#[test]
fn test_disabled_sole_child_leaves_empty_list() {
    let mut editor = FilterEditor::with_tree(FilterCompiler::compile("a=1").unwrap());
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    editor.set_enabled(a, false).unwrap();
    assert_eq!(to_mapping(editor.tree()), json!({"$and": []}));

    editor.set_enabled(root, false).unwrap();
    assert_eq!(to_mapping(editor.tree()), json!({}));
}

// ==================== Editor: update ====================

#[test]
fn test_set_logic_operator() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    editor.set_logic_operator(root, BooleanOperator::Or).unwrap();
    assert_eq!(
        editor.tree().root_node().logic_operator(),
        Some(BooleanOperator::Or)
    );

    let a = child(&editor, root, 0);
    assert_eq!(
        editor
            .set_logic_operator(a, BooleanOperator::Xor)
            .unwrap_err(),
        StructuralError::NotALogicNode { id: a }
    );
}

#[test]
fn test_update_condition() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let a = child(&editor, root, 0);

    editor
        .update_condition(a, None, Some(ComparisonOperator::GreaterOrEqual), Some(Literal::Int(7)))
        .unwrap();

    let condition = editor.lookup(a).unwrap().as_condition().unwrap();
    assert_eq!(condition.field, FieldPath::new("a"));
    assert_eq!(condition.operator, ComparisonOperator::GreaterOrEqual);
    assert_eq!(condition.value, Literal::Int(7));
    assert_eq!(*events.borrow(), vec![TreeEvent::Updated { id: a }]);

    assert_eq!(
        editor.update_condition(root, None, None, None).unwrap_err(),
        StructuralError::NotACondition { id: root }
    );
}

#[test]
fn test_replace_swaps_tree() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let previous = editor.replace(FilterTree::new());
    assert_eq!(previous.len(), 6);
    assert!(editor.tree().is_empty());
    assert_eq!(*events.borrow(), vec![TreeEvent::Replaced]);
}

// ==================== Editor: mappings and payloads ====================

#[test]
fn test_insert_mapping() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let id = editor
        .insert_mapping(
            root,
            0,
            &json!({"$or": [{"field": "x", "operator": "$lt", "value": 2}, {"y": 3}]}),
        )
        .unwrap();

    assert_eq!(editor.tree().children(root)[0], id);
    assert_eq!(editor.tree().children(id).len(), 2);
    assert!(editor.tree().is_consistent());
}

#[test]
fn test_insert_invalid_mapping_leaves_tree_unchanged() {
    let mut editor = sample_editor();
    let events = recorder(&mut editor);
    let root = editor.tree().root();
    let before = editor.tree().clone();

    let err = editor
        .insert_mapping(root, 0, &json!({"$or": [{"field": "x", "operator": "$nope"}]}))
        .unwrap_err();

    assert!(matches!(err, crate::Error::Mapping(_)));
    assert!(editor.tree().structurally_eq(&before));
    assert_eq!(editor.tree().len(), before.len());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_drag_payload_carries_mapping_and_source() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let c = child(&editor, or, 1);
    editor.set_enabled(c, false).unwrap();
    editor.set_enabled(or, false).unwrap();

    let payload = editor.drag_payload(or).unwrap();

    assert_eq!(payload.session, editor.session());
    assert_eq!(payload.source, or);
    assert_eq!(
        payload.mapping,
        json!({"$or": [{"field": "b", "operator": "$eq", "value": 2}]})
    );
    let decoded = DragPayload::from_json(&payload.to_json().unwrap()).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_drop_payload_from_same_session_moves() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let a = child(&editor, root, 0);
    let or = child(&editor, root, 1);
    let payload = editor.drag_payload(a).unwrap();

    let dropped = editor.drop_payload(&payload, or, 0).unwrap();

    assert_eq!(dropped, a);
    assert_eq!(editor.tree().len(), 6);
    assert_eq!(editor.tree().children(or)[0], a);
}

#[test]
fn test_drop_payload_from_other_session_copies() {
    let source = sample_editor();
    let source_root = source.tree().root();
    let payload = source
        .drag_payload(source.tree().children(source_root)[1])
        .unwrap();

    let mut target = FilterEditor::new();
    let root = target.tree().root();
    let dropped = target.drop_payload(&payload, root, 0).unwrap();

    assert_eq!(target.tree().children(root), &[dropped]);
    assert_eq!(
        to_mapping(target.tree()),
        json!({"$and": [{"$or": [
            {"field": "b", "operator": "$eq", "value": 2},
            {"field": "c", "operator": "$eq", "value": 3}
        ]}]})
    );
}

#[test]
fn test_drop_payload_into_own_descendant_is_rejected() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let inner = editor.add_logic(or, BooleanOperator::And).unwrap();
    let payload = editor.drag_payload(or).unwrap();

    let err = editor.drop_payload(&payload, inner, 0).unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Structural(StructuralError::WouldCreateCycle { .. })
    ));
}

#[test]
fn test_drop_payload_after_replace_copies() {
    let mut editor =
        FilterEditor::with_tree(FilterCompiler::compile("a=1 AND b=2 AND c=3").unwrap());
    let b = child(&editor, editor.tree().root(), 1);
    let payload = editor.drag_payload(b).unwrap();

    let session = editor.session();
    editor.replace(
        from_mapping(&json!({"$and": [
            {"field": "x", "operator": "$eq", "value": 1},
            {"$or": [
                {"field": "y", "operator": "$eq", "value": 2},
                {"field": "z", "operator": "$eq", "value": 3}
            ]}
        ]}))
        .unwrap(),
    );
    assert_ne!(editor.session(), session);

    let root = editor.tree().root();
    let dropped = editor.drop_payload(&payload, root, 0).unwrap();

    assert_eq!(editor.tree().children(root)[0], dropped);
    assert_eq!(
        to_mapping(editor.tree()),
        json!({"$and": [
            {"field": "b", "operator": "$eq", "value": 2},
            {"field": "x", "operator": "$eq", "value": 1},
            {"$or": [
                {"field": "y", "operator": "$eq", "value": 2},
                {"field": "z", "operator": "$eq", "value": 3}
            ]}
        ]})
    );
}

#[test]
fn test_drop_payload_of_root_copies() {
    let mut editor = sample_editor();
    let root = editor.tree().root();
    let or = child(&editor, root, 1);
    let payload = editor.drag_payload(root).unwrap();

    let dropped = editor.drop_payload(&payload, or, 0).unwrap();

    assert_ne!(dropped, root);
    assert_eq!(editor.tree().len(), 12);
    assert_eq!(editor.tree().children(or)[0], dropped);
    assert_eq!(editor.lookup(dropped).unwrap().parent(), Some(or));
    assert!(editor.tree().is_consistent());
}

// ==================== Round trip ====================

#[test]
fn test_round_trip_is_structurally_equal() {
    for text in [
        "a=1",
        "a=1 OR b=2 AND c=3",
        "(a=1 OR b=2) AND c=3 AND (d=4 XOR e=5)",
        "gene IN ('A', 'B') AND qual = NULL",
    ] {
        let tree = FilterCompiler::compile(text).unwrap();
        let back = from_mapping(&to_mapping(&tree)).unwrap();
        assert!(tree.structurally_eq(&back), "round trip of '{text}'");
    }
}

#[test]
fn test_editor_built_tree_round_trips() {
    let mut editor = FilterEditor::new();
    let root = editor.tree().root();
    let or = editor.add_logic(root, BooleanOperator::Or).unwrap();
    editor.add_logic(or, BooleanOperator::And).unwrap();
    editor
        .add_condition(or, "af", ComparisonOperator::Less, 0.01)
        .unwrap();

    let back = from_mapping(&to_mapping(editor.tree())).unwrap();
    assert!(editor.tree().structurally_eq(&back));
}
