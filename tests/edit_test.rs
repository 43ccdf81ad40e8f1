//! Tests for structural mutations: appending at the end, splicing in
//! front of a line, and both deletion modes, with the line and depth
//! bookkeeping each of them must maintain.

use rstree::{SourceTree, TreeError};

const BASE: &str = "\
import os

def extract(value):
    total = 0
    return total
";

const ADDITION: &str = "\
def helper(x):
    return x * 2
";

/// Every mutation must leave the reported lines dense: 1..=len in pre-order.
fn assert_dense_lines(tree: &SourceTree) {
    let lines: Vec<usize> = tree
        .flatten()
        .into_iter()
        .map(|idx| tree.node(idx).unwrap().data.line)
        .collect();
    assert_eq!(
        lines,
        (1..=tree.len()).collect::<Vec<_>>(),
        "line numbering should stay dense and sequential"
    );
}

fn text_at(tree: &SourceTree, line: usize) -> String {
    let idx = tree.locate(line).expect("line should resolve");
    tree.node(idx).expect("node should exist").data.text.clone()
}

fn depth_at(tree: &SourceTree, line: usize) -> i32 {
    let idx = tree.locate(line).expect("line should resolve");
    tree.node(idx).expect("node should exist").data.depth
}

// ============================================================
// Append at end
// ============================================================

#[test]
fn given_two_trees_when_appending_at_end_then_lines_continue_after_existing() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);

    // Act
    tree.append(addition, None).expect("append should succeed");

    // Assert
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.top_level().len(), 4);
    assert_eq!(text_at(&tree, 6), "def helper(x):");
    assert_eq!(depth_at(&tree, 6), 0);
    assert_eq!(text_at(&tree, 7), "return x * 2");
    assert_eq!(depth_at(&tree, 7), 1);
    // Existing nodes keep their positions
    assert_eq!(text_at(&tree, 3), "def extract(value):");
    assert_dense_lines(&tree);
}

#[test]
fn given_append_at_end_when_serialized_then_new_block_follows_old() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);

    // Act
    tree.append(addition, None).unwrap();

    // Assert
    assert_eq!(
        tree.to_lines(),
        vec![
            "import os",
            "",
            "def extract(value):",
            "    total = 0",
            "    return total",
            "def helper(x):",
            "    return x * 2",
        ]
    );
}

#[test]
fn given_empty_addition_when_appending_then_tree_is_unchanged() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let before = tree.to_lines();

    // Act
    tree.append(SourceTree::new(), None).unwrap();

    // Assert
    assert_eq!(tree.to_lines(), before);
    assert_dense_lines(&tree);
}

// ============================================================
// Splice in front of a line
// ============================================================

#[test]
fn given_target_line_when_splicing_then_incoming_lands_in_front_of_target() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);

    // Act: splice in front of "total = 0" (line 4, first child of def)
    tree.append(addition, Some(4)).expect("splice should succeed");

    // Assert: incoming block re-leveled under def and renumbered from 4
    assert_eq!(tree.len(), 7);
    assert_eq!(text_at(&tree, 4), "def helper(x):");
    assert_eq!(depth_at(&tree, 4), 1);
    assert_eq!(text_at(&tree, 5), "return x * 2");
    assert_eq!(depth_at(&tree, 5), 2);
    // The former occupant moved down by the incoming node count
    assert_eq!(text_at(&tree, 6), "total = 0");
    assert_eq!(text_at(&tree, 7), "return total");
    assert_dense_lines(&tree);
}

#[test]
fn given_top_level_target_when_splicing_then_later_siblings_shift_down() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);

    // Act: splice in front of "def extract(value):" (line 3, top level)
    tree.append(addition, Some(3)).unwrap();

    // Assert
    assert_eq!(
        tree.to_lines(),
        vec![
            "import os",
            "",
            "def helper(x):",
            "    return x * 2",
            "def extract(value):",
            "    total = 0",
            "    return total",
        ]
    );
    assert_dense_lines(&tree);
}

#[test]
fn given_multi_node_incoming_when_splicing_then_numbering_is_sequential_preorder() {
    // Arrange
    let mut tree = SourceTree::from_source("x = 9\n");
    let addition = SourceTree::from_source("a = 1\nb = 2\n");

    // Act
    tree.append(addition, Some(1)).unwrap();

    // Assert: both incoming top-level nodes precede the old first line
    assert_eq!(tree.to_lines(), vec!["a = 1", "b = 2", "x = 9"]);
    assert_eq!(text_at(&tree, 3), "x = 9");
    assert_dense_lines(&tree);
}

#[test]
fn given_root_line_when_splicing_then_invalid_target_error() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);

    // Act
    let result = tree.append(addition, Some(0));

    // Assert
    match result {
        Ok(_) => panic!("expected splicing at the root to fail"),
        Err(e) => {
            assert!(matches!(e, TreeError::InvalidTarget { line: 0, .. }));
            assert!(e.to_string().contains("cannot splice in front of the root"));
        }
    }
    assert_eq!(tree.len(), 5, "a rejected splice should not modify the tree");
}

#[test]
fn given_missing_line_when_splicing_then_not_found_error_and_no_mutation() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let addition = SourceTree::from_source(ADDITION);
    let before = tree.to_lines();

    // Act
    let result = tree.append(addition, Some(42));

    // Assert: the target is resolved before any line shifting happens
    assert!(matches!(result, Err(TreeError::NodeNotFound(42))));
    assert_eq!(tree.to_lines(), before);
}

// ============================================================
// Delete, promoting children
// ============================================================

#[test]
fn given_block_opener_when_deleting_with_keep_then_children_take_its_place() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let def_idx = tree.locate(3).unwrap();

    // Act
    tree.delete(def_idx, true).expect("delete should succeed");

    // Assert: both children promoted to the top level at the former index
    assert_eq!(tree.len(), 4);
    assert_eq!(
        tree.to_lines(),
        vec!["import os", "", "total = 0", "return total"]
    );
    assert_eq!(depth_at(&tree, 3), 0);
    assert_eq!(depth_at(&tree, 4), 0);
    assert_dense_lines(&tree);
}

#[test]
fn given_nested_node_when_deleting_with_keep_then_grandchildren_relevel() {
    // Arrange
    let source = "\
def extract(value):
    total = 0
    if value:
        total += 1
        if total:
            return total
    return 0
";
    let mut tree = SourceTree::from_source(source);
    let if_idx = tree.locate(3).unwrap();

    // Act: delete "if value:", keeping its subtree
    tree.delete(if_idx, true).unwrap();

    // Assert: children rise one level, their own subtrees cascade
    assert_eq!(tree.len(), 6);
    assert_eq!(text_at(&tree, 3), "total += 1");
    assert_eq!(depth_at(&tree, 3), 1);
    assert_eq!(text_at(&tree, 4), "if total:");
    assert_eq!(depth_at(&tree, 4), 1);
    assert_eq!(text_at(&tree, 5), "return total");
    assert_eq!(depth_at(&tree, 5), 2);
    assert_eq!(text_at(&tree, 6), "return 0");

    let def_idx = tree.locate(1).unwrap();
    assert_eq!(tree.node(def_idx).unwrap().children.len(), 4);
    assert_dense_lines(&tree);
}

#[test]
fn given_leaf_when_deleting_with_keep_then_single_line_closes_up() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);
    let leaf_idx = tree.locate(4).unwrap();

    // Act
    tree.delete(leaf_idx, true).unwrap();

    // Assert
    assert_eq!(tree.len(), 4);
    assert_eq!(text_at(&tree, 4), "return total");
    assert_dense_lines(&tree);
}

// ============================================================
// Delete, dropping the subtree
// ============================================================

#[test]
fn given_subtree_when_deleting_without_keep_then_whole_block_goes() {
    // Arrange
    let source = "\
import os

def extract(value):
    total = 0
    if value:
        total += 1
    return total
";
    let mut tree = SourceTree::from_source(source);
    let if_idx = tree.locate(5).unwrap();

    // Act
    tree.delete(if_idx, false).unwrap();

    // Assert: the node and its child vanish; return total moves up by two
    assert_eq!(tree.len(), 5);
    assert_eq!(
        tree.to_lines(),
        vec![
            "import os",
            "",
            "def extract(value):",
            "    total = 0",
            "    return total",
        ]
    );
    assert_dense_lines(&tree);
}

#[test]
fn given_deep_subtree_when_deleting_without_keep_then_shift_covers_descendants() {
    // Arrange
    let source = "\
def extract(value):
    total = 0
    if value:
        total += 1
        if total:
            return total
    return 0
";
    let mut tree = SourceTree::from_source(source);
    let if_idx = tree.locate(3).unwrap();

    // Act: removes "if value:" plus its three descendants
    tree.delete(if_idx, false).unwrap();

    // Assert
    assert_eq!(tree.len(), 3);
    assert_eq!(
        tree.to_lines(),
        vec!["def extract(value):", "    total = 0", "    return 0"]
    );
    assert_dense_lines(&tree);
}

// ============================================================
// Delete error cases
// ============================================================

#[test]
fn given_root_when_deleting_then_invalid_target_error() {
    // Arrange
    let mut tree = SourceTree::from_source(BASE);

    // Act
    let result = tree.delete(tree.root(), true);

    // Assert
    match result {
        Ok(_) => panic!("expected deleting the root to fail"),
        Err(e) => {
            assert!(matches!(e, TreeError::InvalidTarget { line: 0, .. }));
            assert!(e.to_string().contains("cannot delete the root"));
        }
    }
    assert_eq!(tree.len(), 5);
}

#[test]
fn given_removed_node_index_when_deleting_again_then_internal_error() {
    // Arrange: generational indices go stale once the node is removed
    let mut tree = SourceTree::from_source(BASE);
    let leaf_idx = tree.locate(5).unwrap();
    tree.delete(leaf_idx, false).unwrap();

    // Act
    let result = tree.delete(leaf_idx, false);

    // Assert
    assert!(matches!(result, Err(TreeError::InternalError(_))));
    assert_eq!(tree.len(), 4, "the second delete should be a no-op");
}
