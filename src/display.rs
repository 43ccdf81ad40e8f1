//! Rendering of the line hierarchy with termtree.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::arena::SourceTree;
use crate::node::TreeNode;

/// Label shown for blank nodes so they stay visible in the rendered tree.
const BLANK_LABEL: &str = "(blank)";

pub trait ToTreeString {
    fn to_tree_string(&self, label: &str, show_lines: bool) -> Tree<String>;
}

impl ToTreeString for SourceTree {
    /// Converts the hierarchy into a displayable termtree, rooted at `label`
    /// (typically the source file name). With `show_lines` every node label
    /// carries its reported line number.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, label: &str, show_lines: bool) -> Tree<String> {
        fn node_label(node: &TreeNode, show_lines: bool) -> String {
            let text = if node.data.is_blank() {
                BLANK_LABEL
            } else {
                node.data.text.as_str()
            };
            if show_lines {
                format!("{}  [{}]", text, node.data.line)
            } else {
                text.to_string()
            }
        }

        fn build_tree(
            tree: &SourceTree,
            node_idx: Index,
            parent_tree: &mut Tree<String>,
            show_lines: bool,
        ) {
            if let Some(node) = tree.node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = tree.node(child_idx) {
                        let mut child_tree = Tree::new(node_label(child, show_lines));
                        build_tree(tree, child_idx, &mut child_tree, show_lines);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut rendered = Tree::new(label.to_string());
        build_tree(self, self.root(), &mut rendered, show_lines);
        rendered
    }
}
