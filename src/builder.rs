//! Recursive-descent construction of a [`SourceTree`] from indented lines.

use generational_arena::Index;
use tracing::instrument;

use crate::arena::SourceTree;
use crate::node::{NodeData, ROOT_DEPTH};

/// Builds trees from raw line sequences.
///
/// The input cursor lives here, one per builder, and is reset on every build
/// call; it is threaded through the recursion and never stored on the tree,
/// so building stays reentrant across trees.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    cursor: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Builds a tree from an ordered sequence of raw lines.
    ///
    /// Construction is total: indentation that is not a multiple of the
    /// indent width degrades to the integer-division depth, and a deeper
    /// block without an intermediate level attaches with its literal depth.
    #[instrument(level = "debug", skip(self, lines))]
    pub fn build_from_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> SourceTree {
        let raw: Vec<&str> = lines.iter().map(|line| line.as_ref()).collect();
        let mut tree = SourceTree::new();
        self.cursor = 0;

        if !raw.is_empty() {
            let first = NodeData::from_raw(raw[self.cursor], self.cursor);
            let root = tree.root();
            self.build_level(&mut tree, root, first, &raw);
        }

        tree
    }

    /// Attaches the direct children of `father`, starting with `pending`.
    ///
    /// Returns the first constructed node that belongs to a shallower level
    /// so the caller can place it, or None once the input is exhausted.
    fn build_level(
        &mut self,
        tree: &mut SourceTree,
        father: Index,
        mut pending: NodeData,
        raw: &[&str],
    ) -> Option<NodeData> {
        let father_depth = tree
            .node(father)
            .map(|node| node.data.depth)
            .unwrap_or(ROOT_DEPTH);

        loop {
            if pending.depth < father_depth + 1 {
                return Some(pending);
            }

            let attached = tree.insert_node(pending, father);
            self.cursor += 1;
            if self.cursor >= raw.len() {
                return None;
            }

            pending = NodeData::from_raw(raw[self.cursor], self.cursor);
            if pending.is_blank() {
                // Blank lines never open or close a block
                pending.depth = father_depth + 1;
            }
            if pending.depth > father_depth + 1 {
                pending = self.build_level(tree, attached, pending, raw)?;
            }
        }
    }
}

impl SourceTree {
    /// Builds a tree from newline-separated source text.
    pub fn from_source(source: &str) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        TreeBuilder::new().build_from_lines(&lines)
    }
}
