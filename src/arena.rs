use std::collections::HashMap;
use std::io::Write;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use regex::Regex;
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::node::{Category, NodeData, TreeNode, INDENT_WIDTH};
use crate::transform::Transformer;

/// Arena-based tree of source lines under a synthetic root.
///
/// Uses a generational arena for memory-safe node references and O(1)
/// lookups; children are owned by the arena, parent links are plain indices.
/// The root always exists, carries no text, and never appears in flattened
/// or serialized output.
#[derive(Debug)]
pub struct SourceTree {
    /// Arena storage for all tree nodes
    pub(crate) arena: Arena<TreeNode>,
    /// Index of the synthetic root node
    pub(crate) root: Index,
    /// Rules applied by `apply_transformer`
    pub(crate) transformer: Transformer,
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            data: NodeData::root(),
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            transformer: Transformer::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn root(&self) -> Index {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    /// Number of nodes excluding the synthetic root.
    #[instrument(level = "trace", skip(self))]
    pub fn len(&self) -> usize {
        self.arena.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct children of the synthetic root, in source order.
    pub fn top_level(&self) -> Vec<Index> {
        self.node(self.root)
            .map(|root| root.children.clone())
            .unwrap_or_default()
    }

    /// Inserts `data` as the last child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Index) -> Index {
        self.insert_node_at(data, parent, None)
    }

    /// Inserts `data` under `parent` at `position` in its child list, or at
    /// the end when no position is given.
    pub(crate) fn insert_node_at(
        &mut self,
        data: NodeData,
        parent: Index,
        position: Option<usize>,
    ) -> Index {
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });

        if let Some(parent_node) = self.arena.get_mut(parent) {
            match position {
                Some(pos) if pos <= parent_node.children.len() => {
                    parent_node.children.insert(pos, node_idx)
                }
                _ => parent_node.children.push(node_idx),
            }
        }

        node_idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Depth-first pre-order indices of every node except the root.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten(&self) -> Vec<Index> {
        self.iter()
            .map(|(idx, _)| idx)
            .filter(|&idx| idx != self.root)
            .collect()
    }

    /// Finds the first node in pre-order whose reported line equals `line`.
    ///
    /// Line 0 resolves to the synthetic root.
    #[instrument(level = "debug", skip(self))]
    pub fn locate(&self, line: usize) -> TreeResult<Index> {
        self.iter()
            .find(|(_, node)| node.data.line == line)
            .map(|(idx, _)| idx)
            .ok_or(TreeError::NodeNotFound(line))
    }

    /// Number of nodes in the subtree below `idx`, excluding `idx` itself.
    #[instrument(level = "trace", skip(self))]
    pub fn descendant_count(&self, idx: Index) -> usize {
        match self.node(idx) {
            Some(node) => {
                node.children.len()
                    + node
                        .children
                        .iter()
                        .map(|&child| self.descendant_count(child))
                        .sum::<usize>()
            }
            None => 0,
        }
    }

    /// Deepest nesting present, counted in levels (0 for an empty tree).
    #[instrument(level = "debug", skip(self))]
    pub fn max_depth(&self) -> usize {
        self.flatten()
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .map(|node| node.data.depth)
            .max()
            .map(|depth| (depth.max(0) + 1) as usize)
            .unwrap_or(0)
    }

    /// Per-category node totals over the whole tree.
    #[instrument(level = "debug", skip(self))]
    pub fn category_counts(&self) -> HashMap<Category, usize> {
        self.flatten()
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .map(|node| node.data.category)
            .counts()
    }

    /// All nodes whose text matches `pattern`, in pre-order.
    #[instrument(level = "debug", skip(self, pattern))]
    pub fn find_matching(&self, pattern: &Regex) -> Vec<Index> {
        self.flatten()
            .into_iter()
            .filter(|&idx| {
                self.node(idx)
                    .map(|node| pattern.is_match(&node.data.text))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Renders the tree back to source lines: indentation from depth, text
    /// as stored. Blank nodes render as their indentation alone.
    #[instrument(level = "debug", skip(self))]
    pub fn to_lines(&self) -> Vec<String> {
        self.flatten()
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .map(|node| {
                let indent = " ".repeat(INDENT_WIDTH * node.data.depth.max(0) as usize);
                format!("{}{}", indent, node.data.text)
            })
            .collect()
    }

    /// Writes the serialized lines to `sink`, each newline-terminated.
    #[instrument(level = "debug", skip(self, sink))]
    pub fn write_to<W: Write>(&self, sink: &mut W) -> TreeResult<()> {
        for line in self.to_lines() {
            writeln!(sink, "{}", line).map_err(|e| TreeError::io("write tree", e))?;
        }
        Ok(())
    }

    /// Structural equality of the subtree at `a` here and the subtree at `b`
    /// in `other`.
    ///
    /// Nodes match on text (the two synthetic roots match unconditionally),
    /// depth, and child count, and every child pair must match in order.
    pub fn nodes_equal(&self, a: Index, other: &SourceTree, b: Index) -> bool {
        let (left, right) = match (self.node(a), other.node(b)) {
            (Some(left), Some(right)) => (left, right),
            _ => return false,
        };

        let both_roots = left.data.is_root() && right.data.is_root();
        if !both_roots && left.data.text != right.data.text {
            return false;
        }
        if left.data.depth != right.data.depth {
            return false;
        }
        if left.children.len() != right.children.len() {
            return false;
        }
        left.children
            .iter()
            .zip(right.children.iter())
            .all(|(&child_a, &child_b)| self.nodes_equal(child_a, other, child_b))
    }
}

impl PartialEq for SourceTree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.nodes_equal(self.root, other, other.root)
    }
}

pub struct TreeIterator<'a> {
    tree: &'a SourceTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a SourceTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
