//! Structural mutations: append, splice, delete, and the line/level
//! bookkeeping that keeps every node's reported position consistent.

use generational_arena::Index;
use tracing::instrument;

use crate::arena::SourceTree;
use crate::errors::{TreeError, TreeResult};
use crate::node::ROOT_DEPTH;
use crate::transform::Transformer;

impl SourceTree {
    /// Appends another tree's top-level nodes into this tree.
    ///
    /// With `at_line = None` the nodes land after everything else: their
    /// reported lines shift by the number of nodes already present. With
    /// `at_line = Some(n)` the nodes are spliced in front of the node
    /// currently holding line `n`: existing lines from `n` on move down by
    /// the incoming node count, and the incoming subtrees are re-leveled to
    /// their new parent and renumbered sequentially in pre-order from `n`.
    #[instrument(level = "debug", skip(self, other))]
    pub fn append(&mut self, other: SourceTree, at_line: Option<usize>) -> TreeResult<()> {
        match at_line {
            None => self.append_at_end(&other),
            Some(line) => self.splice_at_line(&other, line),
        }
    }

    /// Like [`append`](Self::append), but runs `rules` over the incoming
    /// tree first.
    #[instrument(level = "debug", skip(self, other, rules))]
    pub fn append_with(
        &mut self,
        mut other: SourceTree,
        at_line: Option<usize>,
        rules: &Transformer,
    ) -> TreeResult<()> {
        other.apply_rules(rules)?;
        self.append(other, at_line)
    }

    fn append_at_end(&mut self, other: &SourceTree) -> TreeResult<()> {
        let offset = self.len() as isize;
        let root = self.root();

        for top in other.top_level() {
            let grafted = self.graft_subtree(other, top, root, None)?;
            self.shift_subtree_lines(grafted, offset);
        }
        Ok(())
    }

    fn splice_at_line(&mut self, other: &SourceTree, line: usize) -> TreeResult<()> {
        let target = self.locate(line)?;
        let parent = self
            .node(target)
            .and_then(|node| node.parent)
            .ok_or_else(|| TreeError::InvalidTarget {
                line,
                reason: "cannot splice in front of the root".to_string(),
            })?;

        let size = other.len() as isize;
        self.shift_lines(line, size);

        let parent_depth = self
            .node(parent)
            .map(|node| node.data.depth)
            .unwrap_or(ROOT_DEPTH);
        let position = self.child_position(parent, target)?;

        let mut next_line = line;
        for (offset, top) in other.top_level().into_iter().enumerate() {
            let grafted = self.graft_subtree(other, top, parent, Some(position + offset))?;
            self.relevel_subtree(grafted, parent_depth);
            next_line = self.renumber_subtree(grafted, next_line);
        }
        Ok(())
    }

    /// Removes the node at `idx`.
    ///
    /// With `keep_children` the children take the removed node's place, in
    /// order, re-leveled to the former parent; later lines shift up by one.
    /// Without, the whole subtree goes and later lines shift up by the full
    /// removed count.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, idx: Index, keep_children: bool) -> TreeResult<()> {
        let (line, parent, children) = match self.node(idx) {
            Some(node) => (node.data.line, node.parent, node.children.clone()),
            None => {
                return Err(TreeError::InternalError(
                    "delete target is no longer in the tree".to_string(),
                ))
            }
        };
        let parent = parent.ok_or_else(|| TreeError::InvalidTarget {
            line,
            reason: "cannot delete the root".to_string(),
        })?;

        let removed = 1 + self.descendant_count(idx);
        let position = self.child_position(parent, idx)?;

        if keep_children {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.remove(position);
                for (offset, &child) in children.iter().enumerate() {
                    parent_node.children.insert(position + offset, child);
                }
            }
            let parent_depth = self
                .node(parent)
                .map(|node| node.data.depth)
                .unwrap_or(ROOT_DEPTH);
            for &child in &children {
                if let Some(node) = self.node_mut(child) {
                    node.parent = Some(parent);
                }
                self.relevel_subtree(child, parent_depth);
            }
            self.arena.remove(idx);
            self.shift_lines(line, -1);
        } else {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.remove(position);
            }
            self.remove_subtree(idx);
            self.shift_lines(line, -(removed as isize));
        }
        Ok(())
    }

    /// Shifts the reported line of every node at or past `threshold` by
    /// `delta`. The root (line 0) is never affected because mutations only
    /// target lines from 1 on.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn shift_lines(&mut self, threshold: usize, delta: isize) {
        for (_, node) in self.arena.iter_mut() {
            if node.data.line >= threshold && !node.data.is_root() {
                node.data.line = node.data.line.saturating_add_signed(delta);
            }
        }
    }

    /// Shifts every reported line in the subtree at `idx` by `delta`.
    fn shift_subtree_lines(&mut self, idx: Index, delta: isize) {
        let children = match self.node(idx) {
            Some(node) => node.children.clone(),
            None => return,
        };
        if let Some(node) = self.node_mut(idx) {
            node.data.line = node.data.line.saturating_add_signed(delta);
        }
        for child in children {
            self.shift_subtree_lines(child, delta);
        }
    }

    /// Renumbers the subtree at `idx` sequentially in pre-order starting at
    /// `start`; returns the next free line.
    fn renumber_subtree(&mut self, idx: Index, start: usize) -> usize {
        let children = match self.node(idx) {
            Some(node) => node.children.clone(),
            None => return start,
        };
        if let Some(node) = self.node_mut(idx) {
            node.data.line = start;
        }
        let mut next = start + 1;
        for child in children {
            next = self.renumber_subtree(child, next);
        }
        next
    }

    /// Re-levels the subtree at `idx` to `parent_depth + 1`, cascading the
    /// new depth through all descendants.
    pub(crate) fn relevel_subtree(&mut self, idx: Index, parent_depth: i32) {
        let children = match self.node(idx) {
            Some(node) => node.children.clone(),
            None => return,
        };
        if let Some(node) = self.node_mut(idx) {
            node.data.depth = parent_depth + 1;
        }
        for child in children {
            self.relevel_subtree(child, parent_depth + 1);
        }
    }

    /// Deep-copies the subtree at `src` in `other` under `parent` here,
    /// optionally at a fixed position in the parent's child list.
    fn graft_subtree(
        &mut self,
        other: &SourceTree,
        src: Index,
        parent: Index,
        position: Option<usize>,
    ) -> TreeResult<Index> {
        let src_node = other.node(src).ok_or_else(|| {
            TreeError::InternalError("source subtree vanished during graft".to_string())
        })?;

        let data = src_node.data.clone();
        let children = src_node.children.clone();
        let idx = self.insert_node_at(data, parent, position);
        for child in children {
            self.graft_subtree(other, child, idx, None)?;
        }
        Ok(idx)
    }

    /// Drops the subtree at `idx` from the arena. The parent's child list
    /// must already be detached by the caller.
    fn remove_subtree(&mut self, idx: Index) {
        let mut subtree = Vec::new();
        self.collect_subtree(idx, &mut subtree);
        for node_idx in subtree {
            self.arena.remove(node_idx);
        }
    }

    fn collect_subtree(&self, idx: Index, out: &mut Vec<Index>) {
        if let Some(node) = self.node(idx) {
            out.push(idx);
            for &child in &node.children {
                self.collect_subtree(child, out);
            }
        }
    }

    fn child_position(&self, parent: Index, child: Index) -> TreeResult<usize> {
        self.node(parent)
            .and_then(|node| node.children.iter().position(|&c| c == child))
            .ok_or_else(|| {
                TreeError::InternalError("child not registered with its parent".to_string())
            })
    }
}
