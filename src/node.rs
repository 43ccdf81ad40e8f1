use std::fmt;

use generational_arena::Index;

/// Depth reserved for the synthetic root node.
pub const ROOT_DEPTH: i32 = -1;

/// Number of spaces that make up one indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Coarse classification of a source line, sniffed once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Statement,
    FunctionDef,
    ClassDef,
    Blank,
}

impl Category {
    /// Substring match, not parsing: any line containing `def` counts as a
    /// function definition, any other line containing `class` as a class
    /// definition. Good enough for block-level bookkeeping.
    pub fn sniff(text: &str) -> Self {
        if text.is_empty() {
            Category::Blank
        } else if text.contains("def") {
            Category::FunctionDef
        } else if text.contains("class") {
            Category::ClassDef
        } else {
            Category::Statement
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Statement => "statement",
            Category::FunctionDef => "function",
            Category::ClassDef => "class",
            Category::Blank => "blank",
        };
        write!(f, "{}", name)
    }
}

/// Data payload for tree nodes representing source lines.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Line content with leading indentation stripped
    pub text: String,
    /// Nesting level, `ROOT_DEPTH` for the synthetic root
    pub depth: i32,
    /// Reported source line, maintained by every mutation
    pub line: usize,
    /// Classification derived from the text at construction time
    pub category: Category,
}

impl NodeData {
    /// Builds a node from a raw source line at 0-based input position `index`.
    ///
    /// Depth is inferred from the leading whitespace in `INDENT_WIDTH` units
    /// (integer division, so stray spaces degrade to the shallower level).
    /// The stored line is `index + 1`; line 0 stays reserved for the root.
    pub fn from_raw(raw: &str, index: usize) -> Self {
        let text = raw.trim_start();
        let depth = ((raw.len() - text.len()) / INDENT_WIDTH) as i32;
        Self {
            text: text.to_string(),
            depth,
            line: index + 1,
            category: Category::sniff(text),
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            text: String::new(),
            depth: ROOT_DEPTH,
            line: 0,
            category: Category::Blank,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.category == Category::Blank
    }

    pub fn is_root(&self) -> bool {
        self.depth == ROOT_DEPTH
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Tree node in the arena-based line hierarchy.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Line data for this node
    pub data: NodeData,
    /// Index of the parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in source order
    pub children: Vec<Index>,
}
