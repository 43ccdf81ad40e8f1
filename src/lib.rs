//! Indentation-derived source trees.
//!
//! Parses fixed-width indented text into an arena-backed tree, keeps line
//! and depth bookkeeping consistent across splicing and deletion, applies
//! per-node text transformations in a single pass, and serializes the tree
//! back to source lines. File I/O lives in the CLI layer; the core works on
//! line sequences and `io::Write` sinks only.

pub mod arena;
pub mod builder;
pub mod cli;
pub mod config;
pub mod display;
pub mod edit;
pub mod errors;
pub mod exitcode;
pub mod node;
pub mod transform;

pub mod util {
    pub mod path;
    pub mod testing;
}

pub use arena::{SourceTree, TreeIterator};
pub use builder::TreeBuilder;
pub use display::ToTreeString;
pub use errors::{TreeError, TreeResult};
pub use node::{Category, NodeData, TreeNode, INDENT_WIDTH, ROOT_DEPTH};
pub use transform::{
    delete_matching, replace, RuleOutcome, TransformReport, TransformRule, Transformer,
};
