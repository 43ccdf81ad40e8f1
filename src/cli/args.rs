//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Indentation-derived source trees: parse, query, splice, transform, re-serialize
#[derive(Parser, Debug)]
#[command(name = "rstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show file hierarchy as a tree
    Tree {
        /// Source file
        file: PathBuf,
        /// Annotate nodes with line numbers
        #[arg(short, long)]
        lines: bool,
    },

    /// Parse a file and re-serialize it
    Cat {
        /// Source file
        file: PathBuf,
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show node, category and depth counts
    Stats {
        /// Source file
        file: PathBuf,
    },

    /// Find lines matching a regex
    Find {
        /// Source file
        file: PathBuf,
        /// Regex applied to each node's text
        pattern: String,
    },

    /// Append one file's tree into another
    Append {
        /// Base file
        file: PathBuf,
        /// File whose nodes get appended
        addition: PathBuf,
        /// Splice in front of this line instead of appending at the end
        #[arg(long)]
        at_line: Option<usize>,
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply transform rules and re-serialize
    Transform {
        /// Source file
        file: PathBuf,
        /// OLD=NEW text replacement (repeatable)
        #[arg(long = "replace", value_name = "OLD=NEW")]
        replace: Vec<String>,
        /// Delete nodes whose text matches this regex (repeatable)
        #[arg(long = "delete-matching", value_name = "REGEX")]
        delete_matching: Vec<String>,
        /// Drop the children of deleted nodes instead of promoting them
        #[arg(long)]
        drop_children: bool,
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
