use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("No node at line {0}")]
    NodeNotFound(usize),

    #[error("Transformer empty")]
    EmptyTransformer,

    #[error("Invalid target at line {line}: {reason}")]
    InvalidTarget { line: usize, reason: String },

    #[error("Invalid rule spec: {0}")]
    InvalidRule(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal tree operation failed: {0}")]
    InternalError(String),
}

impl TreeError {
    /// Attach a human-readable context to an IO failure.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
