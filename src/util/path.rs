use std::path::Path;

use crate::errors::{TreeError, TreeResult};

/// Reject missing paths and directories before any read attempt.
pub fn ensure_file_exists(path: &Path) -> TreeResult<()> {
    if !path.exists() {
        Err(TreeError::FileNotFound(path.to_path_buf()))
    } else if !path.is_file() {
        Err(TreeError::NotAFile(path.to_path_buf()))
    } else {
        Ok(())
    }
}
