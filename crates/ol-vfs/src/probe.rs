//! Host filesystem probes
//!
//! Every OS error (permission denied, broken symlink, ...) is folded into
//! "absent" so callers only ever see a yes/no answer.

use std::path::{Path, PathBuf};

/// True if `path` names any existing entry
pub fn exists(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}

/// True if `path` exists and is a directory
pub fn is_dir(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Return `path` back if it exists
pub fn find_file_if_exists(path: &Path) -> Option<PathBuf> {
    exists(path).then(|| path.to_path_buf())
}
