pub mod error;
pub mod format;
pub mod output;

pub use output::{print_success, print_warning};

use std::path::{Path, PathBuf};

/// Make a path absolute relative to the current working directory.
pub fn coerce_to_absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
