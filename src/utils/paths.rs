//! Small path helpers for display and file naming.

use crate::constants::PROMPT_NAME_LIMIT;
use std::path::{Component, Path, PathBuf};

/// Name under which a file is hidden on this platform.
///
/// Unix-like systems hide dot files. Elsewhere the name is kept as is.
pub fn hidden_file_name(name: &str) -> String {
    if cfg!(windows) || name.starts_with('.') {
        name.to_string()
    } else {
        format!(".{name}")
    }
}

/// `path` relative to `base` when it lies underneath it, otherwise unchanged.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rest) => Path::new(Component::CurDir.as_os_str()).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Shorten a name for the prompt, keeping room for an ellipsis.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > PROMPT_NAME_LIMIT {
        let kept: String = name.chars().take(PROMPT_NAME_LIMIT - 3).collect();
        format!("{kept}...")
    } else {
        name.to_string()
    }
}

/// File stem of `path`, lossily converted; empty when there is none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
