use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}`. Unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()));
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
