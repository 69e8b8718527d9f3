use std::cmp::Ordering;
use std::path::Path;

/// Forward-slash form of `path`, used as a sort and lookup key.
#[must_use]
pub fn path_to_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[must_use]
pub fn compare_paths(left: &Path, right: &Path) -> Ordering {
    path_to_key(left).cmp(&path_to_key(right))
}

/// Renders `path` relative to `base` when it lives underneath it, and as-is
/// otherwise.
#[must_use]
pub fn display_relative_to(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) if !relative.as_os_str().is_empty() => path_to_key(relative),
        _ => path_to_key(path),
    }
}
