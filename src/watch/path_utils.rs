// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root` with forward slashes, as matched by the globs.
///
/// Tries a plain `strip_prefix` first, then again with both sides
/// canonicalized (macOS reports `/private/var/...` for `/var/...`).
/// Returns `None` for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) else {
        return None;
    };
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
