// src/actions/admin.rs

//! Copying the admin panel into the output tree.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::{list_files_sorted, FileSystem};

/// Copy every file directly inside `source` to `dest`, replacing each
/// occurrence of `placeholder` with `repository` (or nothing).
///
/// Files that are not valid UTF-8 are copied byte for byte. Returns the
/// number of files written.
pub fn render_admin(
    fs: &dyn FileSystem,
    source: &Path,
    dest: &Path,
    placeholder: &str,
    repository: Option<&str>,
) -> Result<usize> {
    let replacement = repository.unwrap_or("");
    let files = list_files_sorted(fs, source)
        .with_context(|| format!("listing admin sources in {:?}", source))?;

    for file in &files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let bytes = fs.read(file)?;

        let out = match String::from_utf8(bytes) {
            Ok(text) => text.replace(placeholder, replacement).into_bytes(),
            Err(err) => err.into_bytes(),
        };

        let target = dest.join(name);
        fs.write(&target, &out)?;
        debug!(from = ?file, to = ?target, "wrote admin file");
    }

    Ok(files.len())
}
