// src/watch/hash.rs

//! Content hashing for `use_hash` tasks.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// blake3 hex digest of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut reader = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Combine per-file hashes into one digest.
///
/// `hashes` must be ordered by the corresponding file path.
pub fn compute_aggregate_hash(hashes: &[String]) -> String {
    let mut hasher = Hasher::new();
    for h in hashes {
        hasher.update(h.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Last seen aggregate hash per task.
pub trait HashStore: Send + Sync {
    fn load(&self, task: &str) -> Option<String>;
    fn save(&mut self, task: &str, hash: &str);
}

/// Hashes live for the lifetime of the watch loop only.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    map: HashMap<String, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for MemoryHashStore {
    fn load(&self, task: &str) -> Option<String> {
        self.map.get(task).cloned()
    }

    fn save(&mut self, task: &str, hash: &str) {
        debug!(task = %task, hash = %hash, "stored task hash");
        self.map.insert(task.to_string(), hash.to_string());
    }
}

/// Record `new_hash` for `task` and report whether it differs from the last
/// one seen. The first hash seen for a task counts as a change.
pub fn hash_changed(store: &mut dyn HashStore, task: &str, new_hash: &str) -> bool {
    if store.load(task).as_deref() == Some(new_hash) {
        return false;
    }
    store.save(task, new_hash);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn file_hash_depends_on_content_only() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.html", "<p>same</p>");
        fs.add_file("/b.html", "<p>same</p>");
        fs.add_file("/c.html", "<p>other</p>");

        let a = compute_file_hash(&fs, Path::new("/a.html")).unwrap();
        let b = compute_file_hash(&fs, Path::new("/b.html")).unwrap();
        let c = compute_file_hash(&fs, Path::new("/c.html")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unchanged_hash_is_not_a_change() {
        let mut store = MemoryHashStore::new();
        assert!(hash_changed(&mut store, "hugo", "h1"));
        assert!(!hash_changed(&mut store, "hugo", "h1"));
        assert!(hash_changed(&mut store, "hugo", "h2"));
        assert!(hash_changed(&mut store, "cms", "h2"));
    }
}
