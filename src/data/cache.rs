//! Memoizing wrapper around [`load`].
//!
//! Entries are keyed by path and the file's modification time, so a file
//! that changes on disk is read again on the next request.

use super::loader::{load, LoaderError, ResponseTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

struct CacheEntry {
    modified: Option<SystemTime>,
    table: Arc<ResponseTable>,
}

/// Caches loaded response tables by (path, modification time).
#[derive(Default)]
pub struct CachedLoader {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl CachedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reloading it when the file's
    /// modification time differs from the cached one.
    pub fn get(&mut self, path: &Path) -> Result<Arc<ResponseTable>, LoaderError> {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if let Some(entry) = self.entries.get(path) {
            // Without a readable mtime there is nothing to compare against
            if modified.is_some() && entry.modified == modified {
                debug!(path = %path.display(), "survey table cache hit");
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = match load(path) {
            Ok(table) => Arc::new(table),
            Err(e) => {
                self.entries.remove(path);
                return Err(e);
            }
        };

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the cached table for `path`, if any.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;

    fn write_csv(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        write!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        write_csv(&path, "Travel Mode\nBike\n");

        let mut cache = CachedLoader::new();
        let first = cache.get(&path).unwrap();
        let second = cache.get(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_modified_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        write_csv(&path, "Travel Mode\nBike\n");

        let mut cache = CachedLoader::new();
        let first = cache.get(&path).unwrap();
        assert_eq!(first.height(), 1);

        write_csv(&path, "Travel Mode\nBike\nOwn Car\n");
        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let second = cache.get(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.height(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let mut cache = CachedLoader::new();
        assert!(matches!(cache.get(&path), Err(LoaderError::NotFound { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        write_csv(&path, "Travel Mode\nBike\n");

        let mut cache = CachedLoader::new();
        let first = cache.get(&path).unwrap();
        cache.invalidate(&path);
        let second = cache.get(&path).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }
}
