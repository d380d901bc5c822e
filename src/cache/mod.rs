//! Persisted table view state.
//!
//! Each table's namespaced query string (`<ns>_pageIdx=..&<ns>_rows=..`) is
//! kept in one JSON map per profile under the cache directory, so page,
//! page size and search survive a restart.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

const FILE_NAME: &str = "view_state.json";

/// Namespace to query string, backed by a file.
#[derive(Debug)]
pub struct ViewStateStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl ViewStateStore {
    /// Open the store for a profile in the platform cache directory.
    ///
    /// Without a cache directory the store still works, in memory only.
    pub fn open(profile: &str) -> Self {
        match dirs::cache_dir() {
            Some(dir) => Self::open_at(dir.join("procura").join(sanitize(profile)).join(FILE_NAME)),
            None => {
                warn!("No cache directory available; view state will not persist");
                Self::in_memory()
            }
        }
    }

    /// Open the store at an explicit path. Unreadable or corrupt files start
    /// empty.
    pub fn open_at(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!("Ignoring corrupt view state {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("Failed to read view state {:?}: {}", path, e);
                }
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The stored query string for a table.
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.entries.get(namespace).map(String::as_str)
    }

    /// Store a table's query string and write the file.
    pub fn set(&mut self, namespace: &str, query: String) -> io::Result<()> {
        if self.entries.get(namespace) == Some(&query) {
            return Ok(());
        }
        trace!(namespace, query = %query, "View state updated");
        if query.is_empty() {
            self.entries.remove(namespace);
        } else {
            self.entries.insert(namespace.to_string(), query);
        }
        self.save()
    }

    /// Write the map atomically: temporary sibling, then rename.
    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)
    }
}

fn sanitize(name: &str) -> String {
    name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ViewStateStore::open_at(dir.path().join("view_state.json"));
        assert_eq!(store.get("po"), None);
    }

    #[test]
    fn test_set_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("erp").join("view_state.json");

        let mut store = ViewStateStore::open_at(path.clone());
        store.set("po", "po_pageIdx=2&po_rows=20".to_string()).unwrap();
        store.set("pr", "pr_search=cement".to_string()).unwrap();

        let reopened = ViewStateStore::open_at(path.clone());
        assert_eq!(reopened.get("po"), Some("po_pageIdx=2&po_rows=20"));
        assert_eq!(reopened.get("pr"), Some("pr_search=cement"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_empty_query_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view_state.json");
        let mut store = ViewStateStore::open_at(path.clone());
        store.set("po", "po_rows=20".to_string()).unwrap();
        store.set("po", String::new()).unwrap();
        assert_eq!(ViewStateStore::open_at(path).get("po"), None);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view_state.json");
        fs::write(&path, "{not json").unwrap();
        let mut store = ViewStateStore::open_at(path);
        assert_eq!(store.get("po"), None);
        store.set("po", "po_rows=30".to_string()).unwrap();
        assert_eq!(store.get("po"), Some("po_rows=30"));
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = ViewStateStore::in_memory();
        store.set("po", "po_rows=40".to_string()).unwrap();
        assert_eq!(store.get("po"), Some("po_rows=40"));
        assert!(store.path().is_none());
    }
}
