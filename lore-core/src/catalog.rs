//! Catalog file loading and memoization.
//!
//! Catalogs are JSON files located at `<root>/<domain>/<path...>/catalog.json`.
//! The cache maps `(domain, path)` to the parsed tree and guarantees each key
//! is loaded at most once, even under concurrent first lookups.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, warn};

/// File name of a catalog within its domain/path directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Cache key: one catalog file per `(domain, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub domain: String,
    pub path: Vec<String>,
}

impl CatalogKey {
    pub fn new(domain: impl Into<String>, path: &[String]) -> Self {
        CatalogKey {
            domain: domain.into(),
            path: path.to_vec(),
        }
    }
}

/// Outcome of loading one catalog file.
///
/// A missing file is not an error; it stays in the cache as `NotFound` so
/// repeated lookups do not retry the filesystem. Unparsable content is kept
/// distinct as `Malformed` so the validator can report it specifically.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    Loaded(Arc<Value>),
    NotFound,
    Malformed(String),
}

/// A memoized catalog entry. Immutable once created; `clear` replaces the
/// whole table rather than mutating entries in place.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: CatalogKey,
    pub status: LoadStatus,
}

impl CatalogEntry {
    /// The parsed tree, if the load succeeded.
    pub fn tree(&self) -> Option<&Arc<Value>> {
        match &self.status {
            LoadStatus::Loaded(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded(_))
    }
}

/// Lazy, memoizing loader for a content root.
///
/// Each key owns a `OnceLock` cell, so a miss-then-populate sequence is
/// mutually exclusive per key rather than globally: concurrent first touches
/// of the same catalog block on one load, while lookups of other keys and
/// reads of populated entries proceed untouched.
pub struct CatalogCache {
    root: PathBuf,
    entries: RwLock<HashMap<CatalogKey, Arc<OnceLock<Arc<CatalogEntry>>>>>,
}

impl CatalogCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CatalogCache {
            root: root.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The content root this cache reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetch the catalog for `(domain, path)`, loading it on first use.
    pub fn get(&self, domain: &str, path: &[String]) -> Arc<CatalogEntry> {
        let key = CatalogKey::new(domain, path);
        self.cell(key.clone())
            .get_or_init(|| Arc::new(self.load(key)))
            .clone()
    }

    /// Eagerly load every catalog under the root, classifying each JSON file
    /// by its directory depth (first component is the domain, the remaining
    /// directory components form the path). Returns the number of catalog
    /// files discovered. Used by tooling and batch validation to avoid
    /// per-file misses during a sweep.
    pub fn load_all(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let file = entry.path();
                if file.is_dir() {
                    stack.push(file);
                } else if file.extension().map(|e| e == "json").unwrap_or(false) {
                    let Some(key) = self.classify(&file) else {
                        continue;
                    };
                    self.cell(key.clone())
                        .get_or_init(|| Arc::new(self.load_from(key, &file)));
                    count += 1;
                }
            }
        }
        debug!(root = %self.root.display(), count, "warmed catalog cache");
        count
    }

    /// Discard all entries. In-flight readers keep their `Arc`s; subsequent
    /// lookups reload from storage.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of memoized entries (loaded or otherwise).
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: CatalogKey) -> Arc<OnceLock<Arc<CatalogEntry>>> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(key).or_default().clone()
    }

    fn load(&self, key: CatalogKey) -> CatalogEntry {
        let file = self.catalog_file(&key);
        self.load_from(key, &file)
    }

    fn load_from(&self, key: CatalogKey, file: &Path) -> CatalogEntry {
        let status = match fs::read_to_string(file) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(tree) => LoadStatus::Loaded(Arc::new(tree)),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "malformed catalog");
                    LoadStatus::Malformed(e.to_string())
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => LoadStatus::NotFound,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "unreadable catalog");
                LoadStatus::Malformed(e.to_string())
            }
        };
        debug!(file = %file.display(), loaded = matches!(status, LoadStatus::Loaded(_)), "catalog load");
        CatalogEntry { key, status }
    }

    /// Absolute path of the catalog file for a key.
    fn catalog_file(&self, key: &CatalogKey) -> PathBuf {
        let mut path = self.root.join(&key.domain);
        for segment in &key.path {
            path.push(segment);
        }
        path.push(CATALOG_FILE);
        path
    }

    /// Classify a scanned file into a cache key by directory depth. Files
    /// directly under the root have no domain and are skipped.
    fn classify(&self, file: &Path) -> Option<CatalogKey> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let dir = relative.parent()?;
        let mut components = dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        let domain = components.next()?;
        Some(CatalogKey {
            domain,
            path: components.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_catalog(root: &Path, dir: &str, tree: &Value) {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CATALOG_FILE), serde_json::to_string_pretty(tree).unwrap()).unwrap();
    }

    fn sample_tree() -> Value {
        json!({
            "metadata": { "version": 1 },
            "weapon_types": {
                "swords": { "items": [ { "name": "iron-longsword", "damage": 10 } ] }
            }
        })
    }

    #[test]
    fn test_get_loads_and_caches() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "items/weapons", &sample_tree());

        let cache = CatalogCache::new(root.path());
        let entry = cache.get("items", &["weapons".to_string()]);
        assert!(entry.is_loaded());
        assert_eq!(cache.len(), 1);

        // Second lookup returns the same tree without reloading.
        let again = cache.get("items", &["weapons".to_string()]);
        assert!(Arc::ptr_eq(entry.tree().unwrap(), again.tree().unwrap()));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let root = TempDir::new().unwrap();
        let cache = CatalogCache::new(root.path());
        let entry = cache.get("items", &[]);
        assert!(matches!(entry.status, LoadStatus::NotFound));
        // The miss itself is memoized.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unparsable_file_is_malformed() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("items");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CATALOG_FILE), "{ not json").unwrap();

        let cache = CatalogCache::new(root.path());
        let entry = cache.get("items", &[]);
        assert!(matches!(entry.status, LoadStatus::Malformed(_)));
    }

    #[test]
    fn test_clear_reloads() {
        let root = TempDir::new().unwrap();
        let cache = CatalogCache::new(root.path());
        assert!(matches!(cache.get("items", &[]).status, LoadStatus::NotFound));

        // The catalog appears after the first (missing) load.
        write_catalog(root.path(), "items", &sample_tree());
        assert!(matches!(cache.get("items", &[]).status, LoadStatus::NotFound));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("items", &[]).is_loaded());
    }

    #[test]
    fn test_load_all_classifies_by_depth() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "items/weapons", &sample_tree());
        write_catalog(root.path(), "items/weapons/melee", &sample_tree());
        write_catalog(root.path(), "abilities", &sample_tree());

        let cache = CatalogCache::new(root.path());
        assert_eq!(cache.load_all(), 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.get("items", &["weapons".to_string()]).is_loaded());
        assert!(cache
            .get("items", &["weapons".to_string(), "melee".to_string()])
            .is_loaded());
        assert!(cache.get("abilities", &[]).is_loaded());
    }

    #[test]
    fn test_concurrent_first_touch_single_flight() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "items/weapons", &sample_tree());

        let cache = Arc::new(CatalogCache::new(root.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get("items", &["weapons".to_string()]))
            })
            .collect();
        let entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Everyone observes the one tree the single load produced.
        let first = entries[0].tree().unwrap();
        for entry in &entries[1..] {
            assert!(Arc::ptr_eq(first, entry.tree().unwrap()));
        }
        assert_eq!(cache.len(), 1);
    }
}
