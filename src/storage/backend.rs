use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::StoreError;

/// String key-value persistence, the shape of browser `localStorage`.
///
/// Methods take `&self`: the store is process-local shared state and
/// implementations handle their own interior mutability.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// In-memory store.
///
/// Used by tests and as the fallback when no persistent backend can be
/// opened. An optional quota mimics the browser's capacity limit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    fail_reads: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `limit` bytes
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota_bytes: Some(limit),
            ..Self::default()
        }
    }

    /// Make every subsequent read fail with `StoreError::Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Raw access for tests that need to plant malformed data
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("reads disabled".to_owned()));
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota_bytes {
            let attempted = self.used_bytes_without(key) + key.len() + value.len();
            if attempted > limit {
                return Err(StoreError::QuotaExceeded { attempted, limit });
            }
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::KeyValueStore;
    use crate::error::StoreError;

    /// Native store: a single JSON object file.
    ///
    /// Every read re-reads the file and every write rewrites it, so the file
    /// is always the single source of truth.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
            match fs::read_to_string(&self.path) {
                Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
                Ok(json) => Ok(serde_json::from_str(&json)?),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
                Err(err) => Err(err.into()),
            }
        }

        /// Like `read_map`, but a file that no longer parses is moved aside
        /// so writes can start over from an empty map.
        fn read_map_for_write(&self) -> Result<BTreeMap<String, String>, StoreError> {
            match self.read_map() {
                Err(StoreError::Serialization(err)) => {
                    let aside = self.corrupt_path();
                    log::error!("Store {} is corrupt ({}), moving it to {}", self.path.display(), err, aside.display());
                    if let Err(err) = fs::rename(&self.path, &aside) {
                        log::warn!("Failed to move corrupt store aside: {}", err);
                    }
                    Ok(BTreeMap::new())
                }
                other => other,
            }
        }

        /// Where an unreadable store file is kept for inspection
        pub fn corrupt_path(&self) -> PathBuf {
            self.path.with_extension("json.corrupt")
        }

        fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(map)?;
            // Write to a sibling file first so a crash never leaves half a store
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl KeyValueStore for FileStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.read_map()?.remove(key))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let mut map = self.read_map_for_write()?;
            map.insert(key.to_owned(), value.to_owned());
            self.write_map(&map)
        }

        fn remove_item(&self, key: &str) -> Result<(), StoreError> {
            let mut map = self.read_map_for_write()?;
            if map.remove(key).is_some() {
                self.write_map(&map)?;
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::KeyValueStore;
    use crate::error::StoreError;

    fn js_error(err: web_sys::wasm_bindgen::JsValue) -> StoreError {
        StoreError::Unavailable(format!("{:?}", err))
    }

    /// Browser `window.localStorage`
    pub struct LocalStore {
        storage: web_sys::Storage,
    }

    impl LocalStore {
        pub fn open() -> Result<Self, StoreError> {
            let window = web_sys::window()
                .ok_or_else(|| StoreError::Unavailable("no window".to_owned()))?;
            let storage = window
                .local_storage()
                .map_err(js_error)?
                .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_owned()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage.get_item(key).map_err(js_error)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage.set_item(key, value).map_err(js_error)
        }

        fn remove_item(&self, key: &str) -> Result<(), StoreError> {
            self.storage.remove_item(key).map_err(js_error)
        }
    }
}
