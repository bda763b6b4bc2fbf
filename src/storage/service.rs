use std::cmp::Reverse;

use serde_json::Value;

use super::KeyValueStore;
use crate::config::AppConfig;
use crate::document::Document;
use crate::error::{StorageError, StorageResult};

/// Durable CRUD over the document collection plus the current-selection
/// pointer.
///
/// The store is treated as an untrusted boundary: every read re-parses the
/// whole collection and validates each entry, and every write rewrites it.
/// Collections are expected to stay small (tens to low hundreds), so there is
/// no index and no cache.
pub struct DiagramStorage<S: KeyValueStore> {
    store: S,
    documents_key: String,
    current_id_key: String,
}

impl<S: KeyValueStore> DiagramStorage<S> {
    /// Storage using the default key names
    pub fn new(store: S) -> Self {
        Self::with_config(store, &AppConfig::default())
    }

    pub fn with_config(store: S, config: &AppConfig) -> Self {
        Self {
            store,
            documents_key: config.documents_key.clone(),
            current_id_key: config.current_id_key.clone(),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All valid documents, newest `updated_at` first.
    ///
    /// Never fails: a missing, empty or corrupt collection reads as empty and
    /// invalid entries are skipped.
    pub fn list(&self) -> Vec<Document> {
        let mut documents = self.read_all();
        // Stable sort: ties keep their stored order. Unparseable dates go last.
        documents.sort_by_key(|doc| Reverse(doc.updated_millis()));
        documents
    }

    /// Number of valid documents
    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.read_all().into_iter().find(|doc| doc.id == id)
    }

    /// Insert or replace by id, then rewrite the collection
    pub fn save(&self, document: &Document) -> StorageResult<()> {
        let mut all = self.read_all();
        match all.iter_mut().find(|doc| doc.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => all.push(document.clone()),
        }
        self.write_all(&all)
    }

    /// Remove by id. Clears the selection pointer if it named `id`.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        let remaining: Vec<Document> = self
            .read_all()
            .into_iter()
            .filter(|doc| doc.id != id)
            .collect();
        self.write_all(&remaining)?;

        if self.current_id().as_deref() == Some(id) {
            self.set_current_id(None)?;
        }
        Ok(())
    }

    /// The persisted selection. Read failures are logged and read as `None`.
    pub fn current_id(&self) -> Option<String> {
        match self.store.get_item(&self.current_id_key) {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(err) => {
                log::error!("Failed to read current diagram id: {}", err);
                None
            }
        }
    }

    /// Persist the selection; `None` (or an empty id) removes the key
    pub fn set_current_id(&self, id: Option<&str>) -> StorageResult<()> {
        let result = match id {
            Some(id) if !id.is_empty() => self.store.set_item(&self.current_id_key, id),
            _ => self.store.remove_item(&self.current_id_key),
        };
        result.map_err(|source| StorageError::WriteFailed {
            key: self.current_id_key.clone(),
            source,
        })
    }

    fn read_all(&self) -> Vec<Document> {
        let raw = match self.store.get_item(&self.documents_key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(err) => {
                log::error!("Failed to read diagrams from storage: {}", err);
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(other) => {
                log::error!(
                    "Diagram storage is corrupted: expected an array, found {}",
                    json_kind(&other)
                );
                return Vec::new();
            }
            Err(err) => {
                log::error!("Failed to read diagrams from storage: {}", err);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Document>(entry.clone()) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    log::warn!("Skipping invalid diagram entry in storage ({}): {}", err, entry);
                    None
                }
            })
            .collect()
    }

    fn write_all(&self, documents: &[Document]) -> StorageResult<()> {
        let json = serde_json::to_string(documents)?;
        self.store
            .set_item(&self.documents_key, &json)
            .map_err(|source| StorageError::WriteFailed {
                key: self.documents_key.clone(),
                source,
            })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
