use serde::{Deserialize, Serialize};

use crate::id_generator;
use crate::util::time;

/// A named, persisted diagram.
///
/// `content` is the full serialized diagram body and is never inspected or
/// rewritten by storage. All fields are plain strings so the persisted shape
/// stays `{id, name, content, createdAt, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Document {
    /// Creates a document with a fresh id, stamped with the current time
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(id_generator::generate_id(), name, content)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = time::now_iso8601();
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Returns a copy carrying new content and a refreshed `updated_at`
    pub fn revised(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            updated_at: time::now_iso8601(),
            ..self.clone()
        }
    }

    /// `updated_at` as epoch milliseconds, `None` if it doesn't parse
    pub fn updated_millis(&self) -> Option<i64> {
        time::parse_iso8601_millis(&self.updated_at)
    }
}
