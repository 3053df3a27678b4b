//! Persistence port.
//!
//! The stores read and write whole serialized records through this trait;
//! what sits behind it (SQLite, flat files, an in-memory map) is the host's
//! choice. Every record is one JSON blob replaced wholesale on each
//! mutation, and unparseable data is discarded in favor of a default rather
//! than surfaced as an error.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Record key for the serialized learner profile.
pub const KEY_USER: &str = "savedUser";
/// Record key for user-authored lessons (catalog lessons are never persisted).
pub const KEY_CUSTOM_LESSONS: &str = "custom_lessons";
/// Record key for the lesson id -> progress map.
pub const KEY_LESSON_PROGRESS: &str = "lesson_progress";
/// Record key for user-authored quizzes.
pub const KEY_CUSTOM_QUIZZES: &str = "custom_quizzes";
/// Record key for the quiz id -> progress map.
pub const KEY_QUIZ_PROGRESS: &str = "quiz_progress";

/// Byte-oriented key/value store.
pub trait StorageBackend: Send + Sync {
    /// Returns the stored bytes for `key`, or `None` if absent.
    fn load(&self, key: &str) -> Option<Vec<u8>>;

    /// Replaces the stored bytes for `key`. Failures are the backend's to
    /// log; the stores treat saves as fire-and-forget.
    fn save(&self, key: &str, bytes: &[u8]);
}

/// Deserialize the record at `key`, falling back to `None` when the record
/// is absent or malformed. Malformed data is logged and dropped.
pub(crate) fn load_json<T: DeserializeOwned>(storage: &dyn StorageBackend, key: &str) -> Option<T> {
    let bytes = storage.load(key)?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, %err, "discarding malformed persisted record");
            None
        }
    }
}

/// Serialize `value` and write it through to `key`.
pub(crate) fn save_json<T: Serialize>(storage: &dyn StorageBackend, key: &str, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => storage.save(key, &bytes),
        Err(err) => tracing::warn!(key, %err, "failed to serialize record"),
    }
}

/// In-memory backend for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.records.lock().expect("storage lock").get(key).cloned()
    }

    fn save(&self, key: &str, bytes: &[u8]) {
        self.records
            .lock()
            .expect("storage lock")
            .insert(key.to_string(), bytes.to_vec());
    }
}
