use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Persistent key-value storage: string keys mapped to JSON-serialized
/// values, with no schema enforcement beyond what each reader tolerates.
/// All operations are synchronous; the store is local to the process and
/// accessed exclusively from the caller's thread of control.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory store. A fresh process starts empty; within a process the
/// contents survive across every service that shares the handle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().expect("storage lock poisoned").insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("storage lock poisoned").remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().expect("storage lock poisoned").keys().cloned().collect()
    }
}

/// Read a JSON value. Malformed data is logged and treated as absent,
/// never surfaced as an error.
pub(crate) fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "discarding malformed stored value");
            None
        }
    }
}

pub(crate) fn set_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw),
        Err(err) => warn!(key, %err, "failed to serialize value for storage"),
    }
}

/// Prepend `item` to the list stored at `key`, truncating to `cap` entries.
pub(crate) fn push_capped<T: Serialize + DeserializeOwned>(store: &dyn KeyValueStore, key: &str, item: T, cap: usize) {
    let mut items: Vec<T> = get_json(store, key).unwrap_or_default();
    items.insert(0, item);
    items.truncate(cap);
    set_json(store, key, &items);
}
