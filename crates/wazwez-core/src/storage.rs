use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// Raw string key-value backend. Browser local storage in the web crate,
/// [`MemoryStore`] everywhere else.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<BTreeMap<String, String>>>,
    read_only: Rc<RefCell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail, the way a full or locked browser store does.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.borrow_mut() = read_only;
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if *self.read_only.borrow() {
            return Err(anyhow!("store is read-only"));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        if *self.read_only.borrow() {
            return Err(anyhow!("store is read-only"));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub tasks: String,
    pub completed: String,
    pub task_counter: String,
    pub subtask_counter: String,
    pub form_draft: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            tasks: format!("{namespace}_tasks"),
            completed: format!("{namespace}_completed_tasks"),
            task_counter: format!("{namespace}_task_counter"),
            subtask_counter: format!("{namespace}_subtask_counter"),
            form_draft: format!("{namespace}_temp_form_data"),
        }
    }

    pub fn all(&self) -> [&str; 5] {
        [
            &self.tasks,
            &self.completed,
            &self.task_counter,
            &self.subtask_counter,
            &self.form_draft,
        ]
    }
}

/// Best-effort JSON accessor. Nothing here returns an error: failures are
/// logged and reads fall back to the caller's default.
#[derive(Debug, Clone)]
pub struct Storage<S> {
    backend: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(backend: S, namespace: &str) -> Self {
        Self {
            backend,
            keys: StorageKeys::new(namespace),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Returns whether the write landed.
    #[tracing::instrument(skip(self, value))]
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .with_context(|| format!("failed to encode {key}"))
            .and_then(|json| {
                self.backend
                    .set_item(key, &json)
                    .with_context(|| format!("failed to write {key}"))
            });

        match result {
            Ok(()) => {
                debug!(key, "saved to storage");
                true
            }
            Err(err) => {
                error!(key, error = %err, "storage save failed");
                false
            }
        }
    }

    #[tracing::instrument(skip(self, default))]
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored value; using default");
                return default;
            }
            Err(err) => {
                error!(key, error = %err, "storage read failed");
                return default;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed parsing stored value; using default");
                default
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove_item(key) {
            error!(key, error = %err, "storage remove failed");
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_all(&self) {
        for key in self.keys.all() {
            self.remove(key);
        }
        debug!("cleared all known storage keys");
    }
}
