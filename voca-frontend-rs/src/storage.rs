//! Durable key-value persistence for [`Progress`].
//!
//! The store writes after every action that changes durable state. Saving is
//! best-effort: callers log failures and carry on.

use std::collections::BTreeMap;

use crate::progress::{Progress, VersionedProgress};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode progress: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read progress saved under `key`. Missing or unreadable data yields the defaults.
pub fn load_progress<S: KeyValueStore>(storage: &S, key: &str) -> Progress {
    let json = match storage.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return Progress::default(),
        Err(e) => {
            log::warn!("Could not read saved progress under {key}: {e}");
            return Progress::default();
        }
    };

    match serde_json::from_str::<VersionedProgress>(&json) {
        Ok(versioned) => versioned.into(),
        Err(e) => {
            log::warn!("Saved progress under {key} is unreadable, starting fresh: {e}");
            Progress::default()
        }
    }
}

pub fn save_progress<S: KeyValueStore>(
    storage: &mut S,
    key: &str,
    progress: &Progress,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&VersionedProgress::from(progress.clone()))?;
    storage.set(key, &json)
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use super::{KeyValueStore, StorageError};

    /// `window.localStorage`
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn new() -> Result<Self, StorageError> {
            let window = web_sys::window()
                .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
            let storage = window
                .local_storage()
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
                .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(key)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage
                .remove_item(key)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }
    }

    #[test]
    fn missing_progress_is_default() {
        let storage = MemoryStore::new();
        assert_eq!(load_progress(&storage, "quiz-storage"), Progress::default());
    }

    #[test]
    fn corrupt_progress_is_default() {
        let mut storage = MemoryStore::new();
        storage.set("quiz-storage", "{not json").unwrap();
        assert_eq!(load_progress(&storage, "quiz-storage"), Progress::default());

        storage
            .set("quiz-storage", r#"{"version":"V9","xp":3}"#)
            .unwrap();
        assert_eq!(load_progress(&storage, "quiz-storage"), Progress::default());
    }

    #[test]
    fn failing_backend_is_default() {
        assert_eq!(load_progress(&BrokenStore, "quiz-storage"), Progress::default());
        assert!(save_progress(&mut BrokenStore, "quiz-storage", &Progress::default()).is_err());
    }

    #[test]
    fn save_then_load() {
        let mut storage = MemoryStore::new();
        let mut progress = Progress::default();
        progress.xp = 1500;
        progress.level = 2;
        progress.streak = 4;
        save_progress(&mut storage, "other-key", &progress).unwrap();

        assert_eq!(load_progress(&storage, "other-key"), progress);
        assert_eq!(load_progress(&storage, "quiz-storage"), Progress::default());

        storage.remove("other-key").unwrap();
        assert_eq!(load_progress(&storage, "other-key"), Progress::default());
    }
}
