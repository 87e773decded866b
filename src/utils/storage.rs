//! Bookmark persistence over `localStorage`.

use log::warn;
use suzuno_core::{KeyValueStorage, MemoryStorage, StorageError};
use web_sys::Storage;

use crate::config::STORAGE_FALLBACK_NOTICE;
use crate::utils::dom;

/// [`KeyValueStorage`] backed by the browser's `localStorage`.
pub struct LocalStorage(Storage);

impl LocalStorage {
    /// Open `localStorage`, which is missing without a window or when the
    /// browser blocks site data.
    pub fn open() -> Result<Self, StorageError> {
        dom::local_storage().map(Self).ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStorage for LocalStorage {
    fn len(&self) -> usize {
        self.0.length().unwrap_or_default() as usize
    }

    fn key(&self, index: usize) -> Option<String> {
        let index = u32::try_from(index).ok()?;
        self.0.key(index).ok().flatten()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.0
            .remove_item(key)
            .map_err(|e| StorageError::WriteFailed(format!("{e:?}")))
    }
}

/// Storage for the bookmark list, in memory when `localStorage` is blocked.
pub fn open_bookmark_storage() -> Box<dyn KeyValueStorage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!("{STORAGE_FALLBACK_NOTICE} ({err})");
            Box::new(MemoryStorage::new())
        }
    }
}
