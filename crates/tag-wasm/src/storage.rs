//! `localStorage` as the persistence collaborator.

use tag_core::error::PersistError;
use tag_core::persist::KeyValueStore;
use web_sys::Storage;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// The window's `localStorage`, if the page may use it.
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        // Quota errors surface here.
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Write {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&mut self, key: &str) {
        if self.storage.remove_item(key).is_err() {
            log::warn!("could not remove `{key}`");
        }
    }
}
