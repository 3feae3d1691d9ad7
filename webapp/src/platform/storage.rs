use common::storage::SessionStore;

use gloo_console::error as console_error;
use gloo_storage::{SessionStorage, Storage, errors::StorageError};

// values are stored as json strings, so both pages of the site must agree on the encoding.
// they always do since they run the same module
pub struct PageSession;

impl SessionStore for PageSession {
    fn get(&self, key: &str) -> Option<String> {
        match SessionStorage::get::<String>(key) {
            Ok(value) => Some(value),
            Err(StorageError::KeyNotFound(_)) => None,
            Err(err) => {
                console_error!(format!("Failed to fetch session storage {key}: {err}"));
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        SessionStorage::set(key, value)
            .unwrap_or_else(|err| console_error!(format!("Failed to set session storage {key}: {err}")))
    }

    fn remove(&self, key: &str) {
        SessionStorage::delete(key)
    }
}
