use std::collections::HashMap;
use std::sync::Mutex;

use eyre::{Result, eyre};

use super::KeyValueStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|e| eyre!("Memory store poisoned: {e}"))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
