use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use smartstring::alias::String;

use super::{KvStore, Result};

/// Store keeping every list in process memory.
///
/// Clones share the same underlying map, so two handles model two consumers
/// of one shared store. Nothing survives the process; useful for tests and
/// for callers that only want the set semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
        // A poisoned map is still a valid map; recover rather than panic.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        self.entries().insert(key.into(), values.to_vec());
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}
