use std::collections::HashMap;
use std::sync::Mutex;

use crate::{Result, Slot, SlotStore, StoreError};

/// In-process store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        let slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        slots.insert(slot, value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_independent() {
        let store = MemoryStore::new();
        store.set(Slot::Registrations, "[1]").unwrap();
        store.set(Slot::Gallery, "[2]").unwrap();

        assert_eq!(store.get(Slot::Registrations).unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get(Slot::Gallery).unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.get(Slot::Announcements).unwrap(), None);
    }
}
