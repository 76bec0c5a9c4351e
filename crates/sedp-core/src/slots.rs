use serde::de::{Deserialize, DeserializeOwned};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use sedp_db::{Slot, SlotStore};

use crate::error::{Error, Result};

/// Decoded contents of a slot. Entries that fail to decode are carried along
/// untouched, so writing the list back never drops them.
pub(crate) struct SlotList<T> {
    pub records: Vec<T>,
    unreadable: Vec<Value>,
}

impl<T> SlotList<T> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            records,
            unreadable: Vec::new(),
        }
    }

    /// Nothing stored at all, readable or not.
    pub fn is_blank(&self) -> bool {
        self.records.is_empty() && self.unreadable.is_empty()
    }
}

/// Read a slot entry by entry. A missing slot or one that is not a JSON
/// array reads as empty; only a failing store is an error.
pub(crate) fn read_list<T: DeserializeOwned>(store: &dyn SlotStore, slot: Slot) -> Result<SlotList<T>> {
    let Some(raw) = store.get(slot)? else {
        return Ok(SlotList::empty());
    };

    let entries: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Slot {} is corrupt, treating it as empty: {}", slot, e);
            return Ok(SlotList::empty());
        }
    };

    let mut list = SlotList::empty();
    for entry in entries {
        match T::deserialize(&entry) {
            Ok(record) => list.records.push(record),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", slot, e);
                list.unreadable.push(entry);
            }
        }
    }
    Ok(list)
}

/// Persist `list`, unreadable entries included after the decoded ones.
pub(crate) fn write_list<T: Serialize>(store: &dyn SlotStore, slot: Slot, list: &SlotList<T>) -> Result<()> {
    let mut entries = encode(slot, &list.records)?;
    entries.extend(list.unreadable.iter().cloned());
    persist(store, slot, &entries)
}

/// Replace the slot with exactly `records`.
pub(crate) fn write_records<T: Serialize>(store: &dyn SlotStore, slot: Slot, records: &[T]) -> Result<()> {
    let entries = encode(slot, records)?;
    persist(store, slot, &entries)
}

fn encode<T: Serialize>(slot: Slot, records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|source| Error::Encode { slot, source })
}

fn persist(store: &dyn SlotStore, slot: Slot, entries: &[Value]) -> Result<()> {
    let raw = serde_json::to_string(entries).map_err(|source| Error::Encode { slot, source })?;
    store.set(slot, &raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sedp_db::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        n: u32,
    }

    #[test]
    fn bad_entries_survive_a_write() {
        let store = MemoryStore::new();
        store
            .set(Slot::Gallery, r#"[{"n":1},{"n":"two"},{"n":3}]"#)
            .unwrap();

        let mut list = read_list::<Item>(&store, Slot::Gallery).unwrap();
        assert_eq!(list.records, vec![Item { n: 1 }, Item { n: 3 }]);

        list.records.push(Item { n: 4 });
        write_list(&store, Slot::Gallery, &list).unwrap();

        let raw: Value = serde_json::from_str(&store.get(Slot::Gallery).unwrap().unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!([{"n":1},{"n":3},{"n":4},{"n":"two"}]));
    }

    #[test]
    fn non_array_reads_as_blank() {
        let store = MemoryStore::new();
        store.set(Slot::Gallery, "{not json").unwrap();
        assert!(read_list::<Item>(&store, Slot::Gallery).unwrap().is_blank());
    }
}
