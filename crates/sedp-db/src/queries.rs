use rusqlite::OptionalExtension;

use crate::{Database, Result, Slot};

impl Database {
    pub fn read_slot(&self, slot: Slot) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM slots WHERE name = ?1",
                    [slot.name()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    /// Replace the whole slot value.
    pub fn write_slot(&self, slot: Slot, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slots (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                (slot.name(), value),
            )?;
            Ok(())
        })
    }

    /// Last write time of a slot as stored by SQLite ("YYYY-MM-DD HH:MM:SS", UTC).
    pub fn slot_updated_at(&self, slot: Slot) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT updated_at FROM slots WHERE name = ?1",
                    [slot.name()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }
}
