pub mod memory;
pub mod migrations;
pub mod queries;

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Named storage slots. Each slot holds one JSON array for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Registrations,
    CategoryFees,
    Panchayaths,
    Announcements,
    Gallery,
    Notifications,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Self::Registrations => "sedp_registrations",
            Self::CategoryFees => "sedp_category_fees",
            Self::Panchayaths => "sedp_panchayaths",
            Self::Announcements => "sedp_announcements",
            Self::Gallery => "sedp_photo_gallery",
            Self::Notifications => "sedp_notifications",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Durable key-value storage for serialized collections.
///
/// Values are opaque JSON text; callers own (de)serialization. A `set`
/// replaces the whole slot, so the last writer wins.
pub trait SlotStore: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>>;
    fn set(&self, slot: Slot, value: &str) -> Result<()>;
}

/// SQLite-backed slot store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }
}

impl SlotStore for Database {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        self.read_slot(slot)
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        self.write_slot(slot, value)
    }
}
