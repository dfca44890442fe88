//! Durable mirror of the translation history.
//!
//! The entire record sequence lives in one named slot: a single key in a
//! redb table holding the JSON serialization of the full list. Saves are
//! full-snapshot overwrites; an empty history deletes the slot instead of
//! writing an empty list, so "no history yet" and "history cleared" look
//! identical on the next load.

use std::path::Path;
use std::sync::Mutex;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::warn;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::TranslationRecord;

/// Redb table holding the single history slot.
const HISTORY_TABLE: TableDefinition<&str, &str> = TableDefinition::new("translation_history");

/// Key of the slot inside [`HISTORY_TABLE`].
const SLOT_KEY: &str = "records";

/// Storage boundary for the history ledger.
///
/// `load` never fails: an absent slot is an empty history, and a corrupt
/// slot is cleared and reported as empty. Only `save` surfaces errors, and
/// the ledger downgrades those to log lines since in-memory state stays
/// authoritative either way.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Vec<TranslationRecord>;
    fn save(&self, records: &[TranslationRecord]) -> AppResult<()>;
}

/// Redb-backed store.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Io(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| AppError::Io(format!("Failed to open history database: {}", e)))?;

        Ok(Self { db })
    }

    fn read_slot(&self) -> AppResult<Option<String>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AppError::Io(format!("Failed to begin read: {}", e)))?;

        // The table does not exist until the first save
        let table = match read_txn.open_table(HISTORY_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(AppError::Io(format!("Failed to open table: {}", e))),
        };

        let value = table
            .get(SLOT_KEY)
            .map_err(|e| AppError::Io(format!("Failed to read slot: {}", e)))?;

        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn write_slot(&self, value: Option<&str>) -> AppResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| AppError::Io(format!("Failed to begin write: {}", e)))?;

        {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .map_err(|e| AppError::Io(format!("Failed to open table: {}", e)))?;

            match value {
                Some(serialized) => {
                    table
                        .insert(SLOT_KEY, serialized)
                        .map_err(|e| AppError::Io(format!("Failed to write slot: {}", e)))?;
                }
                None => {
                    table
                        .remove(SLOT_KEY)
                        .map_err(|e| AppError::Io(format!("Failed to clear slot: {}", e)))?;
                }
            }
        }

        write_txn
            .commit()
            .map_err(|e| AppError::Io(format!("Failed to commit: {}", e)))
    }
}

impl HistoryStore for RedbStore {
    fn load(&self) -> Vec<TranslationRecord> {
        let serialized = match self.read_slot() {
            Ok(Some(serialized)) => serialized,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("failed to read history slot, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TranslationRecord>>(&serialized) {
            Ok(records) => records,
            Err(e) => {
                // Corrupt slot: discard it so the next load starts clean
                warn!("discarding corrupt history slot: {}", e);
                if let Err(e) = self.write_slot(None) {
                    warn!("failed to clear corrupt history slot: {}", e);
                }
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[TranslationRecord]) -> AppResult<()> {
        if records.is_empty() {
            return self.write_slot(None);
        }
        let serialized = serde_json::to_string(records)?;
        self.write_slot(Some(&serialized))
    }
}

/// In-memory store, used as the production fallback when the database
/// cannot be opened and as the test double. Models the same single-slot
/// contract: the slot holds the serialized list or nothing at all.
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Vec<TranslationRecord> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let serialized = match slot.as_ref() {
            Some(serialized) => serialized,
            None => return Vec::new(),
        };

        match serde_json::from_str::<Vec<TranslationRecord>>(serialized) {
            Ok(records) => records,
            Err(e) => {
                warn!("discarding corrupt history slot: {}", e);
                *slot = None;
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[TranslationRecord]) -> AppResult<()> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if records.is_empty() {
            *slot = None;
        } else {
            *slot = Some(serde_json::to_string(records)?);
        }
        Ok(())
    }
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn slot_is_present(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    pub(crate) fn set_raw_slot(&self, value: &str) {
        *self.slot.lock().unwrap() = Some(value.to_string());
    }
}

#[cfg(test)]
impl RedbStore {
    fn slot_is_present(&self) -> bool {
        self.read_slot().unwrap().is_some()
    }

    fn set_raw_slot(&self, value: &str) {
        self.write_slot(Some(value)).unwrap();
    }
}
