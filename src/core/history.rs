//! Translation history ledger
//!
//! The ledger is the authoritative, ordered set of translation records for
//! the session. Records are kept newest-first by insertion order, which
//! stays correct even when the clock jumps between inserts. Every mutation
//! mirrors the full ledger into the injected store, so the persisted slot
//! always matches in-memory state without explicit commit calls.

pub mod store;

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::shared::types::TranslationRecord;
use store::HistoryStore;

pub struct HistoryLedger {
    records: Vec<TranslationRecord>,
    last_id: u64,
    store: Arc<dyn HistoryStore>,
}

impl HistoryLedger {
    /// Seed the ledger from the store. Called once per process.
    pub fn load(store: Arc<dyn HistoryStore>) -> Self {
        let records = store.load();
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            records,
            last_id,
            store,
        }
    }

    /// Construct a record with a fresh id and current timestamp, prepend it
    /// and return it. Empty strings are permitted.
    pub fn add(
        &mut self,
        input_text: &str,
        translated_text: &str,
        target_language_code: &str,
        target_language_name: &str,
    ) -> TranslationRecord {
        let record = TranslationRecord {
            id: self.next_id(),
            input_text: input_text.to_string(),
            translated_text: translated_text.to_string(),
            target_language_code: target_language_code.to_string(),
            target_language_name: target_language_name.to_string(),
            created_at: Utc::now(),
        };

        self.records.insert(0, record.clone());
        self.persist();
        record
    }

    /// Remove the record with the matching id. Returns false when no such
    /// record exists; that is a no-op, not an error.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);

        if self.records.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Drop every record unconditionally.
    pub fn clear(&mut self) {
        self.records.clear();
        self.persist();
    }

    /// One page of records, 1-based. Out-of-range page numbers (including
    /// page 0 or a zero page size) yield an empty page.
    pub fn page(&self, page_number: usize, page_size: usize) -> Vec<TranslationRecord> {
        if page_number == 0 || page_size == 0 {
            return Vec::new();
        }

        let start = (page_number - 1).saturating_mul(page_size);
        if start >= self.records.len() {
            return Vec::new();
        }

        let end = (start + page_size).min(self.records.len());
        self.records[start..end].to_vec()
    }

    /// Number of pages at the given page size. An empty ledger has zero
    /// pages, not one.
    pub fn total_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.records.len().div_ceil(page_size)
    }

    /// Tally of the most frequent target language name, with ties broken by
    /// whichever name was encountered first while walking the ledger.
    pub fn most_used_language(&self) -> Option<(String, usize)> {
        let mut tally: Vec<(&str, usize)> = Vec::new();

        for record in &self.records {
            match tally
                .iter()
                .position(|(name, _)| *name == record.target_language_name)
            {
                Some(index) => tally[index].1 += 1,
                None => tally.push((record.target_language_name.as_str(), 1)),
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for (name, count) in tally {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((name, count));
            }
        }

        best.map(|(name, count)| (name.to_string(), count))
    }

    /// Sum of input and output characters over all records.
    pub fn total_characters(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.input_text.chars().count() + r.translated_text.chars().count())
            .sum()
    }

    pub fn find(&self, id: u64) -> Option<TranslationRecord> {
        self.records.iter().find(|record| record.id == id).cloned()
    }

    pub fn records(&self) -> &[TranslationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids are derived from the creation timestamp in milliseconds; if two
    /// records land in the same millisecond the id bumps past the last one
    /// issued, so uniqueness holds by construction.
    fn next_id(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Single mirror point: the store always reflects the ledger after any
    /// mutation. A failed save is logged and the session continues with the
    /// in-memory state as the source of truth.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.records) {
            warn!("failed to persist translation history: {}", e);
        }
    }
}
