use crate::record::{CopyRecord, SenderInfo};
use crate::settings::DEFAULT_MAX_HISTORY;

/// Newest-first list of copy records bounded by `max_size`.
///
/// Invariant: `len() <= max_size()` after every mutation. Persistence is the
/// caller's job; mutators report whether anything changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryList {
    records: Vec<CopyRecord>,
    max_size: usize,
}

impl Default for HistoryList {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryList {
    /// A zero bound is raised to one.
    pub fn new(max_size: usize) -> Self {
        Self {
            records: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Restores a previously persisted list, truncating it to the bound.
    pub fn from_records(records: Vec<CopyRecord>, max_size: usize) -> Self {
        let mut list = Self::new(max_size);
        list.records = records;
        list.truncate();
        list
    }

    /// Prepends a new record and drops the oldest entries beyond the bound.
    ///
    /// `now_ms` becomes the record id unless the newest record already holds that
    /// id (or a later one), in which case the id is bumped past it.
    pub fn record(
        &mut self,
        text: impl Into<String>,
        element_tag: impl Into<String>,
        timestamp: i64,
        sender: &SenderInfo,
        now_ms: i64,
    ) -> &CopyRecord {
        let id = match self.records.first() {
            Some(newest) if newest.id >= now_ms => newest.id + 1,
            _ => now_ms,
        };
        self.records.insert(
            0,
            CopyRecord {
                id,
                text: text.into(),
                element_tag: element_tag.into(),
                timestamp,
                url: sender.url.clone(),
                title: sender.title.clone(),
                favicon: sender.favicon.clone(),
            },
        );
        self.truncate();
        &self.records[0]
    }

    /// Empties the list. Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_records = !self.records.is_empty();
        self.records.clear();
        had_records
    }

    pub fn list(&self) -> &[CopyRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&CopyRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Updates the bound. Returns `true` if records were dropped.
    pub fn set_max_size(&mut self, max_size: usize) -> bool {
        self.max_size = max_size.max(1);
        self.truncate()
    }

    fn truncate(&mut self) -> bool {
        if self.records.len() > self.max_size {
            self.records.truncate(self.max_size);
            true
        } else {
            false
        }
    }
}
