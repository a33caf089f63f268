//! Lazy, restartable view over a record's audit trail.

use crate::ports::inbound::AuditLog;
use shared_types::{RecordId, StatusHistoryEntry, StorageResult};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of entries fetched per page.
pub const DEFAULT_HISTORY_PAGE: usize = 64;

/// Handle to the history of one record.
///
/// Nothing is read until iteration starts. Each call to [`History::iter`]
/// starts again from the first entry and sees entries appended since.
pub struct History<A: ?Sized> {
    log: Arc<A>,
    record_id: RecordId,
    page_size: usize,
}

impl<A: AuditLog + ?Sized> History<A> {
    pub fn new(log: Arc<A>, record_id: RecordId) -> Self {
        Self {
            log,
            record_id,
            page_size: DEFAULT_HISTORY_PAGE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn iter(&self) -> HistoryIter<'_, A> {
        HistoryIter {
            log: &*self.log,
            record_id: self.record_id,
            page_size: self.page_size,
            next_sequence: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Read the whole trail into memory.
    pub fn to_vec(&self) -> StorageResult<Vec<StatusHistoryEntry>> {
        self.iter().collect()
    }
}

impl<'a, A: AuditLog + ?Sized> IntoIterator for &'a History<A> {
    type Item = StorageResult<StatusHistoryEntry>;
    type IntoIter = HistoryIter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over history entries in sequence order.
///
/// A storage error is yielded once and ends the iteration.
pub struct HistoryIter<'a, A: ?Sized> {
    log: &'a A,
    record_id: RecordId,
    page_size: usize,
    next_sequence: u32,
    buffer: VecDeque<StatusHistoryEntry>,
    exhausted: bool,
}

impl<A: AuditLog + ?Sized> Iterator for HistoryIter<'_, A> {
    type Item = StorageResult<StatusHistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.buffer.pop_front() {
            return Some(Ok(entry));
        }
        if self.exhausted {
            return None;
        }

        match self
            .log
            .history_page(&self.record_id, self.next_sequence, self.page_size)
        {
            Ok(page) => {
                if page.len() < self.page_size {
                    self.exhausted = true;
                }
                if let Some(last) = page.last() {
                    self.next_sequence = last.sequence.saturating_add(1);
                }
                self.buffer.extend(page);
                self.buffer.pop_front().map(Ok)
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}
