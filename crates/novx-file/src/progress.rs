//! The word-count ledger: a date-keyed log of daily word-count snapshots.

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

/// One day's cumulative word counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCountEntry {
    /// Words in normal sections.
    pub count: usize,
    /// Words in normal and unused sections.
    pub with_unused: usize,
}

/// Append-mostly log of daily word counts, keyed and iterated by date.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    entries: BTreeMap<NaiveDate, WordCountEntry>,
}

impl ProgressLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<WordCountEntry> {
        self.entries.get(&date).copied()
    }

    /// Records a snapshot, replacing any entry already logged for `date`.
    pub fn record(&mut self, date: NaiveDate, entry: WordCountEntry) {
        self.entries.insert(date, entry);
    }

    /// Records today's snapshot; called by the writer when word-count
    /// logging is enabled.
    pub fn record_today(&mut self, count: usize, with_unused: usize) {
        self.record(Local::now().date_naive(), WordCountEntry { count, with_unused });
    }

    /// Entries in chronological order.
    pub fn iter(&self) -> btree_map::Iter<'_, NaiveDate, WordCountEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ProgressLog {
    type Item = (&'a NaiveDate, &'a WordCountEntry);
    type IntoIter = btree_map::Iter<'a, NaiveDate, WordCountEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn entries_iterate_in_date_order() {
        let mut log = ProgressLog::new();
        log.record(date(20), WordCountEntry { count: 30, with_unused: 35 });
        log.record(date(3), WordCountEntry { count: 10, with_unused: 12 });
        let dates: Vec<NaiveDate> = log.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, [date(3), date(20)]);
    }

    #[test]
    fn recording_a_date_twice_replaces_the_entry() {
        let mut log = ProgressLog::new();
        log.record(date(1), WordCountEntry { count: 10, with_unused: 10 });
        log.record(date(1), WordCountEntry { count: 25, with_unused: 30 });
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.get(date(1)),
            Some(WordCountEntry { count: 25, with_unused: 30 })
        );
    }

    #[test]
    fn record_today_lands_on_the_current_date() {
        let mut log = ProgressLog::new();
        log.record_today(100, 120);
        assert_eq!(
            log.get(Local::now().date_naive()),
            Some(WordCountEntry { count: 100, with_unused: 120 })
        );
    }
}
