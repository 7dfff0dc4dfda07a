//! Playback time to block resolution.
//!
//! Forward lookups answer "which block is the video showing at time `t`": the
//! entry with the greatest time `<= t`, or [`BlockId::NONE`] before the first
//! entry. Reverse lookups answer "where should the video seek for this block":
//! the time of the block's last entry in sequence order, so a repeated passage
//! seeks to its final occurrence.

use std::collections::HashMap;

use crate::block::BlockId;
use crate::model::TimeEntry;

#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    entries: Vec<TimeEntry>,
    last_occurrence: HashMap<BlockId, f64>,
}

impl TimeIndex {
    /// Build from entries already sorted by ascending time.
    pub fn new(entries: Vec<TimeEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].time <= w[1].time));
        let mut last_occurrence = HashMap::with_capacity(entries.len());
        for entry in &entries {
            last_occurrence.insert(entry.block, entry.time);
        }
        Self {
            entries,
            last_occurrence,
        }
    }

    /// Block active at playback time `time`.
    pub fn resolve(&self, time: f64) -> BlockId {
        let after = self.entries.partition_point(|entry| entry.time <= time);
        match after.checked_sub(1) {
            Some(i) => self.entries[i].block,
            None => BlockId::NONE,
        }
    }

    /// Seek target for `block`: the time of its last listed entry.
    pub fn seek_time(&self, block: BlockId) -> Option<f64> {
        self.last_occurrence.get(&block).copied()
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the final entry, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.entries.last().map(|entry| entry.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat_index() -> TimeIndex {
        TimeIndex::new(vec![
            TimeEntry::new(5, 0.0),
            TimeEntry::new(6, 10.0),
            TimeEntry::new(5, 20.0),
        ])
    }

    #[test]
    fn test_empty_index_always_resolves_to_sentinel() {
        let index = TimeIndex::new(Vec::new());
        assert_eq!(index.resolve(0.0), BlockId::NONE);
        assert_eq!(index.resolve(1e9), BlockId::NONE);
        assert_eq!(index.seek_time(BlockId(5)), None);
        assert!(index.is_empty());
        assert_eq!(index.end_time(), None);
    }

    #[test]
    fn test_resolve_between_entries() {
        let index = repeat_index();
        assert_eq!(index.resolve(15.0), BlockId(6));
        assert_eq!(index.resolve(9.999), BlockId(5));
        assert_eq!(index.resolve(25.0), BlockId(5));
    }

    #[test]
    fn test_resolve_exact_boundaries() {
        let index = TimeIndex::new(vec![TimeEntry::new(5, 2.0), TimeEntry::new(6, 10.0)]);
        assert_eq!(index.resolve(2.0), BlockId(5));
        assert_eq!(index.resolve(10.0), BlockId(6));
        assert_eq!(index.resolve(1.999), BlockId::NONE);
    }

    #[test]
    fn test_resolve_each_entry_time_round_trips() {
        let index = TimeIndex::new(vec![
            TimeEntry::new(1, 0.5),
            TimeEntry::new(2, 1.5),
            TimeEntry::new(3, 2.25),
            TimeEntry::new(9801, 4.0),
            TimeEntry::new(4, 7.0),
        ]);
        for entry in index.entries() {
            assert_eq!(index.resolve(entry.time), entry.block);
        }
    }

    #[test]
    fn test_shared_times_resolve_to_last_listed() {
        let index = TimeIndex::new(vec![
            TimeEntry::new(1, 0.0),
            TimeEntry::new(2, 3.0),
            TimeEntry::new(3, 3.0),
        ]);
        assert_eq!(index.resolve(3.0), BlockId(3));
    }

    #[test]
    fn test_seek_uses_last_occurrence() {
        let index = repeat_index();
        assert_eq!(index.seek_time(BlockId(5)), Some(20.0));
        assert_eq!(index.seek_time(BlockId(6)), Some(10.0));
        assert_eq!(index.seek_time(BlockId(7)), None);
    }

    #[test]
    fn test_seek_prefers_sequence_position_on_equal_times() {
        let index = TimeIndex::new(vec![
            TimeEntry::new(5, 1.0),
            TimeEntry::new(5, 1.0),
            TimeEntry::new(6, 2.0),
        ]);
        assert_eq!(index.seek_time(BlockId(5)), Some(1.0));
        assert_eq!(index.len(), 3);
        assert_eq!(index.end_time(), Some(2.0));
    }
}
