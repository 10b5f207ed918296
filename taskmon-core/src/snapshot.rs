//! Process snapshot functionality

use std::collections::HashMap;
use std::time::Instant;

use crate::process::ProcessRecord;

/// A complete set of process records collected in a single pass.
///
/// Carries the generation token and the filter term that were active when
/// the collection started, so the receiver can decide whether the result
/// is still relevant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Generation token this snapshot was collected under
    pub generation: u64,
    /// Filter term active at collection start (empty = unfiltered)
    pub filter: String,
    /// When the collection finished
    pub taken_at: Instant,
    /// Records, in pid order
    pub records: Vec<ProcessRecord>,
    /// Quick lookup: PID -> index into `records`
    index: HashMap<u32, usize>,
}

impl Snapshot {
    pub fn new(generation: u64, filter: String, records: Vec<ProcessRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.pid, i))
            .collect();
        Self {
            generation,
            filter,
            taken_at: Instant::now(),
            records,
            index,
        }
    }

    /// Snapshot with no records, used when a whole enumeration pass failed.
    pub fn empty(generation: u64, filter: String) -> Self {
        Self::new(generation, filter, Vec::new())
    }

    /// Get a record by PID
    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.index.get(&pid).map(|&i| &self.records[i])
    }

    /// Check if a PID exists in this snapshot
    pub fn has_pid(&self, pid: u32) -> bool {
        self.index.contains_key(&pid)
    }

    /// All PIDs in this snapshot
    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, name: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            cpu_percent: 1.0,
            memory_bytes: 10,
        }
    }

    #[test]
    fn snapshot_lookup_by_pid() {
        let snapshot = Snapshot::new(
            1,
            String::new(),
            vec![record(100, "a"), record(200, "b")],
        );

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.has_pid(100));
        assert_eq!(snapshot.get(200).unwrap().name, "b");
        assert!(snapshot.get(300).is_none());
        assert!(!snapshot.has_pid(300));
    }

    #[test]
    fn snapshot_carries_generation_and_filter() {
        let snapshot = Snapshot::new(7, "fire".to_string(), vec![record(1, "firefox")]);
        assert_eq!(snapshot.generation, 7);
        assert_eq!(snapshot.filter, "fire");
    }

    #[test]
    fn empty_snapshot_has_no_records() {
        let snapshot = Snapshot::empty(3, String::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.pids().count(), 0);
    }
}
