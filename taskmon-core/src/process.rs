//! Process records and enumeration

use anyhow::Result;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// One process as observed by a single collection pass
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    /// Process ID
    pub pid: u32,
    /// Process image name (e.g., "explorer.exe")
    pub name: String,
    /// CPU percentage, normalized by logical core count
    pub cpu_percent: f32,
    /// Resident memory in bytes
    pub memory_bytes: u64,
}

impl ProcessRecord {
    /// Match against an already lower-cased search term: exact PID string
    /// or name substring.
    pub fn matches(&self, term_lower: &str) -> bool {
        if term_lower.is_empty() {
            return true;
        }
        self.pid.to_string() == term_lower || self.name.to_lowercase().contains(term_lower)
    }
}

/// Keep only records matching the search term (empty term keeps all).
pub fn filter_records(records: Vec<ProcessRecord>, term: &str) -> Vec<ProcessRecord> {
    if term.is_empty() {
        return records;
    }
    let term_lower = term.to_lowercase();
    records
        .into_iter()
        .filter(|r| r.matches(&term_lower))
        .collect()
}

/// Source of process records for one collection pass.
///
/// A failure of the whole enumeration is an `Err`; a single process
/// disappearing mid-scan is not an error, its record is simply absent.
pub trait ProcessSource: Send {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>>;
}

/// OS-backed source. Owns a persistent [`sysinfo::System`] so per-process
/// CPU percentages can be derived from deltas between collections.
pub struct SysinfoSource {
    system: System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut system = System::new();
        // Populate the CPU list up front; core count is needed for
        // normalization on the first pass already.
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoSource {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let num_cpus = self.system.cpus().len().max(1) as f32;

        let mut records: Vec<ProcessRecord> = self
            .system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                let pid = pid.as_u32();
                if pid == 0 {
                    // Kernel idle slot on most platforms; not terminable, not useful.
                    return None;
                }
                Some(ProcessRecord {
                    pid,
                    name: process.name().to_string_lossy().into_owned(),
                    cpu_percent: (process.cpu_usage() / num_cpus).max(0.0),
                    memory_bytes: process.memory(),
                })
            })
            .collect();

        // The enumeration map is unordered; pid order keeps snapshot order
        // deterministic across collections.
        records.sort_by_key(|r| r.pid);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, name: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            cpu_percent: 0.0,
            memory_bytes: 0,
        }
    }

    #[test]
    fn empty_term_matches_everything() {
        assert!(record(1, "init").matches(""));
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let r = record(42, "FireFox");
        assert!(r.matches("fox"));
        assert!(r.matches("firefox"));
        assert!(!r.matches("chrome"));
    }

    #[test]
    fn pid_match_is_exact() {
        let r = record(1234, "bash");
        assert!(r.matches("1234"));
        // A partial pid is not a match (unlike the name substring rule).
        assert!(!r.matches("123"));
    }

    #[test]
    fn filter_records_keeps_matches_only() {
        let records = vec![record(1, "init"), record(2, "bash"), record(30, "zsh")];
        let filtered = filter_records(records.clone(), "sh");
        let pids: Vec<u32> = filtered.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![2, 30]);

        assert_eq!(filter_records(records, "").len(), 3);
    }

    #[test]
    fn sysinfo_source_lists_processes_in_pid_order() {
        let mut source = SysinfoSource::new();
        let records = source.list_processes().unwrap();
        assert!(!records.is_empty());
        assert!(records.windows(2).all(|w| w[0].pid < w[1].pid));
        assert!(records.iter().all(|r| r.pid != 0));
    }
}
