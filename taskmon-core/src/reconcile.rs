//! Row reconciliation: minimal edits from a snapshot onto the displayed table.

use std::collections::{HashMap, HashSet};

use crate::snapshot::Snapshot;

/// One visible table row.
///
/// `row_id` is the row's identity token: assigned once at insert and never
/// changed by updates. A pid that persists across snapshots keeps its
/// `row_id`, which is what lets selection and scroll anchoring survive
/// refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedRow {
    pub row_id: u64,
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

/// Edit script entry, keyed by pid, handed to the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEdit {
    Inserted { pid: u32 },
    Updated { pid: u32 },
    Removed { pid: u32 },
}

/// The displayed rows and their selection, owned exclusively by the
/// interactive thread. Reconciliation is the only mutation path driven by
/// snapshots; sorting (user-triggered) only permutes the visual order.
#[derive(Debug, Default)]
pub struct TableState {
    rows: Vec<DisplayedRow>,
    selected_pid: Option<u32>,
    next_row_id: u64,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in visual order.
    pub fn rows(&self) -> &[DisplayedRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<DisplayedRow> {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_for_pid(&self, pid: u32) -> Option<&DisplayedRow> {
        self.rows.iter().find(|r| r.pid == pid)
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_pid
    }

    pub fn select(&mut self, pid: Option<u32>) {
        self.selected_pid = pid;
    }

    /// Apply a snapshot to the displayed rows and return the edit script:
    /// pids absent from the snapshot are removed, persisting pids are
    /// updated in place (identity and visual position preserved), new pids
    /// are appended in snapshot order. No re-sort happens here; the table
    /// stays in this order until the user sorts again.
    pub fn reconcile(&mut self, snapshot: &Snapshot) -> Vec<RowEdit> {
        let mut edits = Vec::new();

        let incoming: HashSet<u32> = snapshot.pids().collect();
        self.rows.retain(|row| {
            let keep = incoming.contains(&row.pid);
            if !keep {
                edits.push(RowEdit::Removed { pid: row.pid });
            }
            keep
        });

        let present: HashMap<u32, usize> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.pid, i))
            .collect();

        for record in &snapshot.records {
            match present.get(&record.pid) {
                Some(&i) => {
                    let row = &mut self.rows[i];
                    if row.name != record.name
                        || row.cpu_percent != record.cpu_percent
                        || row.memory_bytes != record.memory_bytes
                    {
                        row.name = record.name.clone();
                        row.cpu_percent = record.cpu_percent;
                        row.memory_bytes = record.memory_bytes;
                        edits.push(RowEdit::Updated { pid: record.pid });
                    }
                }
                None => {
                    self.next_row_id += 1;
                    self.rows.push(DisplayedRow {
                        row_id: self.next_row_id,
                        pid: record.pid,
                        name: record.name.clone(),
                        cpu_percent: record.cpu_percent,
                        memory_bytes: record.memory_bytes,
                    });
                    edits.push(RowEdit::Inserted { pid: record.pid });
                }
            }
        }

        // Selection survives reconciliation unless its row was removed.
        if let Some(pid) = self.selected_pid {
            if !incoming.contains(&pid) {
                self.selected_pid = None;
            }
        }

        edits
    }
}
