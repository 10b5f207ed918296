//! User-triggered sorting of displayed rows.
//!
//! Sorting permutes the visual order only; the pid-keyed identity mapping
//! used by reconciliation is untouched. Reconciliation does not reassert
//! the sort afterwards: the table stays in reconciliation order until the
//! user clicks a header again.

use std::cmp::Ordering;

use crate::reconcile::TableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Pid,
    Name,
    Cpu,
    Memory,
}

impl SortColumn {
    /// Direction used on the first click of a header: identity columns
    /// ascending, resource columns descending (largest consumers on top).
    pub fn default_descending(self) -> bool {
        match self {
            Self::Pid | Self::Name => false,
            Self::Cpu | Self::Memory => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pid => "PID",
            Self::Name => "Name",
            Self::Cpu => "CPU (%)",
            Self::Memory => "Memory",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Name => "name",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim() {
            "pid" => Some(Self::Pid),
            "name" => Some(Self::Name),
            "cpu" => Some(Self::Cpu),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Header-click toggle state: a repeated click on the active column flips
/// its direction, a click on a new column starts at that column's default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub active: Option<(SortColumn, bool)>,
}

impl SortState {
    pub fn click(&mut self, column: SortColumn) -> (SortColumn, bool) {
        let descending = match self.active {
            Some((active, descending)) if active == column => !descending,
            _ => column.default_descending(),
        };
        self.active = Some((column, descending));
        (column, descending)
    }

    pub fn is_active(&self, column: SortColumn) -> bool {
        matches!(self.active, Some((active, _)) if active == column)
    }
}

impl TableState {
    /// Stable re-order of the visual rows by the given column. Numeric
    /// comparison for pid/cpu/memory, case-insensitive lexicographic for
    /// name; equal keys keep their relative order.
    pub fn sort_by(&mut self, column: SortColumn, descending: bool) {
        self.rows_mut().sort_by(|a, b| {
            let ord = match column {
                SortColumn::Pid => a.pid.cmp(&b.pid),
                SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortColumn::Cpu => a
                    .cpu_percent
                    .partial_cmp(&b.cpu_percent)
                    .unwrap_or(Ordering::Equal),
                SortColumn::Memory => a.memory_bytes.cmp(&b.memory_bytes),
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}
