//! TaskMon core library
//! Snapshot collection, reconciliation, and process control for the TaskMon UI.

pub mod control;
pub mod debounce;
pub mod generation;
pub mod handoff;
pub mod history;
pub mod process;
pub mod reconcile;
pub mod refresh;
pub mod snapshot;
pub mod sort;

pub use control::{ActionOutcome, ControlError, ProcessActions};
pub use debounce::SearchDebouncer;
pub use generation::GenerationCounter;
pub use handoff::HandoffSlot;
pub use history::{SystemHistory, SystemSample, SystemSampler};
pub use process::{ProcessRecord, ProcessSource, SysinfoSource};
pub use reconcile::{DisplayedRow, RowEdit, TableState};
pub use refresh::{RefreshConfig, RefreshScheduler};
pub use snapshot::Snapshot;
pub use sort::{SortColumn, SortState};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
