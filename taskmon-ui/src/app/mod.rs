use std::path::PathBuf;
use std::time::Instant;

use taskmon_core::{
    ActionOutcome, ProcessActions, RefreshScheduler, SearchDebouncer, SortState, SystemHistory,
    SystemSampler, TableState,
};

mod performance_tab;
mod processes_tab;
mod state;
mod update;

use state::UiPrefs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Tab {
    #[default]
    Processes,
    Performance,
}

#[derive(Debug, Clone)]
pub(crate) enum TerminateDialogStep {
    Confirm,
    Running,
    Done(Result<(), String>),
}

#[derive(Debug, Clone)]
pub(crate) struct TerminateDialogState {
    pub(crate) pid: u32,
    pub(crate) name: String,
    pub(crate) step: TerminateDialogStep,
}

pub(crate) struct TaskMonApp {
    scheduler: RefreshScheduler,
    debouncer: SearchDebouncer,
    table: TableState,
    sort: SortState,
    actions: ProcessActions,
    sampler: SystemSampler,
    history: SystemHistory,
    last_sample: Instant,
    tab: Tab,
    filter_text: String,
    terminate_dialog: Option<TerminateDialogState>,
    status_line: Option<String>,
    prefs: UiPrefs,
}

impl TaskMonApp {
    pub(crate) fn try_new() -> anyhow::Result<Self> {
        state::try_build_app()
    }

    pub(crate) fn set_status_line(&mut self, msg: impl Into<String>) {
        self.status_line = Some(msg.into());
    }

    pub(crate) fn current_status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    /// Open the confirm dialog for the currently selected row.
    pub(crate) fn open_terminate_dialog(&mut self) {
        let Some(pid) = self.table.selected_pid() else {
            self.set_status_line("Select a process to terminate");
            return;
        };
        let name = self
            .table
            .row_for_pid(pid)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        self.terminate_dialog = Some(TerminateDialogState {
            pid,
            name,
            step: TerminateDialogStep::Confirm,
        });
    }

    pub(crate) fn terminate_dialog_state(&self) -> Option<TerminateDialogState> {
        self.terminate_dialog.clone()
    }

    pub(crate) fn dismiss_terminate_dialog(&mut self) {
        self.terminate_dialog = None;
    }

    pub(crate) fn confirm_terminate_dialog(&mut self) {
        let Some(state) = self.terminate_dialog.clone() else {
            return;
        };
        if !matches!(state.step, TerminateDialogStep::Confirm) {
            return;
        }

        let pid = state.pid;
        self.terminate_dialog = Some(TerminateDialogState {
            step: TerminateDialogStep::Running,
            ..state
        });
        self.actions.terminate(pid);
    }

    pub(crate) fn request_launch(&mut self, path: PathBuf) {
        self.set_status_line(format!("Launching {}", path.display()));
        self.actions.launch(path);
    }

    /// Apply a completed background action: update the dialog, report the
    /// outcome, and refresh immediately on success so the table reflects
    /// the change without waiting for the next tick.
    pub(crate) fn on_action_outcome(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Terminated { pid, result } => {
                if let Some(dialog) = self.terminate_dialog.as_mut() {
                    if dialog.pid == pid {
                        dialog.step = TerminateDialogStep::Done(
                            result.clone().map_err(|e| e.to_string()),
                        );
                    }
                }
                match result {
                    Ok(()) => {
                        self.set_status_line(format!("Process {pid} terminated"));
                        self.scheduler.request_refresh(None);
                    }
                    Err(e) => self.set_status_line(format!("Terminate failed: {e}")),
                }
            }
            ActionOutcome::Launched { path, result } => match result {
                Ok(child_pid) => {
                    self.set_status_line(format!(
                        "Started {} (PID {child_pid})",
                        path.display()
                    ));
                    self.scheduler.request_refresh(None);
                }
                Err(e) => self.set_status_line(format!("Launch failed: {e}")),
            },
        }
    }
}
