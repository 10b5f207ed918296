//! Terminate/launch actions against live processes.
//!
//! The synchronous primitives block (terminate waits up to 3 s for the
//! process to exit), so [`ProcessActions`] runs them on a dedicated worker
//! thread and reports outcomes through a channel the interactive thread
//! drains without blocking.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use thiserror::Error;

/// Default bound on how long `terminate` waits for the process to exit.
pub const TERMINATE_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Refusing to terminate PID {pid} ({reason})")]
    Refused { pid: u32, reason: &'static str },

    #[error("No such process (PID {pid})")]
    NoSuchProcess { pid: u32 },

    #[error("Access denied (PID {pid})")]
    AccessDenied { pid: u32 },

    #[error("Process {pid} did not exit within {timeout_ms} ms")]
    TimedOut { pid: u32, timeout_ms: u64 },

    #[error("Failed to launch {path}: {reason}")]
    LaunchFailed { path: String, reason: String },
}

fn refresh_pid(system: &mut System, pid: Pid) {
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
}

fn has_exited(system: &System, pid: Pid) -> bool {
    match system.process(pid) {
        None => true,
        // A reaped-but-listed child counts as exited.
        Some(p) => matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
    }
}

/// Terminate `pid` and wait up to `wait_timeout` for it to exit.
///
/// Safety checks: refuses PID 0 and the monitor's own PID before touching
/// the OS. A timeout is reported, never silently retried.
pub fn terminate_process(pid: u32, wait_timeout: Duration) -> Result<(), ControlError> {
    if pid == 0 {
        return Err(ControlError::Refused {
            pid,
            reason: "system idle process",
        });
    }
    if pid == std::process::id() {
        return Err(ControlError::Refused {
            pid,
            reason: "TaskMon itself",
        });
    }

    let mut system = System::new();
    let target = Pid::from_u32(pid);
    refresh_pid(&mut system, target);

    let Some(process) = system.process(target) else {
        return Err(ControlError::NoSuchProcess { pid });
    };

    // `kill` only reports failure; on a process we just observed alive,
    // that is a permission problem.
    if !process.kill() {
        return Err(ControlError::AccessDenied { pid });
    }

    let deadline = Instant::now() + wait_timeout;
    loop {
        refresh_pid(&mut system, target);
        if has_exited(&system, target) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ControlError::TimedOut {
                pid,
                timeout_ms: wait_timeout.as_millis() as u64,
            });
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

/// Launch a new process from an executable or script path.
pub fn launch_process(path: &Path) -> Result<u32, ControlError> {
    match std::process::Command::new(path).spawn() {
        Ok(child) => Ok(child.id()),
        Err(e) => Err(ControlError::LaunchFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

enum ActionRequest {
    Terminate { pid: u32 },
    Launch { path: PathBuf },
}

/// A completed action, drained by the interactive thread.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Terminated {
        pid: u32,
        result: Result<(), ControlError>,
    },
    Launched {
        path: PathBuf,
        result: Result<u32, ControlError>,
    },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Terminated { result, .. } => result.is_ok(),
            Self::Launched { result, .. } => result.is_ok(),
        }
    }
}

/// Runs terminate/launch off the interactive thread.
pub struct ProcessActions {
    request_tx: Sender<ActionRequest>,
    outcome_rx: Receiver<ActionOutcome>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ProcessActions {
    pub fn new() -> Self {
        Self::with_wait_timeout(TERMINATE_WAIT_TIMEOUT)
    }

    pub fn with_wait_timeout(wait_timeout: Duration) -> Self {
        let (request_tx, request_rx) = unbounded::<ActionRequest>();
        let (outcome_tx, outcome_rx) = unbounded::<ActionOutcome>();

        let worker = thread::Builder::new()
            .name("taskmon-actions".to_string())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let outcome = match request {
                        ActionRequest::Terminate { pid } => ActionOutcome::Terminated {
                            pid,
                            result: terminate_process(pid, wait_timeout),
                        },
                        ActionRequest::Launch { path } => {
                            let result = launch_process(&path);
                            ActionOutcome::Launched { path, result }
                        }
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .ok();

        Self {
            request_tx,
            outcome_rx,
            worker,
        }
    }

    /// Queue a terminate for `pid`; the outcome arrives via
    /// [`try_recv_outcome`](Self::try_recv_outcome).
    pub fn terminate(&self, pid: u32) {
        let _ = self.request_tx.send(ActionRequest::Terminate { pid });
    }

    /// Queue a launch of the executable or script at `path`.
    pub fn launch(&self, path: PathBuf) {
        let _ = self.request_tx.send(ActionRequest::Launch { path });
    }

    /// Non-blocking drain of completed actions.
    pub fn try_recv_outcome(&self) -> Option<ActionOutcome> {
        self.outcome_rx.try_recv().ok()
    }
}

impl Default for ProcessActions {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessActions {
    fn drop(&mut self) {
        // Dropping the sender closes the queue; the worker exits its recv loop.
        self.request_tx = unbounded::<ActionRequest>().0;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_pid_0() {
        let err = terminate_process(0, TERMINATE_WAIT_TIMEOUT).unwrap_err();
        assert!(matches!(err, ControlError::Refused { pid: 0, .. }));
    }

    #[test]
    fn refuses_own_pid() {
        let pid = std::process::id();
        let err = terminate_process(pid, TERMINATE_WAIT_TIMEOUT).unwrap_err();
        assert!(matches!(err, ControlError::Refused { pid: p, .. } if p == pid));
    }

    #[test]
    fn missing_pid_reports_no_such_process() {
        // Far above any real pid range on supported platforms.
        let pid = 0x7fff_fff0;
        let err = terminate_process(pid, TERMINATE_WAIT_TIMEOUT).unwrap_err();
        assert_eq!(err, ControlError::NoSuchProcess { pid });
    }

    #[test]
    fn launch_of_missing_path_reports_reason() {
        let err = launch_process(Path::new("/no/such/binary-taskmon-test")).unwrap_err();
        match err {
            ControlError::LaunchFailed { path, reason } => {
                assert!(path.contains("binary-taskmon-test"));
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn terminate_kills_a_live_child() {
        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("spawn sleep");

        let result = terminate_process(child.id(), TERMINATE_WAIT_TIMEOUT);
        assert_eq!(result, Ok(()));

        // Reap; the child must be gone already.
        let status = child.wait().expect("wait");
        assert!(!status.success());
    }

    #[test]
    fn actions_worker_reports_outcomes() {
        let actions = ProcessActions::new();
        actions.terminate(0);

        let deadline = Instant::now() + Duration::from_secs(2);
        let outcome = loop {
            if let Some(outcome) = actions.try_recv_outcome() {
                break outcome;
            }
            assert!(Instant::now() < deadline, "no outcome within 2s");
            thread::sleep(Duration::from_millis(10));
        };

        match outcome {
            ActionOutcome::Terminated { pid, result } => {
                assert_eq!(pid, 0);
                assert!(matches!(result, Err(ControlError::Refused { .. })));
                assert!(!ActionOutcome::Terminated { pid, result }.is_success());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
