//! End-to-end tests of the refresh pipeline: scheduler, generation guard,
//! debouncer, and reconciler driven by a scripted process source.
//!
//! The scripted source blocks inside each collection until the test feeds
//! it a batch, and signals when a collection begins. That makes the
//! stale-result and coalescing cases deterministic: the test always knows
//! whether the collector is idle, mid-collection, or done publishing.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use taskmon_core::process::ProcessRecord;
use taskmon_core::reconcile::{RowEdit, TableState};
use taskmon_core::refresh::{RefreshConfig, RefreshScheduler};
use taskmon_core::snapshot::Snapshot;
use taskmon_core::{ActionOutcome, ControlError, ProcessActions, ProcessSource, SearchDebouncer};

struct ScriptedSource {
    started_tx: Sender<()>,
    batches_rx: Receiver<Result<Vec<ProcessRecord>>>,
}

impl ScriptedSource {
    fn new() -> (Self, Sender<Result<Vec<ProcessRecord>>>, Receiver<()>) {
        let (started_tx, started_rx) = unbounded();
        let (batches_tx, batches_rx) = unbounded();
        (
            Self {
                started_tx,
                batches_rx,
            },
            batches_tx,
            started_rx,
        )
    }
}

impl ProcessSource for ScriptedSource {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>> {
        let _ = self.started_tx.send(());
        // Bounded wait so a test failure can never wedge the collector.
        self.batches_rx
            .recv_timeout(Duration::from_secs(2))
            .unwrap_or_else(|_| Ok(Vec::new()))
    }
}

fn record(pid: u32, name: &str, cpu: f32, mem: u64) -> ProcessRecord {
    ProcessRecord {
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
        memory_bytes: mem,
    }
}

fn wait_started(started_rx: &Receiver<()>) {
    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("collector did not start a collection in time");
}

fn poll_until_snapshot(sched: &mut RefreshScheduler, timeout: Duration) -> Snapshot {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(snapshot) = sched.poll(Instant::now()) {
            return snapshot;
        }
        assert!(Instant::now() < deadline, "no snapshot within {timeout:?}");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn only_the_last_issued_cycle_is_applied() {
    let (source, batches_tx, started_rx) = ScriptedSource::new();
    let mut sched = RefreshScheduler::new(source, RefreshConfig::default());

    // Cycle 1 starts and blocks inside the source.
    sched.request_refresh(Some(""));
    wait_started(&started_rx);

    // Cycle 2 supersedes it while it is still running.
    sched.request_refresh(None);

    // Let cycle 1 finish; once the collector starts cycle 2 we know the
    // cycle-1 snapshot has been published.
    batches_tx
        .send(Ok(vec![record(100, "stale", 1.0, 10)]))
        .unwrap();
    wait_started(&started_rx);

    // The cycle-1 result is in the slot but its token is superseded.
    assert!(sched.poll(Instant::now()).is_none());
    assert!(!sched.tick_armed());

    batches_tx
        .send(Ok(vec![record(200, "fresh", 2.0, 20)]))
        .unwrap();
    let snapshot = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].pid, 200);
    assert!(sched.tick_armed());
}

#[test]
fn queued_requests_coalesce_to_the_newest() {
    let (source, batches_tx, started_rx) = ScriptedSource::new();
    let mut sched = RefreshScheduler::new(source, RefreshConfig::default());

    sched.request_refresh(Some("one"));
    wait_started(&started_rx);

    // Two more requests pile up while the collector is busy.
    sched.request_refresh(Some("two"));
    sched.request_refresh(Some("three"));

    // Finish cycle 1; the collector must then run exactly one more
    // collection, for the newest request.
    batches_tx.send(Ok(vec![])).unwrap();
    wait_started(&started_rx);

    batches_tx
        .send(Ok(vec![
            record(7, "three-headed", 0.0, 1),
            record(8, "unrelated", 0.0, 1),
        ]))
        .unwrap();
    let snapshot = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    assert_eq!(snapshot.generation, 3);
    assert_eq!(snapshot.filter, "three");
    // The superseded "two" request never ran as a collection of its own.
    assert!(started_rx.recv_timeout(Duration::from_millis(200)).is_err());

    // The filter was applied at collection time.
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].pid, 7);
}

#[test]
fn enumeration_failure_yields_empty_snapshot_and_next_tick_recovers() {
    let (source, batches_tx, started_rx) = ScriptedSource::new();
    let mut sched = RefreshScheduler::new(source, RefreshConfig::default());

    sched.request_refresh(Some(""));
    wait_started(&started_rx);
    batches_tx.send(Err(anyhow::anyhow!("enumeration blew up"))).unwrap();

    let degraded = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    assert!(degraded.is_empty());
    // The cycle survived: the periodic tick is armed again.
    assert!(sched.tick_armed());

    // Force the tick deadline to pass; the retry succeeds.
    let applied_at = Instant::now();
    sched.maybe_tick(applied_at + Duration::from_secs(5));
    wait_started(&started_rx);
    batches_tx.send(Ok(vec![record(1, "init", 0.0, 1)])).unwrap();

    let recovered = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    assert_eq!(recovered.records.len(), 1);
}

#[test]
fn debounced_typing_burst_triggers_exactly_one_refresh() {
    let (source, batches_tx, started_rx) = ScriptedSource::new();
    let mut sched = RefreshScheduler::new(source, RefreshConfig::default());
    let mut debouncer = SearchDebouncer::default();

    let t0 = Instant::now();
    debouncer.on_input("b", t0);
    debouncer.on_input("ba", t0 + Duration::from_millis(40));
    debouncer.on_input("bas", t0 + Duration::from_millis(80));
    debouncer.on_input("bash", t0 + Duration::from_millis(120));

    // Frame polls inside the quiet window issue nothing.
    assert!(debouncer.poll(t0 + Duration::from_millis(200)).is_none());

    let term = debouncer
        .poll(t0 + Duration::from_millis(500))
        .expect("settled term");
    assert_eq!(term, "bash");
    sched.request_refresh(Some(&term));

    wait_started(&started_rx);
    batches_tx
        .send(Ok(vec![
            record(2, "bash", 0.1, 5),
            record(3, "kworker", 0.0, 0),
        ]))
        .unwrap();

    let snapshot = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    // One keystroke burst, one collection cycle.
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.filter, "bash");
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].name, "bash");
}

#[test]
fn reconciliation_across_cycles_preserves_row_identity() {
    let (source, batches_tx, started_rx) = ScriptedSource::new();
    let mut sched = RefreshScheduler::new(source, RefreshConfig::default());
    let mut table = TableState::new();

    sched.request_refresh(Some(""));
    wait_started(&started_rx);
    batches_tx
        .send(Ok(vec![
            record(100, "a", 1.0, 10),
            record(200, "b", 2.0, 20),
        ]))
        .unwrap();
    let s1 = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    table.reconcile(&s1);
    table.select(Some(200));
    let identity_before = table.row_for_pid(200).unwrap().row_id;

    sched.request_refresh(None);
    wait_started(&started_rx);
    batches_tx
        .send(Ok(vec![
            record(200, "b", 5.0, 25),
            record(300, "c", 0.5, 5),
        ]))
        .unwrap();
    let s2 = poll_until_snapshot(&mut sched, Duration::from_secs(2));
    let edits = table.reconcile(&s2);

    assert!(edits.contains(&RowEdit::Removed { pid: 100 }));
    assert!(edits.contains(&RowEdit::Updated { pid: 200 }));
    assert!(edits.contains(&RowEdit::Inserted { pid: 300 }));

    let pids: Vec<u32> = table.rows().iter().map(|r| r.pid).collect();
    assert_eq!(pids, vec![200, 300]);
    assert_eq!(table.row_for_pid(200).unwrap().row_id, identity_before);
    assert_eq!(table.row_for_pid(200).unwrap().cpu_percent, 5.0);
    // Selection rode through the refresh.
    assert_eq!(table.selected_pid(), Some(200));
}

#[test]
fn terminating_a_vanished_pid_reports_without_disturbing_other_rows() {
    // A pid that is displayed but no longer exists in the OS.
    let ghost_pid = 0x7fff_fff0;

    let mut table = TableState::new();
    table.reconcile(&Snapshot::new(
        1,
        String::new(),
        vec![record(1, "init", 0.0, 1), record(ghost_pid, "ghost", 0.0, 1)],
    ));

    let actions = ProcessActions::new();
    actions.terminate(ghost_pid);

    let deadline = Instant::now() + Duration::from_secs(5);
    let outcome = loop {
        if let Some(outcome) = actions.try_recv_outcome() {
            break outcome;
        }
        assert!(Instant::now() < deadline, "no outcome within 5s");
        thread::sleep(Duration::from_millis(10));
    };

    match outcome {
        ActionOutcome::Terminated { pid, result } => {
            assert_eq!(pid, ghost_pid);
            assert_eq!(result, Err(ControlError::NoSuchProcess { pid: ghost_pid }));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Nothing was removed by the failed action itself.
    assert_eq!(table.len(), 2);

    // The follow-up refresh naturally omits the ghost.
    let edits = table.reconcile(&Snapshot::new(
        2,
        String::new(),
        vec![record(1, "init", 0.0, 1)],
    ));
    assert_eq!(edits, vec![RowEdit::Removed { pid: ghost_pid }]);
    assert_eq!(table.len(), 1);
}
