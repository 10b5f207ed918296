//! Refresh scheduling: periodic, cancellable snapshot collection.
//!
//! The interactive thread never enumerates processes itself. It issues
//! collect requests to a dedicated collector thread (which owns the
//! [`ProcessSource`]) and polls a single-slot handoff for results. Every
//! request carries a fresh generation token; a result whose token is no
//! longer current is dropped at the poll site, so superseded cycles can
//! never reach the displayed table.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::generation::GenerationCounter;
use crate::handoff::HandoffSlot;
use crate::process::{filter_records, ProcessSource};
use crate::snapshot::Snapshot;

/// Timing knobs for the refresh loop.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// Delay between an applied snapshot and the next automatic collection.
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
        }
    }
}

struct CollectRequest {
    generation: u64,
    filter: String,
}

/// Owns the cadence of snapshot collection and the stale-result guard.
pub struct RefreshScheduler {
    generations: Arc<GenerationCounter>,
    slot: Arc<HandoffSlot<Snapshot>>,
    request_tx: Sender<CollectRequest>,
    worker: Option<thread::JoinHandle<()>>,
    active_filter: String,
    next_tick_at: Option<Instant>,
    config: RefreshConfig,
}

impl RefreshScheduler {
    pub fn new(source: impl ProcessSource + 'static, config: RefreshConfig) -> Self {
        let generations = Arc::new(GenerationCounter::new());
        let slot = Arc::new(HandoffSlot::new());
        let (request_tx, request_rx) = unbounded::<CollectRequest>();

        let worker_slot = Arc::clone(&slot);
        let worker = thread::Builder::new()
            .name("taskmon-collector".to_string())
            .spawn(move || collector_loop(source, request_rx, worker_slot))
            .ok();

        Self {
            generations,
            slot,
            request_tx,
            worker,
            active_filter: String::new(),
            next_tick_at: None,
            config,
        }
    }

    /// Start a new collection cycle immediately, superseding any in-flight
    /// one. `Some(filter)` also makes that term the active filter; `None`
    /// reuses the current one.
    pub fn request_refresh(&mut self, filter: Option<&str>) {
        if let Some(filter) = filter {
            self.active_filter = filter.to_string();
        }
        let generation = self.generations.next();
        // Hold the automatic tick until this cycle's result lands.
        self.next_tick_at = None;
        let _ = self.request_tx.send(CollectRequest {
            generation,
            filter: self.active_filter.clone(),
        });
    }

    /// Fire the periodic refresh once its deadline has passed.
    pub fn maybe_tick(&mut self, now: Instant) {
        if self.next_tick_at.is_some_and(|at| now >= at) {
            self.request_refresh(None);
        }
    }

    /// Drain the handoff slot. A snapshot from a superseded generation is
    /// dropped silently; a current one arms the next periodic tick and is
    /// returned for reconciliation.
    pub fn poll(&mut self, now: Instant) -> Option<Snapshot> {
        let snapshot = self.slot.take()?;
        if !self.generations.is_current(snapshot.generation) {
            log::debug!(
                "dropping stale snapshot (generation {}, current {})",
                snapshot.generation,
                self.generations.current()
            );
            return None;
        }
        self.next_tick_at = Some(now + self.config.interval);
        Some(snapshot)
    }

    /// The filter term collections currently run with.
    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    /// Whether a periodic tick is armed (a cycle result has been applied
    /// and no newer request is pending).
    pub fn tick_armed(&self) -> bool {
        self.next_tick_at.is_some()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        // Dropping the sender closes the queue; the collector exits its recv loop.
        self.request_tx = unbounded::<CollectRequest>().0;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn collector_loop(
    mut source: impl ProcessSource,
    request_rx: Receiver<CollectRequest>,
    slot: Arc<HandoffSlot<Snapshot>>,
) {
    while let Ok(mut request) = request_rx.recv() {
        // Coalesce queued requests: only the newest one matters, the older
        // ones are already superseded.
        while let Ok(newer) = request_rx.try_recv() {
            request = newer;
        }

        let records = match source.list_processes() {
            Ok(records) => records,
            Err(e) => {
                // Degrade to an empty snapshot; the next tick retries.
                log::warn!("process enumeration failed: {e:#}");
                Vec::new()
            }
        };
        let records = filter_records(records, &request.filter);
        slot.publish(Snapshot::new(request.generation, request.filter, records));
    }
}
