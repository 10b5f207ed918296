use std::time::{Duration, Instant};

use eframe::egui;

use super::{Tab, TaskMonApp};

impl TaskMonApp {
    /// Drain completed terminate/launch actions (non-blocking).
    pub(super) fn service_background_work(&mut self) {
        while let Some(outcome) = self.actions.try_recv_outcome() {
            self.on_action_outcome(outcome);
        }
    }

    /// One pump of the refresh pipeline: settle the debouncer, fire a due
    /// periodic tick, and apply a delivered snapshot if its generation is
    /// still current.
    pub(super) fn pump_refresh_pipeline(&mut self, now: Instant) {
        if let Some(term) = self.debouncer.poll(now) {
            self.scheduler.request_refresh(Some(&term));
        }

        self.scheduler.maybe_tick(now);

        if let Some(snapshot) = self.scheduler.poll(now) {
            let edits = self.table.reconcile(&snapshot);
            if !edits.is_empty() {
                log::debug!(
                    "applied {} row edits from generation {}",
                    edits.len(),
                    snapshot.generation
                );
            }
        }
    }

    pub(super) fn sample_performance(&mut self, now: Instant) {
        if now.duration_since(self.last_sample) >= Duration::from_secs(1) {
            let sample = self.sampler.sample();
            self.history.push_sample(sample);
            self.last_sample = now;
        }
    }
}

impl eframe::App for TaskMonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.service_background_work();
        self.pump_refresh_pipeline(now);
        self.sample_performance(now);

        egui::TopBottomPanel::top("taskmon_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(self.tab == Tab::Processes, "Processes")
                    .clicked()
                {
                    self.tab = Tab::Processes;
                }
                if ui
                    .selectable_label(self.tab == Tab::Performance, "Performance")
                    .clicked()
                {
                    self.tab = Tab::Performance;
                }
            });
        });

        egui::TopBottomPanel::bottom("taskmon_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} processes", self.table.len()));
                if let Some(status) = self.current_status_line() {
                    ui.separator();
                    ui.label(status.to_string());
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Processes => self.render_processes_tab(ui),
            Tab::Performance => self.render_performance_tab(ui),
        });

        crate::dialogs::render_terminate_dialog(self, ctx);

        // Poll cadence for the handoff slot and the debouncer.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
