use std::time::Instant;

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use taskmon_core::SortColumn;

use super::TaskMonApp;
use crate::util::format_memory_bytes;

const ROW_HEIGHT: f32 = 20.0;
const TABLE_COLUMNS: [SortColumn; 4] = [
    SortColumn::Pid,
    SortColumn::Name,
    SortColumn::Cpu,
    SortColumn::Memory,
];

impl TaskMonApp {
    pub(super) fn render_processes_tab(&mut self, ui: &mut egui::Ui) {
        self.render_search_row(ui);
        ui.separator();
        self.render_action_row(ui);
        ui.separator();
        self.render_process_table(ui);
    }

    fn render_search_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filter_text)
                    .hint_text("name or PID")
                    .desired_width(220.0),
            );
            if response.changed() {
                self.debouncer.on_input(&self.filter_text, Instant::now());
            }
            if ui.button("Search").clicked() {
                let term = self.debouncer.on_explicit_search(&self.filter_text);
                self.scheduler.request_refresh(Some(&term));
            }
            if ui.button("Reset").clicked() {
                self.filter_text.clear();
                let term = self.debouncer.on_reset();
                self.scheduler.request_refresh(Some(&term));
            }
        });
    }

    fn render_action_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let has_selection = self.table.selected_pid().is_some();
            if ui
                .add_enabled(has_selection, egui::Button::new("Terminate Process"))
                .clicked()
            {
                self.open_terminate_dialog();
            }
            if ui.button("Create Process").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Select Script or Executable")
                    .pick_file()
                {
                    self.request_launch(path);
                }
            }
        });
    }

    fn render_process_table(&mut self, ui: &mut egui::Ui) {
        let selected = self.table.selected_pid();
        let sort = self.sort;
        let mut clicked_sort: Option<SortColumn> = None;
        let mut clicked_pid: Option<u32> = None;

        {
            let rows = self.table.rows();
            TableBuilder::new(ui)
                .striped(true)
                .sense(egui::Sense::click())
                .column(Column::auto().at_least(70.0))
                .column(Column::remainder().at_least(120.0))
                .column(Column::auto().at_least(70.0))
                .column(Column::auto().at_least(90.0))
                .header(ROW_HEIGHT, |mut header| {
                    for column in TABLE_COLUMNS {
                        header.col(|ui| {
                            let mut label = column.label().to_string();
                            if let Some((active, descending)) = sort.active {
                                if active == column {
                                    label.push_str(if descending { " \u{25bc}" } else { " \u{25b2}" });
                                }
                            }
                            if ui.selectable_label(sort.is_active(column), label).clicked() {
                                clicked_sort = Some(column);
                            }
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let record = &rows[row.index()];
                        row.set_selected(selected == Some(record.pid));
                        row.col(|ui| {
                            ui.monospace(record.pid.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&record.name);
                        });
                        row.col(|ui| {
                            ui.monospace(format!("{:.1}", record.cpu_percent));
                        });
                        row.col(|ui| {
                            ui.monospace(format_memory_bytes(record.memory_bytes));
                        });
                        if row.response().clicked() {
                            clicked_pid = Some(record.pid);
                        }
                    });
                });
        }

        if let Some(column) = clicked_sort {
            let (column, descending) = self.sort.click(column);
            self.table.sort_by(column, descending);
        }
        if let Some(pid) = clicked_pid {
            self.table.select(Some(pid));
        }
    }
}
