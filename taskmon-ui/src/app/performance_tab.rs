use eframe::egui;

use super::TaskMonApp;
use crate::util::format_memory_bytes;

const CHART_HEIGHT: f32 = 120.0;

fn draw_series(ui: &mut egui::Ui, values: &[f32], y_min: f32, y_max: f32, height: f32) {
    let width = ui.available_width().max(120.0);
    let (rect, _resp) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    let painter = ui.painter_at(rect);

    // Frame
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, ui.visuals().widgets.inactive.bg_stroke.color),
    );

    if values.len() < 2 {
        return;
    }

    let n = values.len() as f32;
    let x_step = rect.width() / (n - 1.0);
    let y_span = (y_max - y_min).max(1e-6);

    let mut points: Vec<egui::Pos2> = Vec::with_capacity(values.len());
    for (i, v) in values.iter().copied().enumerate() {
        let t = (v.clamp(y_min, y_max) - y_min) / y_span;
        let x = rect.left() + x_step * (i as f32);
        let y = rect.bottom() - t * rect.height();
        points.push(egui::pos2(x, y));
    }

    painter.add(egui::Shape::line(
        points,
        egui::Stroke::new(1.5, ui.visuals().widgets.active.fg_stroke.color),
    ));
}

impl TaskMonApp {
    pub(super) fn render_performance_tab(&mut self, ui: &mut egui::Ui) {
        if self.history.is_empty() {
            ui.label("Collecting samples...");
            return;
        }

        let cpu: Vec<f32> = self.history.cpu_percent.iter().copied().collect();
        ui.label(egui::RichText::new("CPU Usage (%)").strong());
        draw_series(ui, &cpu, 0.0, 100.0, CHART_HEIGHT);
        if let Some(last) = cpu.last() {
            ui.label(egui::RichText::new(format!("Current: {last:.1}%")).monospace());
        }

        ui.add_space(12.0);

        let total = self.history.memory_total_bytes.max(1);
        let memory: Vec<f32> = self
            .history
            .memory_used_bytes
            .iter()
            .map(|&b| b as f32)
            .collect();
        ui.label(egui::RichText::new("Memory Usage").strong());
        draw_series(ui, &memory, 0.0, total as f32, CHART_HEIGHT);
        if let Some(&last) = self.history.memory_used_bytes.back() {
            ui.label(
                egui::RichText::new(format!(
                    "Current: {} / {}",
                    format_memory_bytes(last),
                    format_memory_bytes(total)
                ))
                .monospace(),
            );
        }
    }
}
