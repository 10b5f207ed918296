use eframe::egui;

use crate::app::{TaskMonApp, TerminateDialogStep};

pub(crate) fn render_terminate_dialog(app: &mut TaskMonApp, ctx: &egui::Context) {
    let Some(state) = app.terminate_dialog_state() else {
        return;
    };

    let mut open = true;
    egui::Window::new("Confirm Terminate Process")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(format!("{} (PID {})", state.name, state.pid));
            ui.separator();
            ui.colored_label(
                egui::Color32::YELLOW,
                "Warning: Terminating a process can cause data loss.",
            );
            ui.add_space(8.0);

            match &state.step {
                TerminateDialogStep::Confirm => {
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            app.dismiss_terminate_dialog();
                        }
                        if ui
                            .add(egui::Button::new("Terminate").fill(egui::Color32::DARK_RED))
                            .clicked()
                        {
                            app.confirm_terminate_dialog();
                        }
                    });
                }
                TerminateDialogStep::Running => {
                    ui.horizontal(|ui| {
                        ui.add(egui::widgets::Spinner::new());
                        ui.label("Waiting for the process to exit...");
                    });
                }
                TerminateDialogStep::Done(result) => {
                    match result {
                        Ok(()) => {
                            ui.colored_label(egui::Color32::LIGHT_GREEN, "Process terminated");
                        }
                        Err(e) => {
                            ui.colored_label(
                                egui::Color32::LIGHT_RED,
                                format!("Terminate failed: {e}"),
                            );
                        }
                    }

                    ui.add_space(8.0);
                    if ui.button("Close").clicked() {
                        app.dismiss_terminate_dialog();
                    }
                }
            }
        });

    if !open {
        app.dismiss_terminate_dialog();
    }
}
