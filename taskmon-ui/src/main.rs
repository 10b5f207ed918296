use eframe::egui;

mod app;
mod dialogs;
mod util;

use crate::app::TaskMonApp;

struct StartupErrorApp {
    message: String,
}

impl eframe::App for StartupErrorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("TaskMon failed to start");
            ui.add_space(8.0);
            ui.label("Initialization failed due to a runtime/environment issue.");
            ui.add_space(8.0);
            ui.label(&self.message);
        });
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TaskMon",
        options,
        Box::new(move |_cc| match TaskMonApp::try_new() {
            Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
            Err(e) => {
                log::error!("Failed to initialize app: {e:#}");
                Ok(Box::new(StartupErrorApp {
                    message: format!("{e:#}"),
                }))
            }
        }),
    )
}
