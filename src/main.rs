mod app;
mod canvas;
mod circle;
mod comment;
mod comment_panel;
mod editor;
mod geometry;
mod history;
mod storage;
mod theme;
mod toolbar;
mod ui_controls;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let viewport = egui::ViewportBuilder::default()
        .with_title("Pinmark")
        .with_inner_size([1180.0, 800.0])
        .with_min_inner_size([720.0, 520.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Pinmark",
        options,
        Box::new(|cc| Box::new(app::PinmarkApp::new(cc))),
    )
}
