mod app;
mod dialogs;
mod panels;
mod state;

pub use app::SiftApp;

use std::path::PathBuf;

use anyhow::Result;
use eframe::egui;

/// Launch the desktop app, optionally scanning a directory right away
pub fn run(initial_dir: Option<PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sift - Photo Culling",
        options,
        Box::new(|cc| Ok(Box::new(SiftApp::new(cc, initial_dir)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))
}
