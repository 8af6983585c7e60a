use eframe::egui;
use std::path::{Path, PathBuf};

use crate::upload::UploadReport;

/// Destructive action awaiting user confirmation
#[derive(Clone)]
pub enum DeleteRequest {
    /// Delete the currently displayed image (and its RAW sidecars)
    Single(PathBuf),
    /// Delete every checked image; the count is shown in the prompt
    Selected(usize),
}

/// Returns Some(true) on confirm, Some(false) on cancel, None while open
pub fn confirm_delete(ctx: &egui::Context, request: &DeleteRequest) -> Option<bool> {
    let mut result = None;

    egui::Window::new("Confirm Delete")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            match request {
                DeleteRequest::Single(path) => {
                    ui.label(format!("Delete {}?", file_label(path)));
                    ui.label("Any matching RAW files will be deleted too.");
                }
                DeleteRequest::Selected(count) => {
                    ui.label(format!(
                        "Delete {} selected image{}?",
                        count,
                        if *count == 1 { "" } else { "s" }
                    ));
                    ui.label("Any matching RAW files will be deleted too.");
                }
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Button::new("Delete").fill(egui::Color32::from_rgb(180, 60, 60)))
                    .clicked()
                {
                    result = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    result = Some(false);
                }
            });
        });

    result
}

/// Simple informational dialog. Returns true once dismissed.
pub fn notice(ctx: &egui::Context, message: &str) -> bool {
    let mut dismissed = false;

    egui::Window::new("Sift")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    dismissed
}

/// Shown while the OAuth flow waits for the browser round trip
pub fn auth_prompt(ctx: &egui::Context, url: &str) {
    egui::Window::new("Authorize Upload")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Open this link in your browser and grant Sift access:");
            ui.add_space(8.0);
            ui.add(
                egui::Label::new(egui::RichText::new(url).monospace().small())
                    .wrap()
                    .selectable(true),
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for authorization...");
            });
        });
}

/// Upload outcome summary. Returns true once dismissed.
pub fn upload_report(ctx: &egui::Context, report: &UploadReport) -> bool {
    let mut dismissed = false;

    egui::Window::new("Upload Complete")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if let Some(reason) = &report.aborted {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 100, 100),
                    format!("Upload aborted: {}", reason),
                );
            }

            ui.label(format!(
                "{} file{} uploaded",
                report.uploaded,
                if report.uploaded == 1 { "" } else { "s" }
            ));

            if !report.failed.is_empty() {
                ui.add_space(4.0);
                ui.label(format!("{} failed:", report.failed.len()));
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for (path, message) in &report.failed {
                        ui.label(format!("{}: {}", file_label(path), message));
                    }
                });
            }

            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    dismissed
}

/// Scrollable window listing every EXIF field of one image
pub struct ExifWindow {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl ExifWindow {
    pub fn new(title: String, fields: Vec<(String, String)>) -> Self {
        Self { title, fields }
    }

    /// Returns false once the user closes the window
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut open = true;

        egui::Window::new(format!("EXIF - {}", self.title))
            .open(&mut open)
            .default_width(420.0)
            .default_height(480.0)
            .vscroll(true)
            .show(ctx, |ui| {
                if self.fields.is_empty() {
                    ui.label("No EXIF data found.");
                    return;
                }
                egui::Grid::new("exif_fields_grid")
                    .num_columns(2)
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for (tag, value) in &self.fields {
                            ui.label(egui::RichText::new(tag).strong());
                            ui.label(value);
                            ui.end_row();
                        }
                    });
            });

        open
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
