mod filmstrip;
mod metadata;
mod viewer;

pub use filmstrip::{FilmstripAction, filmstrip_panel};
pub use metadata::{MetadataAction, metadata_panel};
pub use viewer::viewer_panel;

use eframe::egui;

use super::state::{AppState, Operation, Status, StatusResult};

/// Action requested by the controls bar
#[derive(Default)]
pub struct ControlsAction {
    pub open_requested: bool,
    pub prev_requested: bool,
    pub next_requested: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub select_all: bool,
    pub delete_requested: bool,
    pub delete_selected_requested: bool,
    pub upload_requested: bool,
}

/// Bottom bar with navigation, culling and upload controls plus status
pub fn controls_bar(ui: &mut egui::Ui, state: &AppState) -> ControlsAction {
    let mut action = ControlsAction::default();

    ui.horizontal(|ui| {
        let is_scanning = state.runtime.is_scanning();
        let is_uploading = state.runtime.is_uploading();
        let is_busy = is_scanning || is_uploading;
        let has_images = !state.runtime.session.is_empty();
        let has_viewer = state.runtime.viewer.is_some();

        if ui.button("Open Directory...").clicked() {
            action.open_requested = true;
        }

        ui.separator();

        if ui
            .add_enabled(has_images, egui::Button::new("Prev"))
            .clicked()
        {
            action.prev_requested = true;
        }
        if ui
            .add_enabled(has_images, egui::Button::new("Next"))
            .clicked()
        {
            action.next_requested = true;
        }

        ui.separator();

        if ui
            .add_enabled(has_viewer, egui::Button::new("Zoom Out"))
            .clicked()
        {
            action.zoom_out = true;
        }
        if ui
            .add_enabled(has_viewer, egui::Button::new("Zoom In"))
            .clicked()
        {
            action.zoom_in = true;
        }
        if ui
            .add_enabled(has_viewer, egui::Button::new("Rotate Left"))
            .clicked()
        {
            action.rotate_left = true;
        }
        if ui
            .add_enabled(has_viewer, egui::Button::new("Rotate Right"))
            .clicked()
        {
            action.rotate_right = true;
        }

        ui.separator();

        if ui
            .add_enabled(has_images, egui::Button::new("Select All"))
            .clicked()
        {
            action.select_all = true;
        }
        if ui
            .add_enabled(has_viewer && !is_busy, egui::Button::new("Delete"))
            .clicked()
        {
            action.delete_requested = true;
        }
        if ui
            .add_enabled(has_images && !is_busy, egui::Button::new("Delete Selected"))
            .clicked()
        {
            action.delete_selected_requested = true;
        }
        if ui
            .add_enabled(has_images && !is_busy, egui::Button::new("Upload Selected"))
            .clicked()
        {
            action.upload_requested = true;
        }

        if is_busy {
            ui.spinner();
        }

        // Scan or upload progress
        if let Some(pct) = state.runtime.scan_progress {
            ui.add(
                egui::ProgressBar::new(f32::from(pct) / 100.0)
                    .desired_width(140.0)
                    .show_percentage(),
            );
        } else if let Some((done, total)) = state.runtime.upload_progress {
            let frac = if total == 0 {
                0.0
            } else {
                done as f32 / total as f32
            };
            ui.add(
                egui::ProgressBar::new(frac)
                    .desired_width(140.0)
                    .text(format!("{}/{}", done, total)),
            );
        }

        ui.separator();

        // Status text
        let status_text = match &state.runtime.status {
            Status::Idle => {
                if has_images {
                    "Ready".to_string()
                } else {
                    "Open a directory of .jpg files".to_string()
                }
            }
            Status::Working {
                operation,
                started_at,
            } => {
                let secs = started_at.elapsed().as_secs();
                match operation {
                    Operation::Scanning => format!("Loading images... {}s", secs),
                    Operation::Uploading => format!("Uploading... {}s", secs),
                }
            }
            Status::Done { result, .. } => match result {
                StatusResult::Success(msg) => msg.clone(),
                StatusResult::Error(err) => format!("Error: {}", err),
            },
        };

        // Color status text based on result
        let text_color = match &state.runtime.status {
            Status::Done {
                result: StatusResult::Error(_),
                ..
            } => Some(egui::Color32::from_rgb(255, 100, 100)),
            Status::Done {
                result: StatusResult::Success(_),
                ..
            } => Some(egui::Color32::from_rgb(100, 200, 100)),
            _ => None,
        };

        if let Some(color) = text_color {
            ui.colored_label(color, status_text);
        } else {
            ui.label(status_text);
        }
    });

    action
}
