use eframe::egui;
use std::path::PathBuf;

use crate::gui::state::AppState;

/// Thumbnail cell edge in the strip
const CELL_SIZE: f32 = 100.0;

/// Action requested by clicking around in the filmstrip
#[derive(Default)]
pub struct FilmstripAction {
    /// Thumbnail clicked: make this image current
    pub select: Option<PathBuf>,
    /// Checkbox clicked: flip this image's selection flag
    pub toggle: Option<PathBuf>,
}

/// Horizontal strip of thumbnails with per-image selection checkboxes
pub fn filmstrip_panel(ui: &mut egui::Ui, state: &AppState) -> FilmstripAction {
    let mut action = FilmstripAction::default();

    if state.runtime.session.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("No images loaded").color(egui::Color32::from_gray(100)));
        });
        return action;
    }

    let current = state.runtime.session.current_index();

    egui::ScrollArea::horizontal().show(ui, |ui| {
        ui.horizontal(|ui| {
            for (idx, entry) in state.runtime.session.entries().iter().enumerate() {
                let is_current = current == Some(idx);

                ui.vertical(|ui| {
                    ui.set_width(CELL_SIZE + 8.0);

                    match state.runtime.thumb_textures.get(&entry.path) {
                        Some(texture) => {
                            let image = egui::Image::new(texture)
                                .fit_to_exact_size(egui::vec2(CELL_SIZE, CELL_SIZE))
                                .sense(egui::Sense::click());
                            let response = ui.add(image);
                            if response.clicked() {
                                action.select = Some(entry.path.clone());
                            }
                            if is_current {
                                ui.painter().rect_stroke(
                                    response.rect.expand(2.0),
                                    2.0,
                                    egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 150, 255)),
                                );
                            }
                        }
                        None => {
                            // Preview texture not uploaded yet, draw a placeholder
                            let (rect, _) = ui.allocate_exact_size(
                                egui::vec2(CELL_SIZE, CELL_SIZE),
                                egui::Sense::hover(),
                            );
                            ui.painter()
                                .rect_filled(rect, 2.0, egui::Color32::from_gray(40));
                        }
                    }

                    let name = entry
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let mut checked = entry.selected;
                    ui.horizontal(|ui| {
                        if ui.checkbox(&mut checked, "").changed() {
                            action.toggle = Some(entry.path.clone());
                        }
                        ui.label(egui::RichText::new(name).small())
                            .on_hover_text(entry.path.display().to_string());
                    });
                });
            }
        });
    });

    action
}
