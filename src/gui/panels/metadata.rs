use eframe::egui;

use crate::gui::state::AppState;

/// Action requested by the metadata panel
#[derive(Default)]
pub struct MetadataAction {
    pub show_full_exif: bool,
}

/// Right-hand panel summarizing the current image's capture settings
pub fn metadata_panel(ui: &mut egui::Ui, state: &AppState) -> MetadataAction {
    let mut action = MetadataAction::default();

    ui.heading("Capture Info");
    ui.add_space(4.0);

    let Some(viewer) = &state.runtime.viewer else {
        ui.label(egui::RichText::new("No image selected").color(egui::Color32::from_gray(100)));
        return action;
    };

    egui::Grid::new("capture_info_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for (label, value) in [
                ("Camera", &viewer.summary.camera),
                ("Lens", &viewer.summary.lens),
                ("Aperture", &viewer.summary.aperture),
                ("ISO", &viewer.summary.iso),
                ("Shutter", &viewer.summary.shutter),
                ("Captured", &viewer.summary.captured),
            ] {
                ui.label(egui::RichText::new(label).strong());
                ui.label(value);
                ui.end_row();
            }
        });

    ui.add_space(8.0);

    if ui.button("Full EXIF Info").clicked() {
        action.show_full_exif = true;
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    ui.label(
        egui::RichText::new(
            "Checked images are kept for upload; Delete removes the photo and its RAW pair.",
        )
        .small()
        .color(egui::Color32::from_gray(140)),
    );

    action
}
