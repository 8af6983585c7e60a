use eframe::egui;

use crate::gui::state::AppState;

/// Central panel showing the current photo with zoom/pan support
pub fn viewer_panel(ui: &mut egui::Ui, state: &mut AppState) {
    // Copy out what the paint pass needs so zoom state can be mutated below
    let Some((texture_id, native_size)) = state
        .runtime
        .viewer
        .as_ref()
        .map(|v| (v.texture.id(), v.texture.size_vec2()))
    else {
        if state.runtime.is_scanning() || state.runtime.viewer_task.is_some() {
            show_loading_state(ui);
        } else {
            show_empty_state(ui);
        }
        return;
    };

    viewer_header(ui, state);

    // Paint area with zoom/pan
    let available = ui.available_size();
    let (response, mut painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());
    let rect = response.rect;

    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

    // Fit the freshly loaded or rotated image into the panel
    if state.runtime.needs_fit_to_view && rect.width() > 0.0 && rect.height() > 0.0 {
        state.runtime.needs_fit_to_view = false;
        state.runtime.viewer_offset = egui::Vec2::ZERO;
        let fit = (rect.width() / native_size.x).min(rect.height() / native_size.y);
        state.runtime.viewer_zoom = fit.clamp(0.05, 10.0);
    }

    // Handle zoom with scroll
    let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
    if scroll_delta != 0.0 && response.hovered() {
        let zoom_factor = 1.1_f32.powf(scroll_delta / 50.0);
        let new_zoom = (state.runtime.viewer_zoom * zoom_factor).clamp(0.05, 10.0);

        // Zoom toward mouse position
        if let Some(pointer_pos) = ui.input(|i| i.pointer.hover_pos()) {
            let rel_pos = pointer_pos - rect.center() - state.runtime.viewer_offset;
            let scale_change = new_zoom / state.runtime.viewer_zoom;
            state.runtime.viewer_offset -= rel_pos * (scale_change - 1.0);
        }

        state.runtime.viewer_zoom = new_zoom;
    }

    // Handle pan with drag
    if response.dragged() {
        state.runtime.viewer_offset += response.drag_delta();
    }

    // Calculate image rect with zoom and offset
    let zoom = state.runtime.viewer_zoom;
    let img_size = native_size * zoom;
    let img_center = rect.center() + state.runtime.viewer_offset;
    let img_rect = egui::Rect::from_center_size(img_center, img_size);

    // Clip to viewer area
    painter.set_clip_rect(rect);

    painter.image(
        texture_id,
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    painter.rect_stroke(
        img_rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(60)),
    );
}

/// Filename, position and zoom readout above the paint area
fn viewer_header(ui: &mut egui::Ui, state: &mut AppState) {
    let name = state
        .runtime
        .viewer
        .as_ref()
        .and_then(|v| v.path.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let position = state.runtime.session.current_index();
    let total = state.runtime.session.len();

    ui.horizontal(|ui| {
        ui.heading(name);
        if let Some(idx) = position {
            ui.label(format!("{} / {}", idx + 1, total));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Reset View").clicked() {
                state.runtime.needs_fit_to_view = true;
            }
            ui.label(format!("{:.0}%", state.runtime.viewer_zoom * 100.0));
        });
    });

    ui.add_space(4.0);
}

fn show_empty_state(ui: &mut egui::Ui) {
    let available = ui.available_size();
    let rect = ui.allocate_space(available).1;

    ui.painter()
        .rect_filled(rect, 4.0, egui::Color32::from_gray(30));

    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "No images loaded\n\nOpen a directory of .jpg files to start culling",
        egui::FontId::default(),
        egui::Color32::from_gray(100),
    );
}

fn show_loading_state(ui: &mut egui::Ui) {
    let available = ui.available_size();
    let rect = ui.allocate_space(available).1;

    ui.painter()
        .rect_filled(rect, 4.0, egui::Color32::from_gray(30));

    // Draw spinner
    let center = rect.center();
    let time = ui.input(|i| i.time);
    let radius = 16.0;
    let stroke_width = 3.0;

    // Spinning arc
    let start_angle = (time * 2.0) as f32;
    let arc_length = std::f32::consts::PI * 1.5;

    let points: Vec<egui::Pos2> = (0..32)
        .map(|i| {
            let angle = start_angle + (i as f32 / 31.0) * arc_length;
            egui::pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect();

    ui.painter().add(egui::Shape::line(
        points,
        egui::Stroke::new(stroke_width, egui::Color32::from_gray(150)),
    ));

    ui.painter().text(
        egui::pos2(center.x, center.y + 32.0),
        egui::Align2::CENTER_CENTER,
        "Loading...",
        egui::FontId::default(),
        egui::Color32::from_gray(100),
    );
}
