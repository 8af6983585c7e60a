use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use image::RgbaImage;

use super::dialogs::{self, DeleteRequest};
use super::panels;
use super::state::{
    AppState, BackgroundTask, LoadedView, Operation, Status, StatusResult, ViewerState,
};
use crate::error::SiftError;
use crate::metadata;
use crate::scan::{self, ScanEvent};
use crate::session::ImageEntry;
use crate::sidecar;
use crate::upload::{self, Authenticator, UploadEvent};

/// Main GUI application
pub struct SiftApp {
    state: AppState,
}

impl SiftApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_dir: Option<PathBuf>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut app = Self {
            state: AppState::default(),
        };
        if let Some(dir) = initial_dir {
            app.open_directory(dir);
        }
        app
    }

    /// Start scanning a directory, superseding any scan still in flight
    pub fn open_directory(&mut self, dir: PathBuf) {
        if let Some(scan) = self.state.runtime.scan.take() {
            scan.cancel();
        }
        self.state.runtime.session.reset();
        self.state.runtime.thumb_textures.clear();
        self.state.runtime.viewer = None;
        self.state.runtime.viewer_task = None;

        match scan::start_scan(&dir) {
            Ok(handle) => {
                self.state.config.last_open_dir = Some(dir);
                self.state.runtime.scan = Some(handle);
                self.state.runtime.scan_progress = Some(0);
                self.state.runtime.status = Status::Working {
                    operation: Operation::Scanning,
                    started_at: Instant::now(),
                };
            }
            Err(e) => {
                log::error!("{}", e);
                self.state.runtime.scan_progress = None;
                self.state.runtime.status = Status::Done {
                    result: StatusResult::Error(e.to_string()),
                    at: Instant::now(),
                };
            }
        }
    }

    /// Feed loader events into the session and thumbnail cache
    fn drain_scan_events(&mut self, ctx: &egui::Context) {
        let events: Vec<ScanEvent> = match &self.state.runtime.scan {
            Some(handle) => handle.events.try_iter().collect(),
            None => return,
        };

        let mut finished = false;
        for event in events {
            match event {
                ScanEvent::FileReady { path, preview } => {
                    let texture = ctx.load_texture(
                        format!("thumb_{}", path.display()),
                        color_image(&preview),
                        egui::TextureOptions::LINEAR,
                    );
                    self.state.runtime.thumb_textures.insert(path.clone(), texture);
                    self.state.runtime.session.append(ImageEntry::new(path, preview));
                }
                ScanEvent::Progress(pct) => self.state.runtime.scan_progress = Some(pct),
                ScanEvent::Finished => finished = true,
            }
        }

        if finished {
            self.state.runtime.scan = None;
            self.state.runtime.scan_progress = None;
            let count = self.state.runtime.session.len();
            self.state.runtime.status = Status::Done {
                result: StatusResult::Success(format!(
                    "{} image{} loaded",
                    count,
                    if count == 1 { "" } else { "s" }
                )),
                at: Instant::now(),
            };
            self.show_current();
        }
    }

    /// Load whatever the session cursor points at into the viewer
    fn show_current(&mut self) {
        match self.state.runtime.session.current_entry() {
            Some(entry) => {
                let path = entry.path.clone();
                self.start_viewer_load(path);
            }
            None => {
                self.state.runtime.viewer = None;
                self.state.runtime.viewer_task = None;
            }
        }
    }

    /// Decode the display-size image off the UI thread
    fn start_viewer_load(&mut self, path: PathBuf) {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = load_view(path).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
        self.state.runtime.viewer_task = Some(BackgroundTask::new(rx));
    }

    /// Poll the viewer load for completion
    fn poll_viewer_task(&mut self, ctx: &egui::Context) {
        if let Some(task) = &self.state.runtime.viewer_task
            && let Some(result) = task.poll()
        {
            self.state.runtime.viewer_task = None;

            match result {
                Ok(view) => {
                    let current = self
                        .state
                        .runtime
                        .session
                        .current_entry()
                        .map(|e| e.path.clone());
                    if current.as_deref() == Some(view.path.as_path()) {
                        self.install_view(ctx, view);
                    } else if let Some(path) = current {
                        // The cursor moved while this image decoded; chase it
                        self.start_viewer_load(path);
                    } else {
                        self.state.runtime.viewer = None;
                    }
                }
                Err(err) => {
                    self.state.runtime.viewer = None;
                    self.state.runtime.status = Status::Done {
                        result: StatusResult::Error(err),
                        at: Instant::now(),
                    };
                }
            }
        }
    }

    fn install_view(&mut self, ctx: &egui::Context, view: LoadedView) {
        let texture = ctx.load_texture(
            "viewer",
            color_image(&view.image),
            egui::TextureOptions::LINEAR,
        );
        self.state.runtime.viewer = Some(ViewerState {
            path: view.path,
            summary: view.summary,
            cpu_image: view.image,
            texture,
        });
        self.state.runtime.needs_fit_to_view = true;
    }

    /// Quarter-turn the displayed photo and re-upload its texture
    fn rotate_viewer(&mut self, ctx: &egui::Context, clockwise: bool) {
        if let Some(viewer) = &mut self.state.runtime.viewer {
            viewer.cpu_image = if clockwise {
                image::imageops::rotate90(&viewer.cpu_image)
            } else {
                image::imageops::rotate270(&viewer.cpu_image)
            };
            viewer.texture = ctx.load_texture(
                "viewer",
                color_image(&viewer.cpu_image),
                egui::TextureOptions::LINEAR,
            );
            self.state.runtime.needs_fit_to_view = true;
        }
    }

    fn zoom_viewer(&mut self, factor: f32) {
        if self.state.runtime.viewer.is_some() {
            let zoom = self.state.runtime.viewer_zoom;
            self.state.runtime.viewer_zoom = (zoom * factor).clamp(0.05, 10.0);
        }
    }

    fn go_next(&mut self) {
        if self.state.runtime.session.next().is_some() {
            self.show_current();
        }
    }

    fn go_prev(&mut self) {
        if self.state.runtime.session.prev().is_some() {
            self.show_current();
        }
    }

    fn select_image(&mut self, path: &Path) {
        if let Some(idx) = self.state.runtime.session.position_of(path) {
            self.state.runtime.session.set_current(idx);
            self.show_current();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────

    fn request_delete_current(&mut self) {
        if let Some(entry) = self.state.runtime.session.current_entry() {
            self.state.runtime.confirm_delete = Some(DeleteRequest::Single(entry.path.clone()));
        }
    }

    fn request_delete_selected(&mut self) {
        let count = self.state.runtime.session.selected_count();
        if count == 0 {
            self.state.runtime.notice = Some("No images selected for deletion.".to_string());
        } else {
            self.state.runtime.confirm_delete = Some(DeleteRequest::Selected(count));
        }
    }

    fn delete_single(&mut self, path: &Path) {
        match sidecar::delete_with_sidecars(path) {
            Ok(()) => {
                self.state.runtime.session.remove(path);
                self.state.runtime.thumb_textures.remove(path);
                self.state.runtime.status = Status::Done {
                    result: StatusResult::Success(format!("Deleted {}", file_label(path))),
                    at: Instant::now(),
                };
                self.show_current();
            }
            Err(e) => {
                log::error!("{}", e);
                self.state.runtime.status = Status::Done {
                    result: StatusResult::Error(e.to_string()),
                    at: Instant::now(),
                };
            }
        }
    }

    fn delete_selected(&mut self) {
        let paths = self.state.runtime.session.selected_paths();
        let mut deleted = 0usize;
        let mut failed = 0usize;
        for path in paths {
            match sidecar::delete_with_sidecars(&path) {
                Ok(()) => {
                    deleted += 1;
                    self.state.runtime.session.remove(&path);
                    self.state.runtime.thumb_textures.remove(&path);
                }
                Err(e) => {
                    failed += 1;
                    log::error!("{}", e);
                }
            }
        }

        self.state.runtime.status = Status::Done {
            result: if failed == 0 {
                StatusResult::Success(format!(
                    "Deleted {} image{}",
                    deleted,
                    if deleted == 1 { "" } else { "s" }
                ))
            } else {
                StatusResult::Error(format!("Deleted {}, {} failed", deleted, failed))
            },
            at: Instant::now(),
        };
        self.show_current();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Upload
    // ─────────────────────────────────────────────────────────────────────

    fn start_upload_selected(&mut self) {
        let selected = self.state.runtime.session.selected_paths();
        if selected.is_empty() {
            self.state.runtime.notice = Some("No images selected for upload.".to_string());
            return;
        }

        let (Some(secret_path), Some(token_path)) =
            (upload::default_secret_path(), upload::default_token_path())
        else {
            self.state.runtime.notice =
                Some("Could not locate a configuration directory for credentials.".to_string());
            return;
        };

        let authenticator = match Authenticator::new(&secret_path, token_path) {
            Ok(a) => a,
            Err(e) => {
                log::error!("{}", e);
                self.state.runtime.notice = Some(format!(
                    "Upload needs a Google API client secret at {}.\n{}",
                    secret_path.display(),
                    e
                ));
                return;
            }
        };

        log::info!(
            "Uploading {} selected image{}",
            selected.len(),
            if selected.len() == 1 { "" } else { "s" }
        );
        self.state.runtime.upload_progress = Some((0, selected.len()));
        self.state.runtime.upload = Some(upload::start_upload(authenticator, selected));
        self.state.runtime.status = Status::Working {
            operation: Operation::Uploading,
            started_at: Instant::now(),
        };
    }

    fn drain_upload_events(&mut self) {
        let events: Vec<UploadEvent> = match &self.state.runtime.upload {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };

        for event in events {
            match event {
                UploadEvent::Started { total } => {
                    self.state.runtime.upload_progress = Some((0, total));
                }
                UploadEvent::AuthorizationNeeded { url } => {
                    self.state.runtime.auth_url = Some(url);
                }
                UploadEvent::ItemDone { .. } | UploadEvent::ItemFailed { .. } => {
                    self.state.runtime.auth_url = None;
                    if let Some((done, _)) = &mut self.state.runtime.upload_progress {
                        *done += 1;
                    }
                }
                UploadEvent::Finished(report) => {
                    self.state.runtime.upload = None;
                    self.state.runtime.upload_progress = None;
                    self.state.runtime.auth_url = None;

                    let result = if let Some(reason) = &report.aborted {
                        StatusResult::Error(format!("Upload aborted: {}", reason))
                    } else if report.failed.is_empty() {
                        StatusResult::Success(format!(
                            "Uploaded {} file{}",
                            report.uploaded,
                            if report.uploaded == 1 { "" } else { "s" }
                        ))
                    } else {
                        StatusResult::Error(format!(
                            "Uploaded {}, {} failed",
                            report.uploaded,
                            report.failed.len()
                        ))
                    };
                    self.state.runtime.status = Status::Done {
                        result,
                        at: Instant::now(),
                    };
                    self.state.runtime.upload_report = Some(report);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dialogs and input
    // ─────────────────────────────────────────────────────────────────────

    fn open_exif_window(&mut self) {
        let Some((path, title)) = self
            .state
            .runtime
            .viewer
            .as_ref()
            .map(|v| (v.path.clone(), file_label(&v.path)))
        else {
            return;
        };

        match metadata::read_all_fields(&path) {
            Ok(fields) => {
                self.state.runtime.exif_window = Some(dialogs::ExifWindow::new(title, fields));
            }
            Err(e) => {
                log::warn!("{}", e);
                self.state.runtime.notice = Some(format!("Could not read EXIF data: {}", e));
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.state.runtime.modal_open() {
            return;
        }

        let (next, prev, zoom_in, zoom_out, toggle) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals),
                i.key_pressed(egui::Key::Minus),
                i.key_pressed(egui::Key::Space),
            )
        });

        if next {
            self.go_next();
        }
        if prev {
            self.go_prev();
        }
        if zoom_in {
            self.zoom_viewer(1.25);
        }
        if zoom_out {
            self.zoom_viewer(0.8);
        }
        if toggle {
            self.state.runtime.session.toggle_current();
        }
    }

    fn apply_controls(&mut self, ctx: &egui::Context, action: panels::ControlsAction) {
        if action.open_requested {
            let mut dialog = rfd::FileDialog::new();
            if let Some(dir) = &self.state.config.last_open_dir {
                dialog = dialog.set_directory(dir);
            }
            if let Some(folder) = dialog.pick_folder() {
                self.open_directory(folder);
            }
        }
        if action.prev_requested {
            self.go_prev();
        }
        if action.next_requested {
            self.go_next();
        }
        if action.zoom_in {
            self.zoom_viewer(1.25);
        }
        if action.zoom_out {
            self.zoom_viewer(0.8);
        }
        if action.rotate_left {
            self.rotate_viewer(ctx, false);
        }
        if action.rotate_right {
            self.rotate_viewer(ctx, true);
        }
        if action.select_all {
            self.state.runtime.session.select_all();
        }
        if action.delete_requested {
            self.request_delete_current();
        }
        if action.delete_selected_requested {
            self.request_delete_selected();
        }
        if action.upload_requested {
            self.start_upload_selected();
        }
    }

    fn apply_filmstrip(&mut self, action: panels::FilmstripAction) {
        if let Some(path) = action.select {
            self.select_image(&path);
        }
        if let Some(path) = action.toggle {
            self.state.runtime.session.toggle(&path);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(request) = self.state.runtime.confirm_delete.clone() {
            match dialogs::confirm_delete(ctx, &request) {
                Some(true) => {
                    self.state.runtime.confirm_delete = None;
                    match request {
                        DeleteRequest::Single(path) => self.delete_single(&path),
                        DeleteRequest::Selected(_) => self.delete_selected(),
                    }
                }
                Some(false) => self.state.runtime.confirm_delete = None,
                None => {}
            }
        }

        let dismissed = match &self.state.runtime.notice {
            Some(message) => dialogs::notice(ctx, message),
            None => false,
        };
        if dismissed {
            self.state.runtime.notice = None;
        }

        if let Some(url) = &self.state.runtime.auth_url {
            dialogs::auth_prompt(ctx, url);
        }

        let dismissed = match &self.state.runtime.upload_report {
            Some(report) => dialogs::upload_report(ctx, report),
            None => false,
        };
        if dismissed {
            self.state.runtime.upload_report = None;
        }

        let keep_open = match &mut self.state.runtime.exif_window {
            Some(window) => window.show(ctx),
            None => true,
        };
        if !keep_open {
            self.state.runtime.exif_window = None;
        }
    }
}

/// Decode the display-size image and read capture metadata off the UI thread
fn load_view(path: PathBuf) -> Result<LoadedView, SiftError> {
    let image = scan::render_display(&path)?;
    let summary = metadata::read_summary(&path);
    Ok(LoadedView {
        path,
        image,
        summary,
    })
}

fn color_image(img: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [img.width() as usize, img.height() as usize],
        img.as_raw(),
    )
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for SiftApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll background work
        self.drain_scan_events(ctx);
        self.poll_viewer_task(ctx);
        self.drain_upload_events();

        // Keep painting while anything is still in flight
        if self.state.runtime.scan.is_some()
            || self.state.runtime.viewer_task.is_some()
            || self.state.runtime.upload.is_some()
        {
            ctx.request_repaint();
        }

        // Auto-clear old success messages
        self.state.runtime.status.maybe_clear(Duration::from_secs(5));

        self.handle_shortcuts(ctx);

        // Bottom bar with controls and status
        let action = egui::TopBottomPanel::bottom("controls_bar")
            .show(ctx, |ui| panels::controls_bar(ui, &self.state))
            .inner;

        // Filmstrip sits above the controls
        let strip_action = egui::TopBottomPanel::bottom("filmstrip")
            .exact_height(150.0)
            .show(ctx, |ui| panels::filmstrip_panel(ui, &self.state))
            .inner;

        // Right panel with capture info
        let meta_action = egui::SidePanel::right("metadata_panel")
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| panels::metadata_panel(ui, &self.state))
            .inner;

        // Central panel with the viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::viewer_panel(ui, &mut self.state);
        });

        self.apply_controls(ctx, action);
        self.apply_filmstrip(strip_action);
        if meta_action.show_full_exif {
            self.open_exif_window();
        }
        self.show_dialogs(ctx);
    }
}
