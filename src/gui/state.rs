use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::metadata::CaptureSummary;
use crate::scan::ScanHandle;
use crate::session::Session;
use crate::upload::{UploadEvent, UploadReport};

use super::dialogs::{DeleteRequest, ExifWindow};

// ─────────────────────────────────────────────────────────────────────────────
// Background Task Abstraction
// ─────────────────────────────────────────────────────────────────────────────

/// Generic handle for background operations (viewer image loads)
pub struct BackgroundTask<T> {
    receiver: mpsc::Receiver<Result<T, String>>,
}

impl<T> BackgroundTask<T> {
    pub fn new(receiver: mpsc::Receiver<Result<T, String>>) -> Self {
        Self { receiver }
    }

    /// Non-blocking poll for result
    pub fn poll(&self) -> Option<Result<T, String>> {
        self.receiver.try_recv().ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewer data
// ─────────────────────────────────────────────────────────────────────────────

/// Decoded image and metadata riding back from a viewer load thread
pub struct LoadedView {
    pub path: PathBuf,
    pub image: RgbaImage,
    pub summary: CaptureSummary,
}

/// What the central panel is currently showing
pub struct ViewerState {
    pub path: PathBuf,
    pub summary: CaptureSummary,
    /// CPU-side pixels, kept so rotation can re-upload the texture
    pub cpu_image: RgbaImage,
    pub texture: egui::TextureHandle,
}

// ─────────────────────────────────────────────────────────────────────────────
// State: Split into Config (durable) and Runtime (transient)
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level application state
#[derive(Default)]
pub struct AppState {
    pub config: AppConfig,
    pub runtime: RuntimeState,
}

/// Durable user-facing settings
#[derive(Clone, Default)]
pub struct AppConfig {
    /// Directory last opened, used to seed the folder picker
    pub last_open_dir: Option<PathBuf>,
}

/// Transient runtime state (not serializable)
pub struct RuntimeState {
    pub session: Session,

    // Directory scan in flight. Replacing the handle drops the old
    // receiver, so a superseded scan can never feed the session.
    pub scan: Option<ScanHandle>,
    pub scan_progress: Option<u8>,

    // Central viewer
    pub viewer: Option<ViewerState>,
    pub viewer_task: Option<BackgroundTask<LoadedView>>,
    pub viewer_zoom: f32,
    pub viewer_offset: egui::Vec2,
    pub needs_fit_to_view: bool,

    // Filmstrip textures, keyed by image path
    pub thumb_textures: HashMap<PathBuf, egui::TextureHandle>,

    // Upload batch in flight
    pub upload: Option<mpsc::Receiver<UploadEvent>>,
    pub upload_progress: Option<(usize, usize)>,
    pub auth_url: Option<String>,
    pub upload_report: Option<UploadReport>,

    // Dialogs
    pub confirm_delete: Option<DeleteRequest>,
    pub notice: Option<String>,
    pub exif_window: Option<ExifWindow>,

    pub status: Status,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            session: Session::default(),

            scan: None,
            scan_progress: None,

            viewer: None,
            viewer_task: None,
            viewer_zoom: 1.0,
            viewer_offset: egui::Vec2::ZERO,
            needs_fit_to_view: false,

            thumb_textures: HashMap::new(),

            upload: None,
            upload_progress: None,
            auth_url: None,
            upload_report: None,

            confirm_delete: None,
            notice: None,
            exif_window: None,

            status: Status::Idle,
        }
    }
}

impl RuntimeState {
    /// A modal dialog is up, so keyboard shortcuts stand down
    pub fn modal_open(&self) -> bool {
        self.confirm_delete.is_some()
            || self.notice.is_some()
            || self.upload_report.is_some()
            || self.auth_url.is_some()
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status with timing support
// ─────────────────────────────────────────────────────────────────────────────

pub enum Status {
    Idle,
    Working {
        operation: Operation,
        started_at: Instant,
    },
    Done {
        result: StatusResult,
        at: Instant,
    },
}

#[derive(Clone, Copy)]
pub enum Operation {
    Scanning,
    Uploading,
}

pub enum StatusResult {
    Success(String),
    Error(String),
}

impl Status {
    /// Auto-clear old success messages, keep errors visible
    pub fn maybe_clear(&mut self, max_age: Duration) {
        if let Status::Done {
            result: StatusResult::Success(_),
            at,
        } = self
            && at.elapsed() > max_age
        {
            *self = Status::Idle;
        }
    }
}
