mod scanner;
mod thumbnail;

pub use scanner::{SCAN_WORKERS, ScanEvent, ScanHandle, start_scan};
pub use thumbnail::{DISPLAY_SIZE, PREVIEW_SIZE, render_display, render_preview};
