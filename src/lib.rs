pub mod cli;
pub mod error;
#[cfg(feature = "gui")]
pub mod gui;
pub mod metadata;
pub mod scan;
pub mod session;
pub mod sidecar;
pub mod upload;

pub use cli::CliArgs;
pub use error::SiftError;
pub use metadata::CaptureSummary;
pub use scan::{ScanEvent, ScanHandle, start_scan};
pub use session::{ImageEntry, Session};
