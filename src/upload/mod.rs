mod auth;
mod client;

pub use auth::{Authenticator, ClientSecret, StoredToken, default_secret_path, default_token_path};
pub use client::PhotosClient;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{info, warn};

use crate::error::SiftError;
use crate::sidecar::existing_sidecars;

/// Progress events from one upload batch. The final event is always
/// Finished, whatever happened before it.
pub enum UploadEvent {
    Started { total: usize },
    /// Interactive consent is required; the user must open this URL.
    AuthorizationNeeded { url: String },
    ItemDone { path: PathBuf },
    ItemFailed { path: PathBuf, message: String },
    Finished(UploadReport),
}

/// Outcome accounting for one batch.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: Vec<(PathBuf, String)>,
    /// Set when a credential failure stopped the batch before any uploads.
    pub aborted: Option<String>,
}

/// Upload the given images plus any RAW sidecars on a background thread.
/// Per-file failures are reported and the batch continues; a credential
/// failure aborts the whole batch.
pub fn start_upload(authenticator: Authenticator, paths: Vec<PathBuf>) -> Receiver<UploadEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let report = run_batch(&authenticator, &paths, &tx);
        let _ = tx.send(UploadEvent::Finished(report));
    });

    rx
}

/// Each selected image is followed by its sidecars so pairs land together.
fn batch_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        files.push(path.clone());
        files.extend(existing_sidecars(path));
    }
    files
}

fn run_batch(
    authenticator: &Authenticator,
    paths: &[PathBuf],
    tx: &Sender<UploadEvent>,
) -> UploadReport {
    let mut report = UploadReport::default();
    let files = batch_files(paths);
    let _ = tx.send(UploadEvent::Started { total: files.len() });

    let consent_tx = tx.clone();
    let access_token = match authenticator.obtain(move |url| {
        let _ = consent_tx.send(UploadEvent::AuthorizationNeeded {
            url: url.to_string(),
        });
    }) {
        Ok(token) => token,
        Err(e) => {
            // Without credentials nothing in the batch can proceed
            warn!("Upload aborted: {}", e);
            report.aborted = Some(e.to_string());
            return report;
        }
    };

    let client = PhotosClient::new(access_token);
    for path in files {
        match upload_one(&client, &path) {
            Ok(()) => {
                report.uploaded += 1;
                let _ = tx.send(UploadEvent::ItemDone { path });
            }
            Err(e) => {
                warn!("{}", e);
                let message = e.to_string();
                report.failed.push((path.clone(), message.clone()));
                let _ = tx.send(UploadEvent::ItemFailed { path, message });
            }
        }
    }

    info!(
        "Upload finished: {} ok, {} failed",
        report.uploaded,
        report.failed.len()
    );
    report
}

fn upload_one(client: &PhotosClient, path: &Path) -> Result<(), SiftError> {
    let upload_token = client.upload_bytes(path)?;
    let description = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    client.create_media_item(upload_token, &description)
}
