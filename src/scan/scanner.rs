use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use image::RgbaImage;
use log::{info, warn};
use rayon::prelude::*;

use super::thumbnail::render_preview;
use crate::error::SiftError;

/// Fixed number of decode workers per scan.
pub const SCAN_WORKERS: usize = 8;

/// Events streamed back from a directory scan. The sequence is well
/// ordered: FileReady/Progress pairs in completion order, then exactly one
/// Finished.
pub enum ScanEvent {
    /// One image decoded. Completion order is not enumeration order.
    FileReady { path: PathBuf, preview: RgbaImage },
    /// Share of files accounted for so far, 0..=100, non-decreasing.
    Progress(u8),
    /// Terminal event, delivered exactly once per scan.
    Finished,
}

/// Handle to one running scan. Dropping it cancels the workers.
pub struct ScanHandle {
    pub events: Receiver<ScanEvent>,
    cancel: Arc<AtomicBool>,
    total: usize,
}

impl ScanHandle {
    /// Ask the workers to stop. Files not yet decoded are skipped without
    /// events; the terminal Finished is still delivered.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Number of files the scan enumerated.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Enumerate the .jpg files in `directory` and decode previews for them on
/// a fixed worker pool. Enumeration happens before this returns, so the
/// caller sees directory errors immediately; decoding streams through the
/// handle's channel.
pub fn start_scan(directory: &Path) -> Result<ScanHandle, SiftError> {
    let paths = collect_jpeg_paths(directory)?;
    let total = paths.len();
    info!("Scanning {} images in {}", total, directory.display());

    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);

    std::thread::spawn(move || {
        run_scan(&paths, &tx, &worker_cancel);
        // Exactly one terminal event per scan, cancelled or not
        let _ = tx.send(ScanEvent::Finished);
    });

    Ok(ScanHandle {
        events: rx,
        cancel,
        total,
    })
}

/// Case-insensitive .jpg filter. Other extensions, .jpeg included, are not
/// eligible.
fn is_eligible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg"))
        .unwrap_or(false)
}

/// List the eligible files once, sorted by path for determinism. The file
/// count is fixed for the lifetime of the scan.
fn collect_jpeg_paths(directory: &Path) -> Result<Vec<PathBuf>, SiftError> {
    if !directory.is_dir() {
        return Err(SiftError::DirectoryNotFound(directory.to_path_buf()));
    }

    let entries = std::fs::read_dir(directory).map_err(|e| SiftError::DirectoryRead {
        path: directory.to_path_buf(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SiftError::DirectoryRead {
            path: directory.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_eligible(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn run_scan(paths: &[PathBuf], tx: &Sender<ScanEvent>, cancel: &AtomicBool) {
    if paths.is_empty() {
        return;
    }
    let tracker = ProgressTracker::new(paths.len());

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(SCAN_WORKERS)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Could not build scan pool ({}), decoding sequentially", e);
            for path in paths {
                process_file(path, tx, cancel, &tracker);
            }
            return;
        }
    };

    pool.install(|| {
        paths.par_iter().for_each_with(tx.clone(), |tx, path| {
            process_file(path, tx, cancel, &tracker);
        });
    });
}

fn process_file(
    path: &Path,
    tx: &Sender<ScanEvent>,
    cancel: &AtomicBool,
    tracker: &ProgressTracker,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }
    match render_preview(path) {
        Ok(preview) => tracker.complete(
            tx,
            Some(ScanEvent::FileReady {
                path: path.to_path_buf(),
                preview,
            }),
        ),
        Err(e) => {
            // Undecodable files are skipped but still count toward progress,
            // so the bar always lands on 100
            warn!("Skipping unreadable image: {}", e);
            tracker.complete(tx, None);
        }
    }
}

/// Serializes event emission across workers: FileReady/Progress pairs stay
/// adjacent and progress values are non-decreasing on the wire.
struct ProgressTracker {
    done: Mutex<usize>,
    total: usize,
}

impl ProgressTracker {
    fn new(total: usize) -> Self {
        Self {
            done: Mutex::new(0),
            total,
        }
    }

    /// Record one completed file and emit its events. `ready` is None when
    /// the decode failed.
    fn complete(&self, tx: &Sender<ScanEvent>, ready: Option<ScanEvent>) {
        let Ok(mut done) = self.done.lock() else {
            return;
        };
        *done += 1;
        let pct = progress_pct(*done, self.total);
        if let Some(event) = ready {
            let _ = tx.send(event);
        }
        let _ = tx.send(ScanEvent::Progress(pct));
    }
}

/// done/total as a percentage, rounded half-up in integer arithmetic.
fn progress_pct(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100 + total / 2) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_jpeg(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(64, 48, |x, y| {
            Rgb([(x * 4 % 256) as u8, (y * 5 % 256) as u8, 200])
        });
        img.save(&path).unwrap();
        path
    }

    fn drain(handle: &ScanHandle) -> Vec<ScanEvent> {
        // iter() ends once the worker thread drops its sender
        handle.events.iter().collect()
    }

    #[test]
    fn test_progress_pct_rounds_half_up() {
        assert_eq!(progress_pct(1, 3), 33);
        assert_eq!(progress_pct(2, 3), 67);
        assert_eq!(progress_pct(1, 8), 13);
        assert_eq!(progress_pct(1, 200), 1);
        assert_eq!(progress_pct(8, 8), 100);
        assert_eq!(progress_pct(0, 0), 100);
    }

    #[test]
    fn test_eligibility_is_case_insensitive_jpg_only() {
        assert!(is_eligible(Path::new("a.jpg")));
        assert!(is_eligible(Path::new("b.JPG")));
        assert!(is_eligible(Path::new("c.Jpg")));
        assert!(!is_eligible(Path::new("d.jpeg")));
        assert!(!is_eligible(Path::new("e.png")));
        assert!(!is_eligible(Path::new("noext")));
    }

    #[test]
    fn test_scan_emits_file_ready_per_image_then_finished() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(dir.path(), "a.jpg");
        write_jpeg(dir.path(), "b.jpg");
        write_jpeg(dir.path(), "c.jpg");

        let handle = start_scan(dir.path()).unwrap();
        assert_eq!(handle.total(), 3);

        let events = drain(&handle);
        let ready = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::FileReady { .. }))
            .count();
        let finished = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Finished))
            .count();

        assert_eq!(ready, 3);
        assert_eq!(finished, 1);
        assert!(matches!(events.last(), Some(ScanEvent::Finished)));
    }

    #[test]
    fn test_scan_previews_fit_bounding_box() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(dir.path(), "a.jpg");

        let handle = start_scan(dir.path()).unwrap();
        for event in drain(&handle) {
            if let ScanEvent::FileReady { preview, .. } = event {
                assert!(preview.width() <= 100);
                assert!(preview.height() <= 100);
            }
        }
    }

    #[test]
    fn test_scan_progress_monotonic_ending_at_100() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"] {
            write_jpeg(dir.path(), name);
        }

        let handle = start_scan(dir.path()).unwrap();
        let mut last = 0u8;
        let mut progress_events = 0;
        for event in drain(&handle) {
            if let ScanEvent::Progress(pct) = event {
                assert!(pct >= last, "progress went backwards: {} -> {}", last, pct);
                last = pct;
                progress_events += 1;
            }
        }
        assert_eq!(progress_events, 5);
        assert_eq!(last, 100);
    }

    #[test]
    fn test_failed_decode_skips_file_but_counts_progress() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(dir.path(), "good.jpg");
        std::fs::write(dir.path().join("broken.jpg"), b"junk").unwrap();

        let handle = start_scan(dir.path()).unwrap();
        assert_eq!(handle.total(), 2);

        let events = drain(&handle);
        let ready: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::FileReady { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        let last_progress = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .last();

        assert_eq!(ready, [dir.path().join("good.jpg")]);
        assert_eq!(last_progress, Some(100));
    }

    #[test]
    fn test_scan_only_picks_up_jpg_files() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(dir.path(), "keep.jpg");
        write_jpeg(dir.path(), "KEEP2.JPG");
        write_jpeg(dir.path(), "skip.png");
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let handle = start_scan(dir.path()).unwrap();
        assert_eq!(handle.total(), 2);

        let mut ready: Vec<_> = drain(&handle)
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::FileReady { path, .. } => {
                    Some(path.file_name().unwrap().to_string_lossy().to_string())
                }
                _ => None,
            })
            .collect();
        ready.sort();
        assert_eq!(ready, ["KEEP2.JPG", "keep.jpg"]);
    }

    #[test]
    fn test_empty_directory_finishes_immediately() {
        let dir = tempfile::tempdir().unwrap();

        let handle = start_scan(dir.path()).unwrap();
        assert_eq!(handle.total(), 0);

        let events = drain(&handle);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ScanEvent::Finished));
    }

    #[test]
    fn test_missing_directory_errors_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            start_scan(&missing),
            Err(SiftError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_cancelled_scan_still_delivers_one_finished() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write_jpeg(dir.path(), &format!("img_{}.jpg", i));
        }

        let handle = start_scan(dir.path()).unwrap();
        handle.cancel();

        let events = drain(&handle);
        let finished = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Finished))
            .count();
        assert_eq!(finished, 1);
        assert!(matches!(events.last(), Some(ScanEvent::Finished)));
    }
}
