use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::SiftError;

/// RAW extensions probed for sidecars sharing an image's base name.
/// Uppercase only, which is how cameras write them.
pub const RAW_EXTENSIONS: [&str; 7] = ["RAF", "NEF", "CR2", "ARW", "ORF", "RW2", "PEF"];

/// RAW files sharing `path`'s base name that exist on disk, in table order.
pub fn existing_sidecars(path: &Path) -> Vec<PathBuf> {
    RAW_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .filter(|p| p.exists())
        .collect()
}

/// Delete an image together with any RAW sidecars. A file that is already
/// gone is logged and skipped; any other failure stops the deletion with
/// the offending path.
pub fn delete_with_sidecars(path: &Path) -> Result<(), SiftError> {
    for sidecar in existing_sidecars(path) {
        remove_tolerant(&sidecar)?;
    }
    remove_tolerant(path)
}

fn remove_tolerant(path: &Path) -> Result<(), SiftError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("Deleted {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Already gone: {}", path.display());
            Ok(())
        }
        Err(e) => Err(SiftError::Delete {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_delete_removes_raw_pair() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("shot.jpg");
        let raw = dir.path().join("shot.CR2");
        touch(&jpg);
        touch(&raw);

        delete_with_sidecars(&jpg).unwrap();

        assert!(!jpg.exists());
        assert!(!raw.exists());
    }

    #[test]
    fn test_delete_without_sidecar_removes_only_main() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("lonely.jpg");
        let unrelated = dir.path().join("other.jpg");
        touch(&jpg);
        touch(&unrelated);

        delete_with_sidecars(&jpg).unwrap();

        assert!(!jpg.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_delete_all_known_raw_formats() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("multi.jpg");
        touch(&jpg);
        for ext in RAW_EXTENSIONS {
            touch(&dir.path().join(format!("multi.{}", ext)));
        }

        delete_with_sidecars(&jpg).unwrap();

        assert!(!jpg.exists());
        for ext in RAW_EXTENSIONS {
            assert!(!dir.path().join(format!("multi.{}", ext)).exists());
        }
    }

    #[test]
    fn test_delete_missing_main_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never_existed.jpg");

        assert!(delete_with_sidecars(&gone).is_ok());
    }

    #[test]
    fn test_existing_sidecars_in_table_order() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("ordered.jpg");
        touch(&jpg);
        touch(&dir.path().join("ordered.NEF"));
        touch(&dir.path().join("ordered.RAF"));

        let sidecars = existing_sidecars(&jpg);
        assert_eq!(
            sidecars,
            [dir.path().join("ordered.RAF"), dir.path().join("ordered.NEF")]
        );
    }

    #[test]
    fn test_sidecars_do_not_match_other_basenames() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("one.jpg");
        touch(&jpg);
        touch(&dir.path().join("two.CR2"));

        assert!(existing_sidecars(&jpg).is_empty());
    }
}
