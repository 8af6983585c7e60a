use std::path::{Path, PathBuf};

use image::RgbaImage;

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

/// One loaded image in the culling session.
pub struct ImageEntry {
    pub path: PathBuf,
    /// Thumbnail rendered by the scan worker (fits in a 100x100 box).
    pub preview: RgbaImage,
    /// Checkbox state for batch delete/upload.
    pub selected: bool,
}

impl ImageEntry {
    pub fn new(path: PathBuf, preview: RgbaImage) -> Self {
        Self {
            path,
            preview,
            selected: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered list of loaded images plus the cursor the viewer follows.
///
/// Entries are kept in arrival order. `current` is `None` when nothing is
/// loaded; it can also be `None` with entries present after the first entry
/// was removed out from under it. All operations on an empty session are
/// no-ops rather than errors.
#[derive(Default)]
pub struct Session {
    entries: Vec<ImageEntry>,
    current: Option<usize>,
}

impl Session {
    /// Drop all entries and reset the cursor. Called when a new directory
    /// load starts.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Add an entry at the end. The first entry makes itself current.
    pub fn append(&mut self, entry: ImageEntry) {
        self.entries.push(entry);
        if self.entries.len() == 1 {
            self.current = Some(0);
        }
    }

    /// Advance the cursor. A cursor parked before the start moves to the
    /// first entry. Returns the newly current path, or `None` when already
    /// at the end (or nothing is loaded).
    pub fn next(&mut self) -> Option<&Path> {
        if self.entries.is_empty() {
            return None;
        }
        let target = match self.current {
            None => 0,
            Some(cur) if cur + 1 < self.entries.len() => cur + 1,
            Some(_) => {
                log::debug!("Already at the last image");
                return None;
            }
        };
        self.current = Some(target);
        self.entries.get(target).map(|e| e.path.as_path())
    }

    /// Move the cursor back. Returns the newly current path, or `None` when
    /// already at the first image (or nothing is loaded).
    pub fn prev(&mut self) -> Option<&Path> {
        let cur = self.current?;
        if cur == 0 {
            log::debug!("Already at the first image");
            return None;
        }
        self.current = Some(cur - 1);
        self.entries.get(cur - 1).map(|e| e.path.as_path())
    }

    /// Remove the entry for `path`, keeping the cursor on the same image
    /// where possible: removing at or before the cursor shifts it back one
    /// (to `None` when it falls off the front). Returns whether anything
    /// was removed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let Some(removed) = self.position_of(path) else {
            return false;
        };
        self.entries.remove(removed);

        if self.entries.is_empty() {
            self.current = None;
            return true;
        }

        if let Some(cur) = self.current {
            let shifted = if removed <= cur {
                cur.checked_sub(1)
            } else {
                Some(cur)
            };
            self.current = shifted.map(|c| c.min(self.entries.len() - 1));
        }
        true
    }

    /// Flip the checkbox for `path`. Unknown paths are ignored.
    pub fn toggle(&mut self, path: &Path) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            entry.selected = !entry.selected;
        }
    }

    /// Flip the checkbox for the current image, if any.
    pub fn toggle_current(&mut self) {
        if let Some(cur) = self.current
            && let Some(entry) = self.entries.get_mut(cur)
        {
            entry.selected = !entry.selected;
        }
    }

    /// Check every entry.
    pub fn select_all(&mut self) {
        for entry in &mut self.entries {
            entry.selected = true;
        }
    }

    /// Checked paths, in entry order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    /// Point the cursor at `index`, clamped to the entry range. No-op when
    /// empty.
    pub fn set_current(&mut self, index: usize) {
        if !self.entries.is_empty() {
            self.current = Some(index.min(self.entries.len() - 1));
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&ImageEntry> {
        self.entries.get(self.current?)
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ImageEntry {
        ImageEntry::new(PathBuf::from(name), RgbaImage::new(4, 4))
    }

    #[test]
    fn test_append_sets_first_current() {
        let mut session = Session::default();
        assert_eq!(session.current_index(), None);

        session.append(entry("a.jpg"));
        assert_eq!(session.current_index(), Some(0));

        session.append(entry("b.jpg"));
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut session = Session::default();
        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            session.append(entry(name));
        }

        let names: Vec<_> = session
            .entries()
            .iter()
            .map(|e| e.path.display().to_string())
            .collect();
        assert_eq!(names, ["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_next_prev_clamp_at_boundaries() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));

        assert_eq!(session.prev(), None);
        assert_eq!(session.current_index(), Some(0));

        assert_eq!(session.next(), Some(Path::new("b.jpg")));
        assert_eq!(session.next(), None);
        assert_eq!(session.current_index(), Some(1));

        assert_eq!(session.prev(), Some(Path::new("a.jpg")));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_empty_session_ops_are_noops() {
        let mut session = Session::default();
        assert_eq!(session.next(), None);
        assert_eq!(session.prev(), None);
        assert!(!session.remove(Path::new("missing.jpg")));
        session.toggle(Path::new("missing.jpg"));
        session.toggle_current();
        session.select_all();
        session.set_current(3);
        assert_eq!(session.current_index(), None);
        assert!(session.is_empty());
    }

    #[test]
    fn test_remove_last_entry_moves_current_back() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.append(entry("c.jpg"));
        session.set_current(2);

        assert!(session.remove(Path::new("c.jpg")));
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_remove_before_current_decrements() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.append(entry("c.jpg"));
        session.set_current(2);

        assert!(session.remove(Path::new("a.jpg")));
        // Still pointing at c.jpg after the shift
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(
            session.current_entry().map(|e| e.path.clone()),
            Some(PathBuf::from("c.jpg"))
        );
    }

    #[test]
    fn test_remove_after_current_keeps_index() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.append(entry("c.jpg"));

        assert!(session.remove(Path::new("c.jpg")));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_remove_only_entry_clears_current() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));

        assert!(session.remove(Path::new("a.jpg")));
        assert_eq!(session.current_index(), None);
        assert!(session.is_empty());
    }

    #[test]
    fn test_remove_first_while_current_parks_before_start() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));

        assert!(session.remove(Path::new("a.jpg")));
        // Cursor fell off the front; one entry remains unviewed
        assert_eq!(session.current_index(), None);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_next_recovers_from_parked_cursor() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.remove(Path::new("a.jpg"));
        assert_eq!(session.current_index(), None);

        // prev stays parked, next lands on the first remaining entry
        assert_eq!(session.prev(), None);
        assert_eq!(session.next(), Some(Path::new("b.jpg")));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.select_all();

        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.current_index(), None);
        assert_eq!(session.selected_count(), 0);
    }

    #[test]
    fn test_toggle_and_select_all() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));

        session.toggle(Path::new("a.jpg"));
        assert_eq!(session.selected_count(), 1);

        session.toggle(Path::new("a.jpg"));
        assert_eq!(session.selected_count(), 0);

        session.select_all();
        assert_eq!(session.selected_count(), 2);
    }

    #[test]
    fn test_toggle_current_follows_cursor() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));
        session.next();

        session.toggle_current();
        assert_eq!(session.selected_paths(), [PathBuf::from("b.jpg")]);
    }

    #[test]
    fn test_selected_paths_in_entry_order() {
        let mut session = Session::default();
        session.append(entry("c.jpg"));
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));

        session.toggle(Path::new("b.jpg"));
        session.toggle(Path::new("c.jpg"));

        assert_eq!(
            session.selected_paths(),
            [PathBuf::from("c.jpg"), PathBuf::from("b.jpg")]
        );
    }

    #[test]
    fn test_set_current_clamps_to_range() {
        let mut session = Session::default();
        session.append(entry("a.jpg"));
        session.append(entry("b.jpg"));

        session.set_current(10);
        assert_eq!(session.current_index(), Some(1));
    }
}
