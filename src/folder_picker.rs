//! A directory browser used by the terminal form to choose the template folder.

use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of a key press handled by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Keep browsing.
    Browsing,
    /// The user accepted a folder.
    Selected(PathBuf),
    /// The user closed the picker without choosing.
    Cancelled,
}

#[derive(Debug)]
pub struct FolderPicker {
    current: PathBuf,
    entries: Vec<String>,
    selected: usize,
    error: Option<String>,
}

impl FolderPicker {
    /// Opens the picker at `start`, or at the working directory when `start`
    /// is missing or not a directory.
    pub fn open(start: Option<&Path>) -> Self {
        let current = start
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut picker = Self {
            current,
            entries: Vec::new(),
            selected: 0,
            error: None,
        };
        picker.refresh();
        picker
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Names of the subdirectories of the current folder, sorted.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.selected)
    }

    /// Set when the current folder could not be listed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.entries.len() - 1);
        }
    }

    /// Descends into the highlighted subdirectory.
    pub fn enter(&mut self) {
        if let Some(name) = self.entries.get(self.selected) {
            self.current = self.current.join(name);
            self.refresh();
        }
    }

    /// Moves up one level, highlighting the folder just left.
    pub fn parent(&mut self) {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return;
        };
        let left = self
            .current
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        self.current = parent;
        self.refresh();
        if let Some(left) = left
            && let Some(index) = self.entries.iter().position(|e| *e == left)
        {
            self.selected = index;
        }
    }

    fn refresh(&mut self) {
        self.entries.clear();
        self.selected = 0;
        self.error = None;

        let walker = WalkDir::new(&self.current)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| {
                a.file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .cmp(&b.file_name().to_string_lossy().to_lowercase())
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !name.starts_with('.') && entry.path().is_dir() {
                        self.entries.push(name);
                    }
                }
                Err(e) if e.depth() == 0 => {
                    self.error = Some(format!("Could not read {}: {}", self.current.display(), e));
                    break;
                }
                Err(e) => log::debug!("Skipping entry: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["clients/Smith", "clients/adams", "archive", ".hidden"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        fs::write(temp_dir.path().join("RLT.docx"), "x").unwrap();
        temp_dir
    }

    #[test]
    fn test_lists_visible_subdirectories_sorted() {
        let temp_dir = tree();
        let picker = FolderPicker::open(Some(temp_dir.path()));

        assert_eq!(picker.current(), temp_dir.path());
        assert_eq!(picker.entries(), ["archive", "clients"]);
        assert_eq!(picker.selected(), Some(0));
        assert!(picker.error().is_none());
    }

    #[test]
    fn test_enter_and_parent() {
        let temp_dir = tree();
        let mut picker = FolderPicker::open(Some(temp_dir.path()));

        picker.next();
        picker.enter();
        assert_eq!(picker.current(), temp_dir.path().join("clients"));
        assert_eq!(picker.entries(), ["adams", "Smith"]);

        picker.parent();
        assert_eq!(picker.current(), temp_dir.path());
        assert_eq!(picker.selected(), Some(1));
    }

    #[test]
    fn test_navigation_wraps() {
        let temp_dir = tree();
        let mut picker = FolderPicker::open(Some(temp_dir.path()));

        picker.previous();
        assert_eq!(picker.selected(), Some(1));
        picker.next();
        assert_eq!(picker.selected(), Some(0));
    }

    #[test]
    fn test_empty_folder_has_no_selection() {
        let temp_dir = TempDir::new().unwrap();
        let mut picker = FolderPicker::open(Some(temp_dir.path()));

        assert_eq!(picker.selected(), None);
        picker.enter();
        assert_eq!(picker.current(), temp_dir.path());
    }

    #[test]
    fn test_missing_start_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let picker = FolderPicker::open(Some(&temp_dir.path().join("gone")));
        assert!(picker.current().is_dir());
    }
}
