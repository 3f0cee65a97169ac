//! Domain models for candidate files, selections, and compiled documents.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::domain::errors::ReadError;

/// A regular file discovered under the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Root-relative path using `/` separators on every platform.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// Set when the inspected commit touched this file.
    pub preselected: bool,
}

impl FileEntry {
    pub fn new(relative_path: impl Into<String>, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            preselected: false,
        }
    }

    /// Lower-cased extension of the file, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.relative_path.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// The subset of candidates chosen for compilation, kept in tree-walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<FileEntry>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keep the candidates for which `include` returns true, preserving their order.
    pub fn from_candidates<F>(candidates: &[FileEntry], mut include: F) -> Self
    where
        F: FnMut(usize, &FileEntry) -> bool,
    {
        let entries = candidates
            .iter()
            .enumerate()
            .filter(|(index, entry)| include(*index, entry))
            .map(|(_, entry)| entry.clone())
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .map(|entry| entry.relative_path.as_str())
            .collect()
    }
}

/// Files touched by a revision plus the diff text for that range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChanges {
    /// Revision expression as supplied by the user.
    pub revision: String,
    /// Full hex id the revision resolved to.
    pub commit_id: String,
    pub changed_paths: BTreeSet<String>,
    /// `None` when the diff was not requested.
    pub diff: Option<String>,
}

impl CommitChanges {
    /// Abbreviated commit id for headers.
    pub fn short_id(&self) -> &str {
        let end = self.commit_id.len().min(12);
        &self.commit_id[..end]
    }
}

/// A single file section of the compiled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSection {
    pub path: String,
    pub language: Option<String>,
    pub contents: String,
}

/// Diff appended after all file sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSection {
    pub revision: String,
    pub short_id: String,
    pub text: String,
}

/// Ordered document ready to be rendered and delivered.
#[derive(Debug, Default)]
pub struct CompiledDocument {
    pub message: Option<String>,
    pub sections: Vec<DocumentSection>,
    pub diff: Option<DiffSection>,
    /// Files that were selected but could not be included.
    pub skipped: Vec<ReadError>,
}

impl CompiledDocument {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.sections.is_empty() && self.diff.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> FileEntry {
        FileEntry::new(path, PathBuf::from("/repo").join(path))
    }

    #[test]
    fn extension_is_lowercased_and_ignores_dotfiles() {
        assert_eq!(entry("src/Main.RS").extension().as_deref(), Some("rs"));
        assert_eq!(entry(".gitignore").extension(), None);
        assert_eq!(entry("Makefile").extension(), None);
        assert_eq!(entry("dir.d/notes").extension(), None);
    }

    #[test]
    fn selection_preserves_candidate_order() {
        let candidates = vec![entry("a.py"), entry("b.py"), entry("c.py")];
        let selection = Selection::from_candidates(&candidates, |index, _| index != 1);
        let paths: Vec<_> = selection
            .entries()
            .iter()
            .map(|entry| entry.relative_path.as_str())
            .collect();
        assert_eq!(paths, ["a.py", "c.py"]);
    }

    #[test]
    fn short_id_truncates_long_ids() {
        let changes = CommitChanges {
            revision: "HEAD~1".into(),
            commit_id: "0123456789abcdef0123".into(),
            changed_paths: BTreeSet::new(),
            diff: None,
        };
        assert_eq!(changes.short_id(), "0123456789ab");
    }
}
