//! Repository tree walking.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use ignore::{DirEntry, WalkBuilder};

use crate::app::ignore::{IgnoreRuleSet, REPOCLIP_IGNORE};
use crate::domain::model::FileEntry;

/// Case-insensitive extension allow-list. An empty filter allows every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    allowed: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build from user input such as `.py`, `py`, or `RS`.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allows(&self, entry: &FileEntry) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        entry
            .extension()
            .is_some_and(|ext| self.allowed.contains(&ext))
    }
}

/// Walks a repository root and yields candidate files.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    rules: Arc<IgnoreRuleSet>,
    extensions: ExtensionFilter,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, rules: IgnoreRuleSet) -> Self {
        Self {
            root: root.into(),
            rules: Arc::new(rules),
            extensions: ExtensionFilter::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    /// Lazily walk the tree depth-first with entries sorted by name in each directory.
    ///
    /// Excluded directories are pruned without being read. Entries that cannot be read are
    /// logged and skipped; the walk itself never fails.
    ///
    /// `.gitignore` and `.repoclipignore` files below the root apply to their own subtree,
    /// on top of the rule set, whether or not the root is a git checkout.
    pub fn walk(&self) -> impl Iterator<Item = FileEntry> + use<> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .git_ignore(true)
            .require_git(false)
            .add_custom_ignore_filename(REPOCLIP_IGNORE)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        builder.filter_entry({
            let rules = self.rules.clone();
            let root = self.root.clone();
            move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !rules.is_excluded(rel, is_dir)
            }
        });

        let root = self.root.clone();
        let extensions = self.extensions.clone();
        builder.build().filter_map(move |result| match result {
            Ok(entry) => to_file_entry(&root, &entry).filter(|file| extensions.allows(file)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
    }
}

fn to_file_entry(root: &Path, entry: &DirEntry) -> Option<FileEntry> {
    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
        return None;
    }
    let path = entry.path();
    let relative = path.strip_prefix(root).ok()?;
    Some(FileEntry::new(to_relative_string(relative), path))
}

/// Join path components with `/` regardless of platform.
fn to_relative_string(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
