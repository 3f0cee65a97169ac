//! Gitignore-style rule sets deciding which repository paths are excluded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::infra::config::Ignore;

pub const REPOCLIP_IGNORE: &str = ".repoclipignore";
const GITIGNORE: &str = ".gitignore";
const CONFIG_DIR: &str = ".repoclip";

/// Ordered gitignore rules built once per run. Later rules override earlier ones, so a
/// `!pattern` re-includes paths excluded by a broader pattern above it.
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    matcher: Gitignore,
}

impl IgnoreRuleSet {
    /// Start an empty rule set rooted at `root`.
    pub fn builder(root: impl AsRef<Path>) -> IgnoreRuleSetBuilder {
        IgnoreRuleSetBuilder::new(root.as_ref())
    }

    /// Rules for a repository: built-ins, configured patterns, `.git/info/exclude`, the root
    /// `.gitignore` and `.repoclipignore`, then extra excluded directory names.
    pub fn load(root: &Path, config: &Ignore, excluded_dirs: &[String]) -> Result<Self> {
        let mut builder = Self::builder(root);
        builder.add_line(".git");
        builder.add_line(&format!("/{REPOCLIP_IGNORE}"));
        builder.add_line(&format!("/{CONFIG_DIR}/"));

        for dir in &config.paths {
            builder.add_directory(dir);
        }
        for glob in &config.globs {
            builder.add_line(glob);
        }

        builder.add_file(&root.join(".git").join("info").join("exclude"));
        builder.add_file(&root.join(GITIGNORE));
        builder.add_file(&root.join(REPOCLIP_IGNORE));

        for dir in excluded_dirs {
            builder.add_directory(dir);
        }

        builder.build()
    }

    /// Whether `relative` (a root-relative path) or any of its parent directories is excluded.
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        if relative.as_os_str().is_empty() || relative.has_root() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }

    /// Number of patterns in the set, including negations.
    pub fn len(&self) -> usize {
        self.matcher.num_ignores() as usize + self.matcher.num_whitelists() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}

/// Accumulates patterns in evaluation order.
pub struct IgnoreRuleSetBuilder {
    inner: GitignoreBuilder,
}

impl IgnoreRuleSetBuilder {
    fn new(root: &Path) -> Self {
        Self {
            inner: GitignoreBuilder::new(root),
        }
    }

    /// Add one gitignore line. Blank lines and comments are accepted and ignored; invalid
    /// globs are skipped with a warning, as git does.
    pub fn add_line(&mut self, line: &str) -> &mut Self {
        self.add_sourced_line(None, line)
    }

    /// Exclude a directory name wherever it appears (or only at the root when it starts
    /// with `/`).
    pub fn add_directory(&mut self, raw: &str) -> &mut Self {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return self;
        }
        self.add_line(&format!("{trimmed}/"))
    }

    /// Add every line from an ignore file. A missing file contributes no rules.
    pub fn add_file(&mut self, path: &Path) -> &mut Self {
        if !path.is_file() {
            return self;
        }
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignore file unreadable, skipping");
                return self;
            }
        };
        tracing::debug!(path = %path.display(), "loading ignore rules");
        for line in contents.lines() {
            self.add_sourced_line(Some(path.to_path_buf()), line);
        }
        self
    }

    fn add_sourced_line(&mut self, source: Option<PathBuf>, line: &str) -> &mut Self {
        if let Err(err) = self.inner.add_line(source, line) {
            tracing::warn!(pattern = line, error = %err, "invalid ignore pattern");
        }
        self
    }

    pub fn build(&self) -> Result<IgnoreRuleSet> {
        let matcher = self
            .inner
            .build()
            .context("failed to build ignore matcher")?;
        Ok(IgnoreRuleSet { matcher })
    }
}
