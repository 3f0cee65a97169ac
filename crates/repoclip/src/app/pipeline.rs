//! End-to-end run: walk, inspect, select, compile, render, deliver.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::commit::{CommitInspector, mark_preselected};
use crate::app::compile::Compiler;
use crate::app::export::Exporter;
use crate::app::ignore::IgnoreRuleSet;
use crate::app::selection::{DefaultInclusion, SelectionOutcome, Selector};
use crate::app::tokens::{self, TokenEstimate};
use crate::app::walk::{ExtensionFilter, TreeWalker};
use crate::domain::errors::PathError;
use crate::domain::model::{CommitChanges, FileEntry};
use crate::infra::clipboard::ClipboardSink;
use crate::infra::config::{Config, Ignore};

/// Where the rendered document should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Clipboard,
    Stdout,
}

/// Fully resolved settings for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: PathBuf,
    pub commit: Option<String>,
    pub include_diff: bool,
    /// Fail instead of degrading when the commit cannot be inspected.
    pub require_commit: bool,
    pub extensions: Vec<String>,
    pub excluded_dirs: Vec<String>,
    pub ignore: Ignore,
    pub message: Option<String>,
    pub template: String,
    pub max_file_bytes: u64,
    pub output: Option<PathBuf>,
    pub delivery: Delivery,
}

impl RunOptions {
    /// Options for `root` seeded from a loaded configuration.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            commit: None,
            include_diff: config.export.include_diff(),
            require_commit: false,
            extensions: config.defaults.extensions().to_vec(),
            excluded_dirs: Vec::new(),
            ignore: config.ignore.clone(),
            message: None,
            template: config.export.template(),
            max_file_bytes: config.defaults.max_file_bytes(),
            output: None,
            delivery: Delivery::Clipboard,
        }
    }
}

/// Where the document ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Clipboard,
    Stdout,
    /// The clipboard refused the document and it was printed instead.
    StdoutFallback,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Destination::Clipboard => "clipboard",
            Destination::Stdout => "stdout",
            Destination::StdoutFallback => "stdout (clipboard unavailable)",
        };
        f.write_str(label)
    }
}

/// Summary of a delivered document.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub candidates: usize,
    pub files: usize,
    pub skipped: usize,
    pub tokens: TokenEstimate,
    pub destination: Destination,
    pub output: Option<PathBuf>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Delivered(RunReport),
    /// The selection was cancelled; nothing was written anywhere.
    Cancelled,
}

/// Wires the run together over swappable selection, clipboard and stdout seams.
pub struct Pipeline<'a> {
    selector: &'a mut dyn Selector,
    clipboard: &'a mut dyn ClipboardSink,
    stdout: &'a mut dyn Write,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        selector: &'a mut dyn Selector,
        clipboard: &'a mut dyn ClipboardSink,
        stdout: &'a mut dyn Write,
    ) -> Self {
        Self {
            selector,
            clipboard,
            stdout,
        }
    }

    pub fn run(&mut self, options: &RunOptions) -> Result<RunOutcome> {
        let root = resolve_root(&options.root)?;
        let rules = IgnoreRuleSet::load(&root, &options.ignore, &options.excluded_dirs)
            .context("failed to build ignore rules")?;
        tracing::debug!(root = %root.display(), rules = rules.len(), "walking repository");

        let mut candidates: Vec<FileEntry> = TreeWalker::new(&root, rules)
            .with_extensions(ExtensionFilter::new(&options.extensions))
            .walk()
            .collect();
        tracing::debug!(candidates = candidates.len(), "collected candidates");

        let changes = self.inspect_commit(&root, options, &mut candidates)?;

        let defaults = DefaultInclusion::for_run(changes.is_some());
        let selection = match self.selector.select(&candidates, defaults)? {
            SelectionOutcome::Confirmed(selection) => selection,
            SelectionOutcome::Cancelled => {
                tracing::info!("selection cancelled; nothing copied");
                return Ok(RunOutcome::Cancelled);
            }
        };

        let document = Compiler::new()
            .with_max_file_bytes(options.max_file_bytes)
            .compile(&selection, changes.as_ref(), options.message.as_deref());
        let text = Exporter::new()?
            .with_template_dir(&options.root)
            .render(&document, &options.template)
            .with_context(|| format!("failed to render document with '{}'", options.template))?;

        if let Some(path) = &options.output {
            fs::write(path, &text)
                .with_context(|| format!("failed to write document to {}", path.display()))?;
        }

        let destination = self.deliver(&text, options.delivery)?;
        let report = RunReport {
            candidates: candidates.len(),
            files: document.sections.len(),
            skipped: document.skipped.len(),
            tokens: tokens::estimate(&text),
            destination,
            output: options.output.clone(),
            text,
        };
        tracing::info!(
            files = report.files,
            skipped = report.skipped,
            tokens = report.tokens.tokens,
            method = ?report.tokens.method,
            destination = %report.destination,
            "document ready"
        );
        Ok(RunOutcome::Delivered(report))
    }

    fn inspect_commit(
        &self,
        root: &Path,
        options: &RunOptions,
        candidates: &mut [FileEntry],
    ) -> Result<Option<CommitChanges>> {
        let Some(revision) = options.commit.as_deref() else {
            return Ok(None);
        };

        let inspector = CommitInspector::new(root).with_diff(options.include_diff);
        match inspector.inspect(revision) {
            Ok(changes) => {
                let marked = mark_preselected(candidates, &changes);
                tracing::debug!(
                    revision,
                    changed = changes.changed_paths.len(),
                    preselected = marked,
                    "inspected commit"
                );
                Ok(Some(changes))
            }
            Err(err) if options.require_commit => {
                Err(err).with_context(|| format!("cannot inspect commit '{revision}'"))
            }
            Err(err) => {
                tracing::warn!(
                    revision,
                    error = %err,
                    "continuing without commit preselection or diff"
                );
                Ok(None)
            }
        }
    }

    fn deliver(&mut self, text: &str, delivery: Delivery) -> Result<Destination> {
        match delivery {
            Delivery::Stdout => {
                self.print(text)?;
                Ok(Destination::Stdout)
            }
            Delivery::Clipboard => match self.clipboard.copy(text) {
                Ok(()) => Ok(Destination::Clipboard),
                Err(err) => {
                    tracing::warn!(error = %err, "printing document to stdout instead");
                    self.print(text)?;
                    Ok(Destination::StdoutFallback)
                }
            },
        }
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()
    }
}

/// Check that `path` is a readable directory and return its canonical form.
pub fn resolve_root(path: &Path) -> Result<PathBuf, PathError> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PathError::Missing {
            path: path.to_path_buf(),
        },
        _ => PathError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if !metadata.is_dir() {
        return Err(PathError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |source| PathError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    fs::read_dir(path).map_err(unreadable)?;
    path.canonicalize().map_err(unreadable)
}
