//! Builds the compiled document from a selection and an optional commit diff.

use std::fs;

use crate::domain::errors::ReadError;
use crate::domain::model::{
    CommitChanges, CompiledDocument, DiffSection, DocumentSection, FileEntry, Selection,
};

/// Reads selected files and assembles them, in selection order, into a document.
#[derive(Debug, Clone)]
pub struct Compiler {
    max_file_bytes: u64,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files above `bytes` are skipped. Zero disables the limit.
    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn compile(
        &self,
        selection: &Selection,
        changes: Option<&CommitChanges>,
        message: Option<&str>,
    ) -> CompiledDocument {
        let mut document = CompiledDocument {
            message: message
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            ..CompiledDocument::default()
        };

        for entry in selection.entries() {
            match self.read_section(entry) {
                Ok(section) => document.sections.push(section),
                Err(err) => {
                    tracing::warn!(path = %entry.relative_path, error = %err, "skipping file");
                    document.skipped.push(err);
                }
            }
        }

        document.diff = changes.and_then(diff_section);
        document
    }

    fn read_section(&self, entry: &FileEntry) -> Result<DocumentSection, ReadError> {
        let path = entry.relative_path.clone();
        let io_error = |source| ReadError::Io {
            path: path.clone(),
            source,
        };

        let metadata = fs::metadata(&entry.absolute_path).map_err(io_error)?;
        if self.max_file_bytes > 0 && metadata.len() > self.max_file_bytes {
            return Err(ReadError::TooLarge {
                path,
                size: metadata.len(),
                limit: self.max_file_bytes,
            });
        }

        let bytes = fs::read(&entry.absolute_path).map_err(io_error)?;
        if bytes.contains(&0) {
            return Err(ReadError::Binary { path });
        }
        let text = String::from_utf8(bytes).map_err(|_| ReadError::Binary { path: path.clone() })?;

        Ok(DocumentSection {
            language: entry.extension(),
            contents: text,
            path,
        })
    }
}

fn diff_section(changes: &CommitChanges) -> Option<DiffSection> {
    let text = changes.diff.as_deref()?.trim_end_matches(['\r', '\n']);
    if text.trim().is_empty() {
        return None;
    }
    Some(DiffSection {
        revision: changes.revision.clone(),
        short_id: changes.short_id().to_owned(),
        text: text.to_owned(),
    })
}
