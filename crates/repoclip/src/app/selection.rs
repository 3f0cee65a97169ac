//! Choosing which candidate files make it into the document.

use anyhow::Result;

use crate::domain::model::{FileEntry, Selection};

/// Which candidates start out included before the user toggles anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultInclusion {
    /// Every candidate is included.
    All,
    /// Only files touched by the inspected commit are included.
    PreselectedOnly,
}

impl DefaultInclusion {
    /// `PreselectedOnly` once a commit has been inspected, `All` otherwise.
    pub fn for_run(commit_inspected: bool) -> Self {
        if commit_inspected {
            DefaultInclusion::PreselectedOnly
        } else {
            DefaultInclusion::All
        }
    }

    pub fn includes(&self, entry: &FileEntry) -> bool {
        match self {
            DefaultInclusion::All => true,
            DefaultInclusion::PreselectedOnly => entry.preselected,
        }
    }
}

/// Result of a selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Confirmed(Selection),
    /// The user backed out; nothing should be delivered.
    Cancelled,
}

/// Turns the candidate list into the final selection.
///
/// Implementations must return entries in candidate order and must treat an empty
/// candidate list as an empty, confirmed selection.
pub trait Selector {
    fn select(
        &mut self,
        candidates: &[FileEntry],
        defaults: DefaultInclusion,
    ) -> Result<SelectionOutcome>;
}

/// Accepts the default inclusion without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptDefaults;

impl Selector for AcceptDefaults {
    fn select(
        &mut self,
        candidates: &[FileEntry],
        defaults: DefaultInclusion,
    ) -> Result<SelectionOutcome> {
        let selection = Selection::from_candidates(candidates, |_, entry| defaults.includes(entry));
        Ok(SelectionOutcome::Confirmed(selection))
    }
}
