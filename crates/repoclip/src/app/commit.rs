//! Commit inspection: files touched since a revision and the matching diff.

use std::path::PathBuf;

use crate::domain::errors::RevisionError;
use crate::domain::model::{CommitChanges, FileEntry};
use crate::infra::git::{GitCli, GitClient};

/// Inspects a revision relative to the working tree of a repository root.
#[derive(Debug, Clone)]
pub struct CommitInspector {
    root: PathBuf,
    include_diff: bool,
}

impl CommitInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_diff: true,
        }
    }

    /// Whether the diff text should be collected alongside the changed paths.
    pub fn with_diff(mut self, include_diff: bool) -> Self {
        self.include_diff = include_diff;
        self
    }

    /// Resolve `revision` and collect the changes between it and the working tree.
    pub fn inspect(&self, revision: &str) -> Result<CommitChanges, RevisionError> {
        let revision = revision.trim();
        if revision.is_empty() || revision.starts_with('-') {
            return Err(RevisionError::Invalid(revision.to_owned()));
        }

        let client = GitClient::discover(&self.root)?;
        let commit_id = client.resolve_commit(revision)?;
        tracing::debug!(
            revision,
            commit = %commit_id,
            repo = ?client.work_dir(),
            "resolved revision"
        );

        let cli = GitCli::new(&self.root);
        let changed_paths = cli.changed_paths(&commit_id)?;

        let diff = if self.include_diff {
            let text = cli.diff(&commit_id)?;
            if text.trim().is_empty() {
                tracing::warn!(revision, "diff against revision is empty; no diff section will be added");
            }
            Some(text)
        } else {
            None
        };

        Ok(CommitChanges {
            revision: revision.to_owned(),
            commit_id,
            changed_paths,
            diff,
        })
    }
}

/// Flag candidates touched by `changes`. Returns how many were marked.
pub fn mark_preselected(candidates: &mut [FileEntry], changes: &CommitChanges) -> usize {
    let mut marked = 0;
    for entry in candidates.iter_mut() {
        entry.preselected = changes.changed_paths.contains(&entry.relative_path);
        if entry.preselected {
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
pub(crate) mod test_repo {
    use std::fs;
    use std::path::Path;
    use std::process::Command;

    pub fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    pub fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.name=Repoclip Tests",
                "-c",
                "user.email=tests@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    }

    /// Two commits: the first adds `a.py` and `x.py`, the second edits `x.py`.
    pub fn two_commit_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        fs::write(dir.join("a.py"), "print('a')\n").expect("write a.py");
        fs::write(dir.join("x.py"), "value = 1\n").expect("write x.py");
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "initial"]);
        fs::write(dir.join("x.py"), "value = 2\n").expect("rewrite x.py");
        git(dir, &["commit", "-q", "-am", "bump value"]);
    }
}

#[cfg(test)]
mod tests {
    use super::test_repo::{git_available, two_commit_repo};
    use super::*;

    use std::collections::BTreeSet;

    use anyhow::Result;

    #[test]
    fn previous_commit_lists_touched_files_and_diff() -> Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        two_commit_repo(temp.path());

        let changes = CommitInspector::new(temp.path()).inspect("HEAD~1")?;

        assert_eq!(changes.revision, "HEAD~1");
        assert_eq!(changes.commit_id.len(), 40);
        assert_eq!(
            changes.changed_paths,
            BTreeSet::from(["x.py".to_string()])
        );
        let diff = changes.diff.expect("diff requested");
        assert!(diff.contains("diff --git a/x.py b/x.py"));
        assert!(diff.contains("+value = 2"));
        Ok(())
    }

    #[test]
    fn diff_can_be_suppressed() -> Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        two_commit_repo(temp.path());

        let changes = CommitInspector::new(temp.path())
            .with_diff(false)
            .inspect("HEAD~1")?;
        assert!(changes.diff.is_none());
        assert!(changes.changed_paths.contains("x.py"));
        Ok(())
    }

    #[test]
    fn unknown_revision_is_a_revision_error() -> Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        two_commit_repo(temp.path());

        let err = CommitInspector::new(temp.path())
            .inspect("no-such-branch")
            .expect_err("revision should not resolve");
        assert!(matches!(err, RevisionError::Unresolved { .. }));
        Ok(())
    }

    #[test]
    fn option_like_revisions_are_rejected() {
        let err = CommitInspector::new("/tmp")
            .inspect("--output=/etc/passwd")
            .expect_err("rejected");
        assert!(matches!(err, RevisionError::Invalid(_)));
    }

    #[test]
    fn mark_preselected_flags_matching_entries() {
        let mut candidates = vec![
            FileEntry::new("a.py", "/r/a.py"),
            FileEntry::new("x.py", "/r/x.py"),
        ];
        let changes = CommitChanges {
            revision: "HEAD~1".into(),
            commit_id: "f".repeat(40),
            changed_paths: BTreeSet::from(["x.py".to_string(), "deleted.py".to_string()]),
            diff: None,
        };

        assert_eq!(mark_preselected(&mut candidates, &changes), 1);
        assert!(!candidates[0].preselected);
        assert!(candidates[1].preselected);
    }
}
