//! Git integration utilities.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::errors::RevisionError;

/// Lightweight wrapper around [`gix::Repository`] discovery for revision resolution.
pub struct GitClient {
    repo: gix::Repository,
}

impl GitClient {
    /// Locate the git repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, RevisionError> {
        let path = path.as_ref();
        let repo = gix::discover(path).map_err(|err| {
            tracing::debug!(path = %path.display(), error = %err, "git discovery failed");
            RevisionError::NotARepository {
                path: path.to_path_buf(),
            }
        })?;
        Ok(Self { repo })
    }

    /// Resolve a revision expression (`HEAD~1`, a branch, an abbreviated hash) to the full id
    /// of the commit it names.
    pub fn resolve_commit(&self, revision: &str) -> Result<String, RevisionError> {
        let spec = format!("{revision}^{{commit}}");
        let id = self
            .repo
            .rev_parse_single(spec.as_str())
            .map_err(|err| RevisionError::Unresolved {
                revision: revision.to_owned(),
                message: err.to_string(),
            })?;
        Ok(id.detach().to_string())
    }

    /// Working tree root, when the repository has one.
    pub fn work_dir(&self) -> Option<PathBuf> {
        self.repo.work_dir().map(Path::to_path_buf)
    }
}

/// Runs the `git` executable inside a directory. Paths it reports are relative to that
/// directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Paths changed between `commit` and the working tree, limited to the working directory.
    pub fn changed_paths(&self, commit: &str) -> Result<BTreeSet<String>, RevisionError> {
        let output = self.run(&[
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--relative",
            "--name-only",
            "-z",
            commit,
            "--",
        ])?;
        Ok(output
            .split(|&b| b == 0)
            .filter_map(parse_path_chunk)
            .collect())
    }

    /// Unified diff between `commit` and the working tree.
    pub fn diff(&self, commit: &str) -> Result<String, RevisionError> {
        let output = self.run(&[
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--relative",
            commit,
            "--",
        ])?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, RevisionError> {
        let command = args.join(" ");
        tracing::debug!(command = %command, workdir = %self.workdir.display(), "running git");
        let output = Command::new("git")
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(RevisionError::GitUnavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RevisionError::GitFailed { command, stderr });
        }
        Ok(output.stdout)
    }
}

fn parse_path_chunk(chunk: &[u8]) -> Option<String> {
    if chunk.is_empty() {
        return None;
    }
    let path = String::from_utf8_lossy(chunk).trim().to_string();
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nul_separated_paths() {
        let output = b"src/a.rs\0docs/read me.md\0\0";
        let paths: Vec<_> = output
            .split(|&b| b == 0)
            .filter_map(parse_path_chunk)
            .collect();
        assert_eq!(paths, vec!["src/a.rs", "docs/read me.md"]);
    }

    #[test]
    fn discover_outside_repository_is_an_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let inner = temp.path().join("not-a-repo");
        std::fs::create_dir_all(&inner)?;
        // Only meaningful when the temp dir itself is not inside a checkout.
        if gix::discover(temp.path()).is_ok() {
            return Ok(());
        }
        assert!(matches!(
            GitClient::discover(&inner),
            Err(RevisionError::NotARepository { .. })
        ));
        Ok(())
    }
}
