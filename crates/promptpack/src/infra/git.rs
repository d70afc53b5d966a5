//! Git integration utilities.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};

/// Source of version-controlled file lists.
pub trait TrackedFileLister {
    /// Whether `path` lies inside a working copy.
    fn is_working_copy(&self, path: &Path) -> bool;

    /// Tracked files under `root`, relative to `root`.
    fn list_tracked(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Branch and commit of the working copy containing `path`, when known.
    fn metadata(&self, _path: &Path) -> Option<GitMetadata> {
        None
    }
}

/// Discovers repositories with `gix` and lists the index with `git ls-files`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl TrackedFileLister for GitCli {
    fn is_working_copy(&self, path: &Path) -> bool {
        GitClient::discover(path).is_some_and(|client| client.work_dir().is_some())
    }

    fn list_tracked(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new("git")
            .args(["ls-files", "-z", "--", "."])
            .current_dir(root)
            .output()
            .context("failed to run git ls-files")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git ls-files exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(parse_ls_files(&output.stdout))
    }

    fn metadata(&self, path: &Path) -> Option<GitMetadata> {
        metadata_for_path(path)
    }
}

fn parse_ls_files(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|byte| *byte == 0)
        .filter(|entry| !entry.is_empty())
        .map(path_from_bytes)
        .collect()
}

/// Git stores raw path bytes; keep them intact where the platform allows it.
#[cfg(unix)]
fn path_from_bytes(entry: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(entry))
}

#[cfg(not(unix))]
fn path_from_bytes(entry: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(entry).into_owned())
}

/// Lightweight wrapper around [`gix::Repository`] discovery for metadata extraction.
pub struct GitClient {
    repo: gix::Repository,
}

impl GitClient {
    /// Attempt to locate a git repository starting from `path`.
    pub fn discover(path: impl AsRef<Path>) -> Option<Self> {
        match gix::discover(path.as_ref()) {
            Ok(repo) => Some(Self { repo }),
            Err(err) => {
                tracing::debug!(path = %path.as_ref().display(), error = %err, "no git repository");
                None
            }
        }
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.repo.work_dir()
    }

    /// Retrieve repository metadata.
    pub fn metadata(&self) -> Option<GitMetadata> {
        // Bare repositories have nothing to summarize.
        self.work_dir()?;

        let branch = self
            .repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| {
                let name = name.to_string();
                name.strip_prefix("refs/heads/")
                    .map(str::to_owned)
                    .unwrap_or(name)
            });

        let commit = self.repo.head_id().ok().map(|id| id.detach().to_string());

        Some(GitMetadata { branch, commit })
    }
}

/// Basic information about the repository shown in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMetadata {
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl GitMetadata {
    pub fn short_commit(&self) -> Option<&str> {
        self.commit.as_deref().map(|commit| &commit[..commit.len().min(8)])
    }
}

/// Convenience helper to retrieve metadata directly from a path.
pub fn metadata_for_path(path: &Path) -> Option<GitMetadata> {
    GitClient::discover(path).and_then(|client| client.metadata())
}
