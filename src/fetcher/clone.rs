//! Clone backends

use crate::fetcher::error::CloneError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::process::Command;

/// Result of a successful clone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStatus {
    Cloned,
    /// The destination already held a checkout and was left untouched
    AlreadyExists,
}

/// Materializes a remote repository at a local path
#[async_trait]
pub trait Cloner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus, CloneError>;
}

/// Which [`Cloner`] implementation to use
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CloneBackend {
    /// Run the `git` executable
    #[default]
    Git,
    /// Clone in-process
    Gix,
}

impl CloneBackend {
    pub fn build(self) -> Arc<dyn Cloner> {
        match self {
            CloneBackend::Git => Arc::new(GitCommandCloner::default()),
            CloneBackend::Gix => Arc::new(GixCloner),
        }
    }
}

fn has_checkout(dest: &Path) -> bool {
    dest.join(".git").exists()
}

/// A destination that already holds files, checkout or not
fn is_occupied(dest: &Path) -> bool {
    std::fs::read_dir(dest).is_ok_and(|mut entries| entries.next().is_some())
}

/// Clones by running `git clone -- <url> <dest>` directly, without a shell
#[derive(Debug, Clone)]
pub struct GitCommandCloner {
    program: PathBuf,
}

impl GitCommandCloner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCommandCloner {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl Cloner for GitCommandCloner {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus, CloneError> {
        if has_checkout(dest) {
            return Ok(CloneStatus::AlreadyExists);
        }

        let output = Command::new(&self.program)
            .arg("clone")
            .arg("--quiet")
            .arg("--")
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|source| CloneError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(CloneStatus::Cloned);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("already exists") {
            return Ok(CloneStatus::AlreadyExists);
        }

        Err(CloneError::Command {
            status: output.status.to_string(),
            stderr,
        })
    }
}

/// Clones in-process with gix on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct GixCloner;

fn gix_error(e: impl std::fmt::Display) -> CloneError {
    CloneError::Gix {
        message: e.to_string(),
    }
}

fn clone_with_gix(url: &str, dest: &Path) -> Result<CloneStatus, CloneError> {
    let interrupt = AtomicBool::new(false);

    let mut prepare = gix::prepare_clone(url, dest).map_err(gix_error)?;
    let (mut checkout, _) = prepare
        .fetch_then_checkout(gix::progress::Discard, &interrupt)
        .map_err(gix_error)?;
    let (repo, _) = checkout
        .main_worktree(gix::progress::Discard, &interrupt)
        .map_err(gix_error)?;

    log::debug!("checked out {} at {}", url, repo.path().display());
    Ok(CloneStatus::Cloned)
}

#[async_trait]
impl Cloner for GixCloner {
    fn name(&self) -> &'static str {
        "gix"
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus, CloneError> {
        // Same outcome git reports for a non-empty destination
        if has_checkout(dest) || is_occupied(dest) {
            return Ok(CloneStatus::AlreadyExists);
        }

        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || clone_with_gix(&url, &dest))
            .await
            .map_err(|e| CloneError::Task {
                message: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_checkout_is_left_alone() {
        let staging = TempDir::new().unwrap();
        let dest = staging.path().join("repo");
        std::fs::create_dir_all(dest.join(".git")).unwrap();

        // Never reaches the program, so a bogus one is fine
        let cloner = GitCommandCloner::new("/nonexistent/git");
        let status = cloner
            .clone_repo("https://github.com/x/repo", &dest)
            .await
            .unwrap();
        assert_eq!(status, CloneStatus::AlreadyExists);

        let status = GixCloner
            .clone_repo("https://github.com/x/repo", &dest)
            .await
            .unwrap();
        assert_eq!(status, CloneStatus::AlreadyExists);
    }

    #[tokio::test]
    async fn test_gix_treats_non_empty_destination_as_existing() {
        let staging = TempDir::new().unwrap();
        let dest = staging.path().join("repo");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("README.md"), "leftover").unwrap();

        let status = GixCloner
            .clone_repo("https://github.com/x/repo", &dest)
            .await
            .unwrap();
        assert_eq!(status, CloneStatus::AlreadyExists);
        assert!(!dest.join(".git").exists());
    }

    #[test]
    fn test_empty_or_missing_destination_is_free() {
        let staging = TempDir::new().unwrap();
        assert!(!is_occupied(&staging.path().join("missing")));
        assert!(!is_occupied(staging.path()));
    }

    #[tokio::test]
    async fn test_missing_git_program_is_spawn_error() {
        let staging = TempDir::new().unwrap();
        let cloner = GitCommandCloner::new("/nonexistent/git");

        let result = cloner
            .clone_repo("https://github.com/x/repo", &staging.path().join("repo"))
            .await;
        match result {
            Err(CloneError::Spawn { program, .. }) => assert_eq!(program, "/nonexistent/git"),
            other => panic!("Expected Spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(CloneBackend::from_str("gix").unwrap(), CloneBackend::Gix);
        assert_eq!(
            CloneBackend::from_str("svn"),
            Err(strum::ParseError::VariantNotFound)
        );
        assert_eq!(CloneBackend::default().build().name(), "git");
        assert_eq!(CloneBackend::Gix.build().name(), "gix");
    }
}
