//! Temporary git workspace acquisition.
//!
//! Each run clones the upstream repository into a fresh timestamp- and
//! pid-qualified directory under the system temp dir. The workspace removes
//! itself on drop, on success and failure paths alike, unless preservation
//! was requested.

use crate::config::PullConfig;
use crate::error::{PullError, PullResult};
use crate::mode::PullMode;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Handle for an acquired temporary workspace
#[derive(Debug)]
pub struct TempWorkspace {
    path: PathBuf,
    keep: bool,
}

impl TempWorkspace {
    /// Allocate a unique workspace path. Nothing is created on disk until the
    /// clone runs.
    pub fn new(keep: bool) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!(
            "ocap-pull-{}-{}",
            timestamp,
            std::process::id()
        ));

        Self { path, keep }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone and check out the upstream content for the given mode.
    ///
    /// `mode` must already be concrete: latest-release resolution happens
    /// before acquisition, so `LatestRelease` never reaches this point.
    pub fn acquire(config: &PullConfig, mode: &PullMode) -> PullResult<TempWorkspace> {
        let workspace = TempWorkspace::new(config.keep_temp);

        match mode {
            PullMode::Branch { name } => {
                println!("[INFO] Shallow-cloning branch '{}'", name);
                workspace.clone_shallow(&config.remote_url, name)?;
            }
            PullMode::Release { tag } => {
                println!("[INFO] Cloning repository for release '{}'", tag);
                workspace.clone_full(&config.remote_url)?;
                println!("[INFO] Checking out tag '{}'", tag);
                workspace.checkout(tag)?;
            }
            PullMode::Commit { hash, branch } => {
                println!("[INFO] Cloning repository for commit '{}'", hash);
                workspace.clone_full(&config.remote_url)?;
                if branch != &config.default_branch {
                    println!("[INFO] Checking out branch '{}'", branch);
                    workspace.checkout(branch)?;
                }
                println!("[INFO] Checking out commit '{}'", hash);
                workspace.checkout(hash)?;
            }
            PullMode::LatestRelease => {
                return Err(PullError::ReleaseLookup {
                    reason: "latest release was not resolved before acquisition".to_string(),
                });
            }
        }

        Ok(workspace)
    }

    fn clone_full(&self, url: &str) -> PullResult<()> {
        let target = self.path.to_string_lossy();
        self.run_git(None, &["clone", url, target.as_ref()], "clone", url)
    }

    fn clone_shallow(&self, url: &str, branch: &str) -> PullResult<()> {
        let target = self.path.to_string_lossy();
        self.run_git(
            None,
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                branch,
                url,
                target.as_ref(),
            ],
            "clone",
            branch,
        )
    }

    fn checkout(&self, reference: &str) -> PullResult<()> {
        self.run_git(
            Some(self.path.as_path()),
            &["checkout", reference],
            "checkout",
            reference,
        )
    }

    fn run_git(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        operation: &str,
        reference: &str,
    ) -> PullResult<()> {
        debug!("Running: git {}", args.join(" "));

        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| PullError::Git {
            operation: operation.to_string(),
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(PullError::Git {
                operation: operation.to_string(),
                reference: reference.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }

        if self.keep {
            println!(
                "[INFO] Keeping temporary workspace: {}",
                self.path.display()
            );
            return;
        }

        // Git writes object files read-only; relax permissions before removal.
        if let Err(e) = relax_permissions(&self.path) {
            debug!("Permission relax failed for {}: {}", self.path.display(), e);
        }

        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("Could not remove temporary workspace: {}", e);
            println!(
                "[WARN] Could not remove temporary workspace {}: {}. Remove it manually with: rm -rf {}",
                self.path.display(),
                e,
                self.path.display()
            );
        } else {
            info!("Removed temporary workspace {}", self.path.display());
        }
    }
}

fn relax_permissions(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }

    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }

    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            relax_permissions(&entry?.path())?;
        }
    }

    Ok(())
}
