//! Copying target directories from the workspace into the caller's tree.

use crate::error::{PullError, PullResult};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Check that every target directory exists in the acquired workspace.
///
/// Runs before any copying so a bad checkout never leaves the caller's tree
/// half-replaced.
pub fn verify_targets(workspace: &Path, dirs: &[String]) -> PullResult<()> {
    for dir in dirs {
        if !workspace.join(dir).is_dir() {
            return Err(PullError::MissingTarget { dir: dir.clone() });
        }
    }
    Ok(())
}

/// Replace the target directories under `dest_root` with the workspace copies.
pub fn materialize(workspace: &Path, dest_root: &Path, dirs: &[String]) -> PullResult<()> {
    for dir in dirs {
        let source = workspace.join(dir);
        let dest = dest_root.join(dir);

        if dest.exists() {
            warn!("Replacing existing directory {}", dest.display());
            println!("[WARN] Removing existing directory: {}", dest.display());
            fs::remove_dir_all(&dest)?;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        println!("[INFO] Copying {}", dir);
        copy_dir_recursive(&source, &dest)?;
        info!("Copied {} -> {}", source.display(), dest.display());
    }

    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
