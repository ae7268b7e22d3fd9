//! Provenance recording.
//!
//! After materialization the workspace is read back with git2 so the recorded
//! commit hash is always the full resolved head, never the (possibly
//! abbreviated) hash the caller asked for.

use crate::error::{PullError, PullResult};
use crate::mode::PullMode;
use git2::Repository;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// File written into the caller's working tree on every successful run
pub const PROVENANCE_FILE: &str = "pulled_version_info.txt";

/// Resolved facts about what was pulled
#[derive(Debug, Clone)]
pub struct Provenance {
    pub pull_mode: String,
    pub commit_hash: String,
    pub branch: String,
    pub commit_timestamp: String,
    pub commit_message: String,
    pub release_tag: Option<String>,
    pub copied_dirs: Vec<String>,
    pub reproduce: String,
}

impl Provenance {
    /// Read the workspace head and combine it with the mode that produced it.
    ///
    /// `mode` is the concrete mode that was acquired; `mode_label` is what the
    /// run resolved to (it stays `latest_release` when the network lookup
    /// succeeded, even though acquisition then used a release tag).
    pub fn gather(
        workspace: &Path,
        mode: &PullMode,
        mode_label: &str,
        copied_dirs: &[String],
    ) -> PullResult<Provenance> {
        let repo = Repository::open(workspace)?;
        let head = repo.head()?;
        let commit_oid = head.target().ok_or_else(|| {
            PullError::Git {
                operation: "resolve".to_string(),
                reference: "HEAD".to_string(),
                reason: "no head commit in workspace".to_string(),
            }
        })?;
        let commit = repo.find_commit(commit_oid)?;

        let branch = if head.is_branch() {
            head.shorthand().unwrap_or("HEAD").to_string()
        } else {
            // Tag and commit checkouts leave a detached head.
            "HEAD".to_string()
        };

        let commit_timestamp = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let commit_message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let commit_hash = commit_oid.to_string();

        let release_tag = match mode {
            PullMode::Release { tag } => {
                Some(exact_tag(&repo, commit_oid).unwrap_or_else(|| tag.clone()))
            }
            _ => None,
        };

        let reproduce = match (mode, &release_tag) {
            (PullMode::Release { .. }, Some(tag)) => format!("pull {}", tag),
            (PullMode::Branch { name }, _) => format!("pull {}", name),
            (PullMode::Commit { branch, .. }, _) => format!("pull {} {}", branch, commit_hash),
            _ => "pull".to_string(),
        };

        Ok(Provenance {
            pull_mode: mode_label.to_string(),
            commit_hash,
            branch,
            commit_timestamp,
            commit_message,
            release_tag,
            copied_dirs: copied_dirs.to_vec(),
            reproduce,
        })
    }

    /// Key-value rendering of the record
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Pulled version information\n");
        out.push_str(&format!("PULL_MODE={}\n", self.pull_mode));
        out.push_str(&format!("COMMIT_HASH={}\n", self.commit_hash));
        out.push_str(&format!("BRANCH={}\n", self.branch));
        out.push_str(&format!("COMMIT_TIMESTAMP={}\n", self.commit_timestamp));
        out.push_str(&format!("COMMIT_MESSAGE={}\n", self.commit_message));
        if let Some(tag) = &self.release_tag {
            out.push_str(&format!("RELEASE_TAG={}\n", tag));
        }
        out.push_str(&format!("COPIED_DIRS={}\n", self.copied_dirs.join(",")));
        out.push_str(&format!("REPRODUCE={}\n", self.reproduce));
        out
    }

    /// Overwrite the provenance file under `dest_root`
    pub fn write(&self, dest_root: &Path) -> PullResult<()> {
        let path = dest_root.join(PROVENANCE_FILE);
        fs::write(&path, self.render())?;
        info!("Wrote provenance to {}", path.display());
        println!("[INFO] Recorded provenance in {}", PROVENANCE_FILE);
        Ok(())
    }
}

/// Find a tag whose target peels to exactly the given commit.
fn exact_tag(repo: &Repository, commit_oid: git2::Oid) -> Option<String> {
    let names = repo.tag_names(None).ok()?;
    for name in names.iter().flatten() {
        let reference = match repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(r) => r,
            Err(_) => continue,
        };
        if let Ok(commit) = reference.peel_to_commit() {
            if commit.id() == commit_oid {
                debug!("Exact tag match: {}", name);
                return Some(name.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::tempdir;

    fn fixture_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            fs::write(dir.join("README.md"), "fixture").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("README.md")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("Fixture", "fixture@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial import\n\nbody", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_gather_records_full_hash_and_first_message_line() {
        let dir = tempdir().unwrap();
        let repo = fixture_repo(dir.path());
        let head = repo.head().unwrap().target().unwrap();

        let mode = PullMode::Branch {
            name: "main".to_string(),
        };
        let dirs = vec!["projects/ocap".to_string()];
        let provenance = Provenance::gather(dir.path(), &mode, mode.label(), &dirs).unwrap();

        assert_eq!(provenance.commit_hash, head.to_string());
        assert_eq!(provenance.commit_hash.len(), 40);
        assert_eq!(provenance.commit_message, "initial import");
        assert_eq!(provenance.pull_mode, "branch");
        assert!(provenance.release_tag.is_none());
        assert_eq!(provenance.reproduce, "pull main");
        assert!(!provenance.commit_timestamp.is_empty());
    }

    #[test]
    fn test_gather_verifies_exact_tag_over_requested_string() {
        let dir = tempdir().unwrap();
        let repo = fixture_repo(dir.path());
        let head = repo.head().unwrap().peel(git2::ObjectType::Commit).unwrap();
        repo.tag_lightweight("v1.0.0", &head, false).unwrap();

        let mode = PullMode::Release {
            tag: "1.0".to_string(),
        };
        let provenance = Provenance::gather(dir.path(), &mode, mode.label(), &[]).unwrap();

        assert_eq!(provenance.release_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(provenance.reproduce, "pull v1.0.0");
    }

    #[test]
    fn test_gather_falls_back_to_requested_tag_without_exact_match() {
        let dir = tempdir().unwrap();
        fixture_repo(dir.path());

        let mode = PullMode::Release {
            tag: "v2.0.0".to_string(),
        };
        let provenance = Provenance::gather(dir.path(), &mode, mode.label(), &[]).unwrap();

        assert_eq!(provenance.release_tag.as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn test_render_includes_release_tag_only_in_release_modes() {
        let base = Provenance {
            pull_mode: "branch".to_string(),
            commit_hash: format!("{}d", "abc".repeat(13)),
            branch: "develop".to_string(),
            commit_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            commit_message: "tip".to_string(),
            release_tag: None,
            copied_dirs: vec!["projects/ocap".to_string(), "scripts/release".to_string()],
            reproduce: "pull develop".to_string(),
        };

        let rendered = base.render();
        assert!(rendered.contains("PULL_MODE=branch\n"));
        assert!(rendered.contains("BRANCH=develop\n"));
        assert!(rendered.contains("COPIED_DIRS=projects/ocap,scripts/release\n"));
        assert!(rendered.contains("REPRODUCE=pull develop\n"));
        assert!(!rendered.contains("RELEASE_TAG"));

        let with_tag = Provenance {
            pull_mode: "latest_release".to_string(),
            release_tag: Some("v2.0.0".to_string()),
            reproduce: "pull v2.0.0".to_string(),
            ..base
        };
        let rendered = with_tag.render();
        assert!(rendered.contains("PULL_MODE=latest_release\n"));
        assert!(rendered.contains("RELEASE_TAG=v2.0.0\n"));
    }

    #[test]
    fn test_write_overwrites_previous_record() {
        let dest = tempdir().unwrap();
        let record = Provenance {
            pull_mode: "release".to_string(),
            commit_hash: "0".repeat(40),
            branch: "HEAD".to_string(),
            commit_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            commit_message: "release".to_string(),
            release_tag: Some("v1.0.0".to_string()),
            copied_dirs: vec!["projects/ocap".to_string()],
            reproduce: "pull v1.0.0".to_string(),
        };

        fs::write(dest.path().join(PROVENANCE_FILE), "stale contents").unwrap();
        record.write(dest.path()).unwrap();

        let contents = fs::read_to_string(dest.path().join(PROVENANCE_FILE)).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("RELEASE_TAG=v1.0.0"));
    }
}
