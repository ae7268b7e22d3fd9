use crate::config::PullConfig;
use crate::error::{PullError, PullResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// How the upstream content is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullMode {
    /// Exact commit on a branch
    Commit { hash: String, branch: String },
    /// Most recent published release, resolved over the network
    LatestRelease,
    /// Specific release tag
    Release { tag: String },
    /// Tip of a named branch
    Branch { name: String },
}

impl PullMode {
    /// Label recorded in the provenance file
    pub fn label(&self) -> &'static str {
        match self {
            PullMode::Commit { .. } => "commit",
            PullMode::LatestRelease => "latest_release",
            PullMode::Release { .. } => "release",
            PullMode::Branch { .. } => "branch",
        }
    }
}

impl fmt::Display for PullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullMode::Commit { hash, branch } => write!(f, "commit {} on {}", hash, branch),
            PullMode::LatestRelease => write!(f, "latest release"),
            PullMode::Release { tag } => write!(f, "release {}", tag),
            PullMode::Branch { name } => write!(f, "branch {}", name),
        }
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^v?[0-9]+(\.[0-9]+)*(-[0-9A-Za-z.]+)?$").expect("version pattern compiles")
    })
}

fn commit_hash_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-fA-F0-9]{6,40}$").expect("hash pattern compiles"))
}

/// Whether a string is shaped like a release tag (v1.2.3, 2.0, 1.0.0-rc.1)
pub fn looks_like_version(s: &str) -> bool {
    version_pattern().is_match(s)
}

/// Resolve the pull mode from the positional arguments and the configured
/// release fallback. Fails on malformed input before any network or git
/// action is taken.
pub fn resolve(
    version_or_branch: Option<&str>,
    commit_hash: Option<&str>,
    config: &PullConfig,
) -> PullResult<PullMode> {
    if let Some(hash) = commit_hash.filter(|h| !h.is_empty()) {
        if !commit_hash_pattern().is_match(hash) {
            return Err(PullError::InvalidCommitHash {
                hash: hash.to_string(),
            });
        }

        let branch = version_or_branch
            .filter(|v| !v.is_empty())
            .unwrap_or(&config.default_branch)
            .to_string();

        return Ok(PullMode::Commit {
            hash: hash.to_string(),
            branch,
        });
    }

    // The environment fallback substitutes for a missing first argument.
    let selector = version_or_branch
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| config.release_fallback.clone());

    match selector {
        None => Ok(PullMode::LatestRelease),
        Some(s) if s.is_empty() => Err(PullError::EmptyReleaseTag),
        Some(s) if looks_like_version(&s) => Ok(PullMode::Release { tag: s }),
        Some(s) => Ok(PullMode::Branch { name: s }),
    }
}
