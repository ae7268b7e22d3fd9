use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that preserves the temporary workspace for inspection.
pub const KEEP_TEMP_ENV: &str = "KEEP_TEMP";

/// Environment variable holding a fallback release selector when no
/// positional version/branch argument is supplied.
pub const RELEASE_VERSION_ENV: &str = "RELEASE_VERSION";

/// Configuration for a pull run
#[derive(Debug, Clone)]
pub struct PullConfig {
    /// Clone URL of the upstream repository
    pub remote_url: String,
    /// "Latest release" endpoint of the hosting service
    pub releases_api_url: String,
    /// Default branch of the upstream repository
    pub default_branch: String,
    /// Subdirectories copied from the workspace into the working tree
    pub target_dirs: Vec<String>,
    /// Directory the targets and the provenance file are written into
    pub dest_root: PathBuf,
    /// Timeout for the release lookup
    pub http_timeout: Duration,
    /// Skip temporary-workspace deletion
    pub keep_temp: bool,
    /// Fallback release selector (`RELEASE_VERSION`)
    pub release_fallback: Option<String>,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            remote_url: "https://github.com/unicitynetwork/ocap.git".to_string(),
            releases_api_url: "https://api.github.com/repos/unicitynetwork/ocap/releases/latest"
                .to_string(),
            default_branch: "main".to_string(),
            target_dirs: vec!["projects/ocap".to_string(), "scripts/release".to_string()],
            dest_root: PathBuf::from("."),
            http_timeout: Duration::from_secs(10),
            keep_temp: false,
            release_fallback: None,
        }
    }
}

impl PullConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from defaults plus the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.keep_temp = std::env::var(KEEP_TEMP_ENV).map(|v| v == "1").unwrap_or(false);
        config.release_fallback = std::env::var(RELEASE_VERSION_ENV)
            .ok()
            .filter(|v| !v.is_empty());
        config
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    pub fn with_releases_api_url(mut self, url: impl Into<String>) -> Self {
        self.releases_api_url = url.into();
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_target_dirs(mut self, dirs: Vec<String>) -> Self {
        self.target_dirs = dirs;
        self
    }

    pub fn with_dest_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.dest_root = root.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_keep_temp(mut self, keep: bool) -> Self {
        self.keep_temp = keep;
        self
    }

    pub fn with_release_fallback(mut self, tag: impl Into<String>) -> Self {
        self.release_fallback = Some(tag.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.remote_url.is_empty() {
            return Err("Remote URL cannot be empty".to_string());
        }

        if self.releases_api_url.is_empty() {
            return Err("Releases API URL cannot be empty".to_string());
        }

        if self.default_branch.is_empty() {
            return Err("Default branch cannot be empty".to_string());
        }

        if self.target_dirs.is_empty() {
            return Err("At least one target directory is required".to_string());
        }

        if self.http_timeout.is_zero() {
            return Err("HTTP timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PullConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_branch, "main");
        assert_eq!(
            config.target_dirs,
            vec!["projects/ocap".to_string(), "scripts/release".to_string()]
        );
    }

    #[test]
    fn test_builder_chain() {
        let config = PullConfig::new()
            .with_remote_url("file:///tmp/upstream")
            .with_default_branch("trunk")
            .with_http_timeout(Duration::from_secs(3))
            .with_keep_temp(true)
            .with_release_fallback("v1.2.3");

        assert_eq!(config.remote_url, "file:///tmp/upstream");
        assert_eq!(config.default_branch, "trunk");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.keep_temp);
        assert_eq!(config.release_fallback.as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn test_validation_rejects_empty_fields() {
        assert!(PullConfig::new().with_remote_url("").validate().is_err());
        assert!(PullConfig::new().with_default_branch("").validate().is_err());
        assert!(PullConfig::new()
            .with_target_dirs(Vec::new())
            .validate()
            .is_err());
        assert!(PullConfig::new()
            .with_http_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
