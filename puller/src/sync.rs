//! The sequential pull procedure: resolve mode, validate, acquire a
//! workspace, verify and copy the targets, record provenance. The temporary
//! workspace cleans itself up on every path out of this function.

use crate::config::PullConfig;
use crate::error::{PullError, PullResult};
use crate::materialize::{materialize, verify_targets};
use crate::mode::{self, PullMode};
use crate::provenance::Provenance;
use crate::release::ReleaseClient;
use crate::workspace::TempWorkspace;
use tracing::{info, warn};

/// Run a full pull and return the recorded provenance.
pub async fn run(
    config: &PullConfig,
    version_or_branch: Option<&str>,
    commit_hash: Option<&str>,
) -> PullResult<Provenance> {
    config
        .validate()
        .map_err(|message| PullError::InvalidConfig { message })?;

    let requested = mode::resolve(version_or_branch, commit_hash, config)?;
    info!("Resolved pull mode: {}", requested);
    println!("[INFO] Pull mode: {}", requested);

    // Latest-release resolution happens before any git work so a lookup
    // failure can fall back to the default branch tip.
    let (concrete, mode_label) = match &requested {
        PullMode::LatestRelease => match lookup_latest(config).await {
            Ok(tag) => {
                println!("[INFO] Latest release: {}", tag);
                (PullMode::Release { tag }, requested.label())
            }
            Err(e) => {
                warn!("Release lookup failed, using default branch: {}", e);
                println!(
                    "[WARN] Could not determine latest release ({}). Falling back to branch '{}'.",
                    e, config.default_branch
                );
                let fallback = PullMode::Branch {
                    name: config.default_branch.clone(),
                };
                let label = fallback.label();
                (fallback, label)
            }
        },
        other => (other.clone(), other.label()),
    };

    let workspace = TempWorkspace::acquire(config, &concrete)?;

    verify_targets(workspace.path(), &config.target_dirs)?;
    materialize(workspace.path(), &config.dest_root, &config.target_dirs)?;

    let provenance = Provenance::gather(
        workspace.path(),
        &concrete,
        mode_label,
        &config.target_dirs,
    )?;
    provenance.write(&config.dest_root)?;

    println!(
        "[INFO] Pulled {} at {}",
        config.target_dirs.join(", "),
        provenance.commit_hash
    );

    Ok(provenance)
}

async fn lookup_latest(config: &PullConfig) -> PullResult<String> {
    let client = ReleaseClient::new(config)?;
    client.latest_tag().await
}
