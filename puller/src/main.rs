use clap::Parser;
use puller::{sync, PullConfig};
use tracing::error;

/// Sync projects/ocap and scripts/release from the upstream repository.
///
/// With no arguments the latest published release is pulled; if the release
/// lookup fails, the tip of the default branch is used instead. A
/// version-shaped argument (v1.2.3) selects that release, any other string
/// selects that branch's tip, and a second argument pins an exact commit.
#[derive(Parser)]
#[command(name = "pull")]
#[command(about = "Pull projects/ocap and scripts/release from an upstream release, branch, or commit")]
struct Cli {
    /// Release tag (v1.2.3) or branch name; defaults to the latest release
    version_or_branch: Option<String>,

    /// Exact commit hash; the first argument then selects the branch to
    /// search within
    commit_hash: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = PullConfig::from_env();

    let result = sync::run(
        &config,
        cli.version_or_branch.as_deref(),
        cli.commit_hash.as_deref(),
    )
    .await;

    if let Err(e) = result {
        error!("Pull failed: {}", e);
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}
