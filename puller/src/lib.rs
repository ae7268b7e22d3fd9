pub mod config;
pub mod error;
pub mod materialize;
pub mod mode;
pub mod provenance;
pub mod release;
pub mod sync;
pub mod workspace;

pub use config::{PullConfig, KEEP_TEMP_ENV, RELEASE_VERSION_ENV};
pub use error::{PullError, PullResult};
pub use materialize::{materialize, verify_targets};
pub use mode::{looks_like_version, resolve, PullMode};
pub use provenance::{Provenance, PROVENANCE_FILE};
pub use release::ReleaseClient;
pub use sync::run;
pub use workspace::TempWorkspace;
