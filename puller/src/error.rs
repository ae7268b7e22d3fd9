use thiserror::Error;

/// Errors that can occur during a pull run
#[derive(Error, Debug)]
pub enum PullError {
    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Commit hash does not look like a git object id
    #[error("Invalid commit hash '{hash}'. Expected 6-40 hexadecimal characters.")]
    InvalidCommitHash { hash: String },

    /// Release tag argument resolved to an empty string
    #[error("Release tag must not be empty")]
    EmptyReleaseTag,

    /// Latest-release lookup failed. Always recovered by falling back to the
    /// default branch; never surfaces from a pull run.
    #[error("Release lookup failed: {reason}")]
    ReleaseLookup { reason: String },

    /// A git clone or checkout failed
    #[error("git {operation} failed for '{reference}': {reason}. Verify the reference exists upstream.")]
    Git {
        operation: String,
        reference: String,
        reason: String,
    },

    /// An expected target directory is absent from the acquired workspace
    #[error("Directory '{dir}' not found in the pulled repository")]
    MissingTarget { dir: String },

    /// Reading workspace metadata back failed
    #[error("Failed to read workspace metadata: {0}")]
    GitRead(#[from] git2::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PullResult<T> = Result<T, PullError>;
