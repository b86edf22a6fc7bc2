use thiserror::Error;

/// Every way an installation attempt can end early.
///
/// All variants are terminal for the current attempt. `Cancelled` is reported
/// as an abort rather than a failure by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Release assets not found: {0}")]
    ReleaseFormat(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Could not extract archive: {0}")]
    Archive(String),

    #[error("Installation cancelled.")]
    Cancelled,

    #[error("Filesystem error: {0}")]
    Filesystem(String),
}

impl InstallError {
    pub fn filesystem(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Filesystem(format!("{}: {}", context, err))
    }
}
