use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by registry loading. Per-agent parse problems are logged
/// and skipped rather than raised; only filesystem-level faults error out.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read agents directory {path}: {source}")]
    DirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
