use std::path::PathBuf;

use thiserror::Error;

/// Failures at the edges: config and file I/O. Stripping itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config file {0:?} not found")]
    ConfigNotFound(PathBuf),
    #[error("invalid block markers: {0}")]
    InvalidMarker(String),
    #[error("{key} must be a valid value: {message}")]
    Env { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
