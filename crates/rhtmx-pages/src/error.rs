//! Error types for loading configuration and manifests
//!
//! Compilation and navigation never fail; only reading inputs from disk or
//! TOML can.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a routing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid routing config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure to load a page manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page manifest: {0}")]
    Parse(#[from] toml::de::Error),
}
