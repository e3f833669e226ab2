// error.rs — Error types surfaced to the host.

use eco_geo::GeoError;
use eco_progress::ProgressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The engine config file could not be read or parsed.
    #[error("config error at {path}: {reason}")]
    ConfigError { path: String, reason: String },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },
}
