use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`CatalogSource`](crate::source::CatalogSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no catalog at {location}")]
    NotFound { location: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid source directory: {}", path.display())]
    InvalidRoot { path: PathBuf },

    #[error("source does not support redirection")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Only raised when the caller asked for missing countries to be fatal.
    #[error("channel file not found: {location}")]
    MissingCountry { location: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
