use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a catalog could not be loaded or written.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened or read.
    #[error("failed to read model catalog at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not a well-formed catalog.
    #[error("malformed model catalog in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize model catalog")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write model catalog to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    /// The catalog resource itself was unavailable, as opposed to malformed.
    pub fn is_io(&self) -> bool {
        matches!(self, CatalogError::Io { .. } | CatalogError::Write { .. })
    }
}
