// Error module for the failure classes of mod resolution and download

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How a mod was asked for when it could not be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonRef {
    Name(String),
    Id(i64),
}

impl fmt::Display for AddonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonRef::Name(name) => write!(f, "name '{}'", name),
            AddonRef::Id(id) => write!(f, "id {}", id),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModError {
    #[error("no mod found with {0}")]
    NoSuchAddon(AddonRef),

    #[error("no match found for {addon} with {filter}")]
    NoMatchingFile { addon: String, filter: String },

    /// The registry answered a lookup for one id with a different record
    #[error("mismatched local id {requested} to registry id {returned}, aborting")]
    AddonIdMismatch { requested: u32, returned: u32 },

    #[error("invalid minecraft version '{0}'")]
    InvalidVersion(String),

    #[error("invalid release type '{0}', expected one of: any, release, beta, alpha")]
    InvalidReleaseType(String),

    #[error("conflicting output paths: {0}")]
    ConflictingOutputPath(String),

    #[error("{method} {url}: HTTP {status} ({body})")]
    HttpStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ModError {
    /// Errors raised by the network rather than by the data it returned
    pub fn is_transport(&self) -> bool {
        matches!(self, ModError::HttpStatus { .. } | ModError::Http(_))
    }
}
