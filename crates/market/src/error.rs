//! Error types for catalog operations.

use std::fmt;

/// Result type for market operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors that can occur while loading the instrument catalog.
#[derive(Debug)]
pub enum MarketError {
    /// The seed file could not be read.
    SeedIo {
        path: String,
        source: std::io::Error,
    },
    /// The seed file is not a JSON array of instrument records.
    SeedFormat { path: String, detail: String },
    /// The seed file parsed but contained no usable entries.
    EmptySeed { path: String },
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::SeedIo { path, source } => {
                write!(f, "failed to read seed file {}: {}", path, source)
            }
            MarketError::SeedFormat { path, detail } => {
                write!(f, "seed file {} is malformed: {}", path, detail)
            }
            MarketError::EmptySeed { path } => {
                write!(f, "seed file {} contains no valid instruments", path)
            }
        }
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarketError::SeedIo { source, .. } => Some(source),
            _ => None,
        }
    }
}
